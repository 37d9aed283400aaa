// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::io::Cursor;

use anyhow::Result;
use counterdesk::application::BankService;
use counterdesk::cli::shell::Console;
use counterdesk::domain::{Account, Cents};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BankService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BankService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Register `username` and log in, optionally with an opening deposit.
pub async fn funded_account(
    service: &BankService,
    username: &str,
    opening: Cents,
) -> Result<Account> {
    service.register(username, "secret").await?;
    let mut account = service.login(username, "secret").await?;
    if opening > 0 {
        service.deposit(&mut account, opening).await?;
    }
    Ok(account)
}

/// Console fed with the given lines, writing into a buffer.
pub fn scripted_console(lines: &[&str]) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
    let mut input = lines.join("\n");
    input.push('\n');
    Console::new(Cursor::new(input.into_bytes()), Vec::new())
}

/// Everything the console printed.
pub fn transcript(console: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
    String::from_utf8(console.into_output()).unwrap()
}
