mod common;

use anyhow::Result;
use common::{scripted_console, test_service, transcript};
use counterdesk::cli::shell::run_bank_shell;
use counterdesk::domain::Ledger;

#[tokio::test]
async fn test_bank_session_end_to_end() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let mut console = scripted_console(&[
        "1", "alice", "secret", // register
        "2", "alice", "secret", // login
        "1", "250.50", // deposit
        "2", "50.25", // withdraw
        "2", "1000", // withdraw too much
        "3", // balance
        "4", // history
        "6", // logout
        "3", // exit
    ]);

    run_bank_shell(&service, &mut console).await?;
    let output = transcript(console);

    assert!(output.contains("Registration successful!"));
    assert!(output.contains("Deposit successful!"));
    assert!(output.contains("Withdrawal successful!"));
    assert!(output.contains("insufficient funds: balance 200.25, requested 1000.00"));
    assert!(output.contains("Current balance: 200.25"));
    assert!(output.contains("Transaction History:\nDeposited: $250.50\nWithdrew: $50.25\n"));
    assert!(output.contains("Logged out successfully."));
    assert!(output.contains("Exiting..."));

    let account = service.login("alice", "secret").await?;
    assert_eq!(account.balance(), 20_025);
    assert_eq!(account.history().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_bank_session_reports_errors_and_continues() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.register("bob", "pw").await?;

    let mut console = scripted_console(&[
        "1", "bob", "again", // duplicate registration
        "2", "bob", "nope", // bad password
        "4", // invalid choice
        "abc", // not a number
        "2", "bob", "pw", // login
        "1", "0", // zero deposit
        "1", "ten", // unparsable amount
        "4", // empty history
        "3", // exit
    ]);

    run_bank_shell(&service, &mut console).await?;
    let output = transcript(console);

    assert!(output.contains("Account already exists: bob"));
    assert!(output.contains("Invalid username or password"));
    assert!(output.contains("Invalid choice."));
    assert!(output.contains("Invalid input"));
    assert!(output.contains("amount must be greater than 0, got 0.00"));
    assert!(output.contains("No transactions yet."));

    // "3" inside the user menu was View Balance; input then ran out
    assert!(output.contains("Current balance: 0.00"));
    Ok(())
}

#[tokio::test]
async fn test_bank_session_emi() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.register("carol", "pw").await?;

    let mut console = scripted_console(&[
        "2", "carol", "pw", // login
        "5", "100000", "10", "12", // EMI
        "5", "1200", "0", "12", // zero rate
        "5", "1200", "5", "0", // invalid term
        "5", "1200", "0.000000000000001", "12", // near-zero rate
        "5", "100000", "10", "100000", // very long term
        "6", "3",
    ]);

    run_bank_shell(&service, &mut console).await?;
    let output = transcript(console);

    assert!(output.contains("Calculated EMI: 8791.59"));
    assert!(output.contains("Calculated EMI: 100.00"));
    assert!(output.contains("Error calculating EMI: loan term must be at least one month, got 0"));
    assert_eq!(output.matches("Calculated EMI: 100.00").count(), 2);
    assert!(output.contains("Calculated EMI: 833.33"));
    Ok(())
}
