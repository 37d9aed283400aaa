use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::domain::{Cents, HISTORY_CAPACITY, LogEntry, TransactionKind, TransactionLog};

use super::{MIGRATION_001_USERS, MIGRATION_002_TRANSACTION_LOG};

/// A row of the users table.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub username: String,
    pub password: String,
    pub balance_cents: Cents,
}

/// Repository for persisting accounts and their transaction logs.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create tables if they don't exist. Safe to run on every startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_USERS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::query(MIGRATION_002_TRANSACTION_LOG)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        Ok(())
    }

    /// Connect and migrate.
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // User operations
    // ========================

    /// Insert a new user with a zero balance.
    /// Returns false if the username is already taken.
    pub async fn insert_user(&self, username: &str, password: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password, balance_cents)
            VALUES (?, ?, 0)
            ON CONFLICT(username) DO NOTHING
            "#,
        )
        .bind(username)
        .bind(password)
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        Ok(result.rows_affected() == 1)
    }

    /// Look up a user by username and password.
    pub async fn find_user(&self, username: &str, password: &str) -> Result<Option<StoredUser>> {
        let row = sqlx::query(
            r#"
            SELECT username, password, balance_cents
            FROM users
            WHERE username = ? AND password = ?
            "#,
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        Ok(row.map(|row| StoredUser {
            username: row.get("username"),
            password: row.get("password"),
            balance_cents: row.get("balance_cents"),
        }))
    }

    pub async fn get_balance(&self, username: &str) -> Result<Option<Cents>> {
        let row = sqlx::query("SELECT balance_cents FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch balance")?;

        Ok(row.map(|row| row.get("balance_cents")))
    }

    /// Add a deposit to the balance and record it, in one transaction.
    /// Returns the new balance, or None if the user doesn't exist or the
    /// balance would overflow; nothing is written in that case.
    pub async fn credit(&self, username: &str, entry: &LogEntry) -> Result<Option<Cents>> {
        let amount = entry.amount_cents;
        debug!(username, amount_cents = amount, "crediting balance");

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let row = sqlx::query(
            r#"
            UPDATE users
            SET balance_cents = balance_cents + ?
            WHERE username = ? AND balance_cents <= ?
            RETURNING balance_cents
            "#,
        )
        .bind(amount)
        .bind(username)
        .bind(Cents::MAX.saturating_sub(amount))
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to credit balance")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Self::insert_log_entry(&mut *tx, username, entry).await?;
        tx.commit().await.context("Failed to commit deposit")?;

        Ok(Some(row.get("balance_cents")))
    }

    /// Subtract a withdrawal from the balance only if it covers it, and record it,
    /// in one transaction. The check and the decrement are one statement, so
    /// concurrent withdrawals can't both pass the check.
    /// Returns the new balance, or None if the user doesn't exist or the balance is too low.
    pub async fn debit(&self, username: &str, entry: &LogEntry) -> Result<Option<Cents>> {
        let amount = entry.amount_cents;
        debug!(username, amount_cents = amount, "debiting balance");

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let row = sqlx::query(
            r#"
            UPDATE users
            SET balance_cents = balance_cents - ?
            WHERE username = ? AND balance_cents >= ?
            RETURNING balance_cents
            "#,
        )
        .bind(amount)
        .bind(username)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to debit balance")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Self::insert_log_entry(&mut *tx, username, entry).await?;
        tx.commit().await.context("Failed to commit withdrawal")?;

        Ok(Some(row.get("balance_cents")))
    }

    // ========================
    // Transaction log operations
    // ========================

    /// Append an entry and drop everything older than the last `HISTORY_CAPACITY` entries.
    async fn insert_log_entry(
        conn: &mut SqliteConnection,
        username: &str,
        entry: &LogEntry,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transaction_log (username, kind, amount_cents, recorded_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(entry.kind.as_str())
        .bind(entry.amount_cents)
        .bind(entry.recorded_at.to_rfc3339())
        .execute(&mut *conn)
        .await
        .context("Failed to save log entry")?;

        let trimmed = sqlx::query(
            r#"
            DELETE FROM transaction_log
            WHERE username = ?
              AND id NOT IN (
                SELECT id FROM transaction_log
                WHERE username = ?
                ORDER BY id DESC
                LIMIT ?
              )
            "#,
        )
        .bind(username)
        .bind(username)
        .bind(HISTORY_CAPACITY as i64)
        .execute(&mut *conn)
        .await
        .context("Failed to trim transaction log")?;

        if trimmed.rows_affected() > 0 {
            debug!(username, evicted = trimmed.rows_affected(), "trimmed transaction log");
        }
        Ok(())
    }

    /// Load the retained entries for a user, oldest first.
    pub async fn load_log(&self, username: &str) -> Result<TransactionLog> {
        let rows = sqlx::query(
            r#"
            SELECT kind, amount_cents, recorded_at
            FROM (
                SELECT id, kind, amount_cents, recorded_at
                FROM transaction_log
                WHERE username = ?
                ORDER BY id DESC
                LIMIT ?
            )
            ORDER BY id ASC
            "#,
        )
        .bind(username)
        .bind(HISTORY_CAPACITY as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load transaction log")?;

        let entries = rows
            .iter()
            .map(Self::row_to_log_entry)
            .collect::<Result<Vec<_>>>()?;
        Ok(TransactionLog::from_entries(entries))
    }

    /// Number of stored log rows for a user.
    pub async fn count_log_entries(&self, username: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM transaction_log WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count log entries")?;

        Ok(row.get("count"))
    }

    fn row_to_log_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LogEntry> {
        let kind_str: String = row.get("kind");
        let recorded_at_str: String = row.get("recorded_at");

        Ok(LogEntry {
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            amount_cents: row.get("amount_cents"),
            recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                .context("Invalid recorded_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_repo() -> Result<(Repository, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db_url = format!("sqlite:{}?mode=rwc", temp_dir.path().join("test.db").display());
        let repo = Repository::init(&db_url).await?;
        Ok((repo, temp_dir))
    }

    #[tokio::test]
    async fn test_credit_rolls_back_when_log_write_fails() -> Result<()> {
        let (repo, _temp) = test_repo().await?;
        repo.insert_user("alice", "secret").await?;

        sqlx::query("DROP TABLE transaction_log")
            .execute(&repo.pool)
            .await?;

        let entry = LogEntry::new(TransactionKind::Deposit, 5000);
        assert!(repo.credit("alice", &entry).await.is_err());
        assert_eq!(repo.get_balance("alice").await?, Some(0));

        Ok(())
    }

    #[tokio::test]
    async fn test_debit_rolls_back_when_log_write_fails() -> Result<()> {
        let (repo, _temp) = test_repo().await?;
        repo.insert_user("alice", "secret").await?;
        repo.credit("alice", &LogEntry::new(TransactionKind::Deposit, 5000))
            .await?;

        sqlx::query("DROP TABLE transaction_log")
            .execute(&repo.pool)
            .await?;

        let entry = LogEntry::new(TransactionKind::Withdrawal, 2000);
        assert!(repo.debit("alice", &entry).await.is_err());
        assert_eq!(repo.get_balance("alice").await?, Some(5000));

        Ok(())
    }

    #[tokio::test]
    async fn test_credit_refuses_to_overflow() -> Result<()> {
        let (repo, _temp) = test_repo().await?;
        repo.insert_user("alice", "secret").await?;

        let half = LogEntry::new(TransactionKind::Deposit, 50_000_000_000_000_000);
        assert_eq!(repo.credit("alice", &half).await?, Some(50_000_000_000_000_000));

        let too_much = LogEntry::new(TransactionKind::Deposit, Cents::MAX);
        assert_eq!(repo.credit("alice", &too_much).await?, None);
        assert_eq!(repo.get_balance("alice").await?, Some(50_000_000_000_000_000));
        assert_eq!(repo.count_log_entries("alice").await?, 1);

        let to_limit = LogEntry::new(TransactionKind::Deposit, Cents::MAX - 50_000_000_000_000_000);
        assert_eq!(repo.credit("alice", &to_limit).await?, Some(Cents::MAX));

        Ok(())
    }
}
