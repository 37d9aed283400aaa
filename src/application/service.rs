use tracing::{info, warn};

use crate::domain::{
    Account, Cents, Ledger, LedgerError, LogEntry, TransactionKind, TransactionLog,
    ensure_positive,
};
use crate::storage::Repository;

use super::AppError;

/// Application service for bank accounts.
/// This is the only way the CLI and the interactive shell touch accounts.
pub struct BankService {
    repo: Repository,
}

impl BankService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the database at the given path, creating the file and tables if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Session operations
    // ========================

    /// Register a new account with a zero balance.
    pub async fn register(&self, username: &str, password: &str) -> Result<Account, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidUsername);
        }

        if !self.repo.insert_user(username, password).await? {
            return Err(AppError::AccountAlreadyExists(username.to_string()));
        }

        info!(username, "registered account");
        Ok(Account::new(username, password))
    }

    /// Authenticate and load the account with its retained history.
    pub async fn login(&self, username: &str, password: &str) -> Result<Account, AppError> {
        let user = self
            .repo
            .find_user(username.trim(), password)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let history = self.repo.load_log(&user.username).await?;
        info!(username = %user.username, "logged in");

        Ok(Account::restore(
            user.username,
            user.password,
            user.balance_cents,
            history,
        ))
    }

    // ========================
    // Ledger operations
    // ========================

    /// Deposit into the account. The balance change and its log entry are
    /// committed together; the account mirrors the stored result.
    pub async fn deposit(&self, account: &mut Account, amount: Cents) -> Result<LogEntry, AppError> {
        ensure_positive(amount)?;

        let entry = LogEntry::new(TransactionKind::Deposit, amount);
        let Some(new_balance) = self.repo.credit(account.username(), &entry).await? else {
            let balance = self.stored_balance(account).await?;
            warn!(
                username = account.username(),
                amount_cents = amount,
                balance_cents = balance,
                "deposit rejected"
            );
            return Err(LedgerError::BalanceOverflow {
                balance,
                requested: amount,
            }
            .into());
        };

        account.mirror(entry.clone(), new_balance);
        info!(
            username = account.username(),
            amount_cents = amount,
            balance_cents = new_balance,
            "deposit recorded"
        );
        Ok(entry)
    }

    /// Withdraw from the account. The store performs the sufficiency check and
    /// the decrement atomically; the in-memory balance only mirrors the result.
    pub async fn withdraw(
        &self,
        account: &mut Account,
        amount: Cents,
    ) -> Result<LogEntry, AppError> {
        ensure_positive(amount)?;

        let entry = LogEntry::new(TransactionKind::Withdrawal, amount);
        let Some(new_balance) = self.repo.debit(account.username(), &entry).await? else {
            let balance = self.stored_balance(account).await?;
            warn!(
                username = account.username(),
                amount_cents = amount,
                balance_cents = balance,
                "withdrawal rejected"
            );
            return Err(LedgerError::InsufficientFunds {
                balance,
                requested: amount,
            }
            .into());
        };

        account.mirror(entry.clone(), new_balance);
        info!(
            username = account.username(),
            amount_cents = amount,
            balance_cents = new_balance,
            "withdrawal recorded"
        );
        Ok(entry)
    }

    /// Current stored balance. Refreshes the account's mirrored balance.
    pub async fn balance(&self, account: &mut Account) -> Result<Cents, AppError> {
        self.stored_balance(account).await
    }

    /// Retained history, oldest first.
    pub fn history<'a>(&self, account: &'a Account) -> &'a TransactionLog {
        account.history()
    }

    async fn stored_balance(&self, account: &mut Account) -> Result<Cents, AppError> {
        let balance = self
            .repo
            .get_balance(account.username())
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account.username().to_string()))?;
        account.sync_balance(balance);
        Ok(balance)
    }

    /// Number of log rows stored for a user; never more than the log capacity.
    pub async fn stored_history_len(&self, username: &str) -> Result<i64, AppError> {
        Ok(self.repo.count_log_entries(username).await?)
    }
}
