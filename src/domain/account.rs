use thiserror::Error;

use super::money::dollars;
use super::{Cents, LogEntry, TransactionKind, TransactionLog};

/// Capability interface of anything that holds a balance.
pub trait Ledger {
    /// Credit `amount` and record it. Fails without side effects if `amount <= 0`.
    fn deposit(&mut self, amount: Cents) -> Result<LogEntry, LedgerError>;

    /// Debit `amount` and record it. Fails without side effects if
    /// `amount <= 0` or `amount` exceeds the balance.
    fn withdraw(&mut self, amount: Cents) -> Result<LogEntry, LedgerError>;

    fn balance(&self) -> Cents;

    fn history(&self) -> &TransactionLog;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("amount must be greater than 0, got {}", dollars(.0))]
    InvalidAmount(Cents),

    #[error("insufficient funds: balance {}, requested {}", dollars(.balance), dollars(.requested))]
    InsufficientFunds { balance: Cents, requested: Cents },

    #[error("deposit of {} would push the balance past its limit", dollars(.requested))]
    BalanceOverflow { balance: Cents, requested: Cents },
}

/// Reject non-positive amounts before anything touches the balance.
pub fn ensure_positive(amount: Cents) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

/// A registered user and their bounded history.
/// The balance is never negative.
#[derive(Debug, Clone)]
pub struct Account {
    username: String,
    password: String,
    balance: Cents,
    history: TransactionLog,
}

impl Account {
    /// A freshly registered account: zero balance, empty history.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            balance: 0,
            history: TransactionLog::new(),
        }
    }

    /// Rehydrate an account loaded from storage.
    /// A negative stored balance is clamped to zero.
    pub fn restore(
        username: String,
        password: String,
        balance: Cents,
        history: TransactionLog,
    ) -> Self {
        Self {
            username,
            password,
            balance: balance.max(0),
            history,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Overwrite the mirrored balance with the authoritative stored value.
    pub fn sync_balance(&mut self, balance: Cents) {
        self.balance = balance.max(0);
    }

    /// Mirror an operation the store has already committed: adopt the
    /// stored balance and keep the same log entry.
    pub fn mirror(&mut self, entry: LogEntry, balance: Cents) {
        self.sync_balance(balance);
        self.history.push(entry);
    }

    fn record(&mut self, kind: TransactionKind, amount: Cents) -> LogEntry {
        let entry = LogEntry::new(kind, amount);
        self.history.push(entry.clone());
        entry
    }
}

impl Ledger for Account {
    fn deposit(&mut self, amount: Cents) -> Result<LogEntry, LedgerError> {
        ensure_positive(amount)?;
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow {
                balance: self.balance,
                requested: amount,
            })?;
        Ok(self.record(TransactionKind::Deposit, amount))
    }

    fn withdraw(&mut self, amount: Cents) -> Result<LogEntry, LedgerError> {
        ensure_positive(amount)?;
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds {
                balance: self.balance,
                requested: amount,
            });
        }
        self.balance -= amount;
        Ok(self.record(TransactionKind::Withdrawal, amount))
    }

    fn balance(&self) -> Cents {
        self.balance
    }

    fn history(&self) -> &TransactionLog {
        &self.history
    }
}
