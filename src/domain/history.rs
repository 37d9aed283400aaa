use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, format_cents};

/// Number of entries an account keeps in its transaction log.
pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(TransactionKind::Deposit),
            "withdrawal" => Some(TransactionKind::Withdrawal),
            _ => None,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposited",
            TransactionKind::Withdrawal => "Withdrew",
        }
    }
}

/// One audit line of an account's history.
/// Displays as "Deposited: $50.00" / "Withdrew: $20.00".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: TransactionKind,
    pub amount_cents: Cents,
    pub recorded_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(kind: TransactionKind, amount_cents: Cents) -> Self {
        Self {
            kind,
            amount_cents,
            recorded_at: Utc::now(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ${}", self.kind.verb(), format_cents(self.amount_cents))
    }
}

/// Fixed-capacity FIFO of the most recent entries.
/// Appending past capacity evicts the oldest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionLog {
    entries: VecDeque<LogEntry>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Rebuild a log from stored entries, oldest first.
    /// Only the last `HISTORY_CAPACITY` entries are retained.
    pub fn from_entries(entries: impl IntoIterator<Item = LogEntry>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.push(entry);
        }
        log
    }

    /// Append an entry, returning the evicted one if the log was full.
    pub fn push(&mut self, entry: LogEntry) -> Option<LogEntry> {
        let evicted = if self.entries.len() == HISTORY_CAPACITY {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Entries in insertion order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(amount: Cents) -> LogEntry {
        LogEntry::new(TransactionKind::Deposit, amount)
    }

    #[test]
    fn test_entry_display() {
        assert_eq!(deposit(5000).to_string(), "Deposited: $50.00");
        assert_eq!(
            LogEntry::new(TransactionKind::Withdrawal, 1999).to_string(),
            "Withdrew: $19.99"
        );
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [TransactionKind::Deposit, TransactionKind::Withdrawal] {
            assert_eq!(TransactionKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::from_str("transfer"), None);
    }

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut log = TransactionLog::new();
        for amount in 1..=HISTORY_CAPACITY as Cents {
            assert!(log.push(deposit(amount)).is_none());
        }
        assert_eq!(log.len(), HISTORY_CAPACITY);
        assert_eq!(log.iter().next().map(|e| e.amount_cents), Some(1));
    }

    #[test]
    fn test_push_past_capacity_evicts_oldest() {
        let mut log = TransactionLog::new();
        for amount in 1..=HISTORY_CAPACITY as Cents {
            log.push(deposit(amount));
        }

        let evicted = log.push(deposit(11));
        assert_eq!(evicted.map(|e| e.amount_cents), Some(1));
        assert_eq!(log.len(), HISTORY_CAPACITY);

        let amounts: Vec<Cents> = log.iter().map(|e| e.amount_cents).collect();
        assert_eq!(amounts, (2..=11).collect::<Vec<_>>());
        assert_eq!(log.latest().map(|e| e.amount_cents), Some(11));
    }

    #[test]
    fn test_from_entries_truncates_to_most_recent() {
        let log = TransactionLog::from_entries((1..=25).map(deposit));
        assert_eq!(log.len(), HISTORY_CAPACITY);
        assert_eq!(log.iter().next().map(|e| e.amount_cents), Some(16));
    }
}
