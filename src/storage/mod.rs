mod repository;

pub use repository::*;

/// SQL migration for the users table
pub const MIGRATION_001_USERS: &str = include_str!("migrations/001_users.sql");

/// SQL migration for the per-user transaction log
pub const MIGRATION_002_TRANSACTION_LOG: &str = include_str!("migrations/002_transaction_log.sql");
