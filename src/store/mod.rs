//! Ledger Datastore Contract
//!
//! The account ledger and the transfer engine talk to storage only through
//! [`LedgerStore`] and [`LedgerTx`]. Two implementations ship:
//!
//! - [`postgres::PgLedgerStore`] - PostgreSQL via sqlx, row locks with `FOR UPDATE`
//! - [`memory::MemoryLedgerStore`] - in-process table with per-row async locks
//!
//! # Transaction contract
//!
//! A [`LedgerTx`] is an isolated unit of work. Row locks taken by
//! [`LedgerTx::lock_accounts`] are held until [`LedgerTx::commit`] or
//! [`LedgerTx::rollback`]. Writes are invisible to other readers until commit.
//! Dropping a transaction without finishing it is a rollback.

use async_trait::async_trait;
use thiserror::Error;

use crate::account::models::Account;
use crate::account::validation::AccountId;
use crate::money::Amount;
use crate::transfer::types::{NewTransfer, TransferRecord};

pub mod memory;
pub mod postgres;

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// PostgreSQL SQLSTATE codes the ledger reacts to
pub mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
    pub const LOCK_NOT_AVAILABLE: &str = "55P03";
}

/// Datastore-level failure signal
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("timed out waiting for a row lock")]
    LockTimeout,

    #[error("transaction conflict: {0}")]
    Conflict(String),

    #[error("account {0} is not locked by this transaction")]
    NotLocked(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// Conflicts that are safe to retry with the same inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::LockTimeout | StoreError::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return StoreError::UniqueViolation;
            }
            match db.code().as_deref() {
                Some(sqlstate::SERIALIZATION_FAILURE) | Some(sqlstate::DEADLOCK_DETECTED) => {
                    return StoreError::Conflict(db.message().to_string());
                }
                Some(sqlstate::LOCK_NOT_AVAILABLE) => return StoreError::LockTimeout,
                _ => {}
            }
        }
        StoreError::Database(e)
    }
}

/// Storage used by the account ledger and the transfer engine
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Insert a new account. Duplicate ids surface as [`StoreError::UniqueViolation`]
    /// from the uniqueness constraint itself, never from a pre-check.
    async fn insert_account(&self, id: &AccountId, balance: Amount) -> Result<(), StoreError>;

    /// Point-in-time read of one committed account row.
    async fn fetch_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;

    /// Open a transaction.
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError>;

    /// Cheap liveness probe.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// One open datastore transaction
#[async_trait]
pub trait LedgerTx: Send {
    /// Take exclusive row locks on `ids`, one at a time, in the order given.
    ///
    /// Returns the rows that exist, read under their lock. Ids with no row
    /// are skipped. Callers are responsible for passing a globally consistent
    /// order.
    async fn lock_accounts(&mut self, ids: &[&AccountId]) -> Result<Vec<Account>, StoreError>;

    /// Overwrite the balance of a row previously locked by this transaction.
    async fn set_balance(&mut self, id: &AccountId, balance: Amount) -> Result<(), StoreError>;

    /// Append the audit row for a transfer applied in this transaction.
    async fn record_transfer(&mut self, transfer: &NewTransfer)
    -> Result<TransferRecord, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
