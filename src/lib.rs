//! Internal Transfers - Account Ledger Service
//!
//! Accounts with exact decimal balances and atomic transfers between them.
//!
//! # Modules
//!
//! - [`money`] - Exact decimal amount type
//! - [`error`] - Closed ledger error taxonomy
//! - [`context`] - Per-request logging context
//! - [`account`] - Account ids, validation, Account Store
//! - [`store`] - Datastore contract (PostgreSQL and in-memory)
//! - [`transfer`] - Transfer Engine (lock ordering, retry, state machine)
//! - [`service`] - Ledger service facade used by the gateway
//! - [`db`] - PostgreSQL pool and migrations
//! - [`gateway`] - HTTP API
//! - [`config`], [`logging`] - YAML config and tracing setup

pub mod money;

pub mod account;
pub mod context;
pub mod error;
pub mod store;
pub mod transfer;

pub mod service;

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use account::{Account, AccountId};
pub use context::RequestContext;
pub use error::LedgerError;
pub use money::Amount;
pub use service::LedgerService;
pub use transfer::{TransferEngine, TransferReceipt};
