//! Atomic transfers between two accounts
//!
//! - [`types`]: ids, validated commands, audit records
//! - [`state`]: per-attempt lifecycle
//! - [`retry`]: bounded backoff for transient conflicts
//! - [`engine`]: lock, validate, apply, commit

pub mod engine;
pub mod retry;
pub mod state;
pub mod types;

pub use engine::TransferEngine;
pub use retry::RetryPolicy;
pub use state::TransferState;
pub use types::{TransferCommand, TransferId, TransferReceipt, TransferRecord};
