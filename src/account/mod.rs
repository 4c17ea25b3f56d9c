//! Account management module
//!
//! Validated identifiers, the account row model, and the Account Store that
//! creates and reads single accounts.

pub mod models;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use models::Account;
pub use store::AccountStore;
pub use validation::{AccountId, AccountIdError, NewAccount};
