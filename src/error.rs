//! Ledger Error Types
//!
//! Closed set of failure kinds surfaced by the ledger core. The HTTP boundary
//! picks status codes from the kind, never from message text.

use thiserror::Error;

use crate::account::validation::AccountIdError;
use crate::store::StoreError;

/// Ledger error kinds
#[derive(Error, Debug)]
pub enum LedgerError {
    // === Validation Errors ===
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} is not a valid account id: {reason}")]
    InvalidAccountId {
        field: &'static str,
        reason: AccountIdError,
    },

    #[error("{field} must be a valid decimal number")]
    InvalidAmount { field: &'static str },

    #[error("balance must be non-negative")]
    NegativeBalance,

    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("source and destination accounts must differ")]
    SameAccount,

    // === Account Errors ===
    #[error("account already exists")]
    AccountExists,

    #[error("account not found")]
    AccountNotFound,

    #[error("source account not found")]
    SourceNotFound,

    #[error("destination account not found")]
    DestinationNotFound,

    #[error("insufficient funds in source account")]
    InsufficientFunds,

    #[error("destination balance would overflow")]
    BalanceOverflow,

    // === System Errors ===
    #[error("timed out waiting for account locks")]
    Timeout,

    #[error("datastore unavailable")]
    StoreUnavailable {
        #[source]
        source: Option<StoreError>,
    },

    #[error("failed to process transfer")]
    ProcessingFailed {
        #[source]
        source: Option<StoreError>,
    },
}

impl LedgerError {
    pub fn store_unavailable(source: StoreError) -> Self {
        LedgerError::StoreUnavailable {
            source: Some(source),
        }
    }

    pub fn processing_failed(source: StoreError) -> Self {
        LedgerError::ProcessingFailed {
            source: Some(source),
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::MissingField { .. } => "MISSING_FIELD",
            LedgerError::InvalidAccountId { .. } => "INVALID_ACCOUNT_ID",
            LedgerError::InvalidAmount { .. } => "INVALID_AMOUNT",
            LedgerError::NegativeBalance => "NEGATIVE_BALANCE",
            LedgerError::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            LedgerError::SameAccount => "SAME_ACCOUNT",
            LedgerError::AccountExists => "ACCOUNT_EXISTS",
            LedgerError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            LedgerError::SourceNotFound => "SOURCE_NOT_FOUND",
            LedgerError::DestinationNotFound => "DESTINATION_NOT_FOUND",
            LedgerError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            LedgerError::BalanceOverflow => "BALANCE_OVERFLOW",
            LedgerError::Timeout => "TIMEOUT",
            LedgerError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            LedgerError::ProcessingFailed { .. } => "PROCESSING_FAILED",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::MissingField { .. }
            | LedgerError::InvalidAccountId { .. }
            | LedgerError::InvalidAmount { .. }
            | LedgerError::NegativeBalance
            | LedgerError::NonPositiveAmount
            | LedgerError::SameAccount
            | LedgerError::InsufficientFunds => 400,
            LedgerError::AccountNotFound
            | LedgerError::SourceNotFound
            | LedgerError::DestinationNotFound => 404,
            LedgerError::AccountExists => 409,
            LedgerError::BalanceOverflow => 422,
            LedgerError::StoreUnavailable { .. } | LedgerError::ProcessingFailed { .. } => 500,
            LedgerError::Timeout => 503,
        }
    }

    /// Opaque failures: the caller may retry at its own discretion.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::Timeout
                | LedgerError::StoreUnavailable { .. }
                | LedgerError::ProcessingFailed { .. }
        )
    }
}
