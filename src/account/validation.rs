//! Input validation for account ids and amounts
//!
//! Boundary input arrives as raw strings. This module trims, checks and
//! converts it into the typed values the ledger core accepts, so nothing
//! unvalidated reaches the account store or the transfer engine.

use std::fmt;

use serde::Serialize;

use crate::error::LedgerError;
use crate::money::Amount;
use crate::transfer::types::TransferCommand;

// ============================================================================
// AccountId - Validated Account Identifier (Private Fields)
// ============================================================================

/// Why a string is not a usable account id
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("must not be empty")]
    Empty,

    #[error("must be at most {max} bytes, got {actual}", max = AccountId::MAX_LEN)]
    TooLong { actual: usize },

    #[error("must not contain control characters")]
    ControlCharacter,
}

/// Caller-supplied account identifier (trimmed, non-empty)
///
/// Fields are private to force validation through `new()`. Ordering is
/// byte-wise lexicographic and is the global lock order for transfers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub const MAX_LEN: usize = 128;

    /// Create a new validated AccountId
    ///
    /// # Examples
    /// ```
    /// use internal_transfers::account::validation::AccountId;
    ///
    /// let id = AccountId::new("  acc-1 ").unwrap();
    /// assert_eq!(id.as_str(), "acc-1");
    ///
    /// assert!(AccountId::new("   ").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, AccountIdError> {
        let id = raw.trim();

        if id.is_empty() {
            return Err(AccountIdError::Empty);
        }
        if id.len() > Self::MAX_LEN {
            return Err(AccountIdError::TooLong { actual: id.len() });
        }
        if id.chars().any(char::is_control) {
            return Err(AccountIdError::ControlCharacter);
        }

        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Request Validation
// ============================================================================

/// Validated account creation input
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub id: AccountId,
    pub initial_balance: Amount,
}

fn required<'a>(raw: &'a str, field: &'static str) -> Result<&'a str, LedgerError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(LedgerError::MissingField { field });
    }
    Ok(value)
}

fn account_id(raw: &str, field: &'static str) -> Result<AccountId, LedgerError> {
    AccountId::new(raw).map_err(|reason| LedgerError::InvalidAccountId { field, reason })
}

fn amount(raw: &str, field: &'static str) -> Result<Amount, LedgerError> {
    Amount::parse(raw).map_err(|_| LedgerError::InvalidAmount { field })
}

/// Validate an account id taken from a path or query
pub fn validate_account_id(raw: &str) -> Result<AccountId, LedgerError> {
    let value = required(raw, "account_id")?;
    account_id(value, "account_id")
}

/// Validate account creation input
///
/// Checks run in field order: id presence, balance presence, balance syntax,
/// balance sign.
pub fn validate_create_account(
    raw_account_id: &str,
    raw_initial_balance: &str,
) -> Result<NewAccount, LedgerError> {
    let id = required(raw_account_id, "account_id")?;
    let balance = required(raw_initial_balance, "initial_balance")?;

    let id = account_id(id, "account_id")?;
    let initial_balance = amount(balance, "initial_balance")?;
    if initial_balance.is_negative() {
        return Err(LedgerError::NegativeBalance);
    }

    Ok(NewAccount {
        id,
        initial_balance,
    })
}

/// Validate transfer input
pub fn validate_transfer(
    raw_source: &str,
    raw_destination: &str,
    raw_amount: &str,
) -> Result<TransferCommand, LedgerError> {
    let source = required(raw_source, "source_account_id")?;
    let destination = required(raw_destination, "destination_account_id")?;
    let raw_amount = required(raw_amount, "amount")?;

    let source = account_id(source, "source_account_id")?;
    let destination = account_id(destination, "destination_account_id")?;
    let amount = amount(raw_amount, "amount")?;
    if !amount.is_positive() {
        return Err(LedgerError::NonPositiveAmount);
    }
    if source == destination {
        return Err(LedgerError::SameAccount);
    }

    Ok(TransferCommand {
        source,
        destination,
        amount,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // AccountId Tests
    // ========================================================================

    #[test]
    fn test_account_id_valid() {
        assert!(AccountId::new("acc-1").is_ok());
        assert!(AccountId::new("123").is_ok());
        assert!(AccountId::new("Ünïcödé konto").is_ok());
        assert_eq!(AccountId::new("\tacc-1\n").unwrap().as_str(), "acc-1");
    }

    #[test]
    fn test_account_id_invalid() {
        assert_eq!(AccountId::new(""), Err(AccountIdError::Empty));
        assert_eq!(AccountId::new("  "), Err(AccountIdError::Empty));
        assert_eq!(
            AccountId::new("a\u{0}b"),
            Err(AccountIdError::ControlCharacter)
        );

        let long = "x".repeat(AccountId::MAX_LEN + 1);
        assert_eq!(
            AccountId::new(&long),
            Err(AccountIdError::TooLong {
                actual: AccountId::MAX_LEN + 1
            })
        );
        assert!(AccountId::new(&"x".repeat(AccountId::MAX_LEN)).is_ok());
    }

    #[test]
    fn test_account_id_lock_order_is_bytewise() {
        let a = AccountId::new("acc-10").unwrap();
        let b = AccountId::new("acc-2").unwrap();
        let upper = AccountId::new("Z").unwrap();
        let lower = AccountId::new("a").unwrap();
        assert!(a < b);
        assert!(upper < lower);
    }

    // ========================================================================
    // Create Account Validation
    // ========================================================================

    #[test]
    fn test_create_account_ok() {
        let acc = validate_create_account(" acc-1 ", " 100.00 ").unwrap();
        assert_eq!(acc.id.as_str(), "acc-1");
        assert_eq!(acc.initial_balance, Amount::parse("100").unwrap());

        let zero = validate_create_account("acc-0", "0").unwrap();
        assert!(zero.initial_balance.is_zero());
    }

    #[test]
    fn test_create_account_errors() {
        let err = validate_create_account("", "100").unwrap_err();
        assert!(matches!(err, LedgerError::MissingField { field: "account_id" }));

        let err = validate_create_account("acc-1", "  ").unwrap_err();
        assert!(matches!(
            err,
            LedgerError::MissingField {
                field: "initial_balance"
            }
        ));

        let err = validate_create_account("acc-1", "xyz").unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidAmount {
                field: "initial_balance"
            }
        ));

        let err = validate_create_account("acc-1", "-0.01").unwrap_err();
        assert!(matches!(err, LedgerError::NegativeBalance));
    }

    #[test]
    fn test_create_account_missing_id_reported_before_bad_balance() {
        let err = validate_create_account("", "xyz").unwrap_err();
        assert!(matches!(err, LedgerError::MissingField { field: "account_id" }));
    }

    // ========================================================================
    // Transfer Validation
    // ========================================================================

    #[test]
    fn test_transfer_ok() {
        let cmd = validate_transfer("acc-1", "acc-2", "50.00").unwrap();
        assert_eq!(cmd.source.as_str(), "acc-1");
        assert_eq!(cmd.destination.as_str(), "acc-2");
        assert_eq!(cmd.amount.to_string(), "50");
    }

    #[test]
    fn test_transfer_missing_fields_in_order() {
        let err = validate_transfer("", "", "").unwrap_err();
        assert!(matches!(
            err,
            LedgerError::MissingField {
                field: "source_account_id"
            }
        ));

        let err = validate_transfer("acc-1", " ", "").unwrap_err();
        assert!(matches!(
            err,
            LedgerError::MissingField {
                field: "destination_account_id"
            }
        ));

        let err = validate_transfer("acc-1", "acc-2", "").unwrap_err();
        assert!(matches!(err, LedgerError::MissingField { field: "amount" }));
    }

    #[test]
    fn test_transfer_amount_errors() {
        let err = validate_transfer("acc-1", "acc-2", "xyz").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { field: "amount" }));

        let err = validate_transfer("acc-1", "acc-2", "0").unwrap_err();
        assert!(matches!(err, LedgerError::NonPositiveAmount));

        let err = validate_transfer("acc-1", "acc-2", "-5").unwrap_err();
        assert!(matches!(err, LedgerError::NonPositiveAmount));
    }

    #[test]
    fn test_transfer_same_account_after_trim() {
        let err = validate_transfer("acc-1", " acc-1 ", "10").unwrap_err();
        assert!(matches!(err, LedgerError::SameAccount));
    }

    #[test]
    fn test_validate_account_id() {
        assert_eq!(validate_account_id(" acc-9 ").unwrap().as_str(), "acc-9");
        assert!(matches!(
            validate_account_id(""),
            Err(LedgerError::MissingField { field: "account_id" })
        ));
    }
}
