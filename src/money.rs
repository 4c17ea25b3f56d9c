//! Money Module
//!
//! Exact decimal amounts for balances and transfers. Every balance and every
//! transfer amount in the ledger is an [`Amount`]; there is no floating point
//! anywhere on the money path.
//!
//! ## Representation
//! - Backed by `rust_decimal::Decimal` (96-bit mantissa, scale up to 28)
//! - Client input is limited to [`MAX_SCALE`] fractional digits
//! - Stored in PostgreSQL as `NUMERIC`
//!
//! ## Usage
//! ```rust
//! use internal_transfers::money::Amount;
//!
//! let balance = Amount::parse("100.10").unwrap();
//! let amount = Amount::parse("40.05").unwrap();
//! let left = balance.checked_sub(amount).unwrap();
//! assert_eq!(left.to_string(), "60.05");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Maximum number of fractional digits accepted from clients.
pub const MAX_SCALE: usize = 18;

/// Significant digits that always fit a `Decimal` without rounding.
const MAX_DIGITS: usize = 28;

// ============================================================================
// Error Types
// ============================================================================

/// Amount parsing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("malformed decimal: '{0}'")]
    Malformed(String),

    #[error("too many fractional digits: {scale} (max {})", MAX_SCALE)]
    TooPrecise { scale: usize },

    #[error("amount out of range: '{0}'")]
    OutOfRange(String),
}

// ============================================================================
// Amount
// ============================================================================

/// Exact decimal amount.
///
/// Equality and ordering are by numeric value, so `1.0 == 1.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, sqlx::Type)]
#[sqlx(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Parse a client-supplied decimal string.
    ///
    /// Accepts an optional sign, digits, and an optional fractional part
    /// (`"10"`, `"-3.5"`, `".25"`, `"7."`). Exponents, separators and
    /// embedded whitespace are rejected rather than guessed at.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let negative = s.starts_with('-');
        let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);

        let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if frac.len() > MAX_SCALE {
            return Err(AmountError::TooPrecise { scale: frac.len() });
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() + frac.len() > MAX_DIGITS {
            return Err(AmountError::OutOfRange(s.to_string()));
        }

        let whole = if whole.is_empty() { "0" } else { whole };
        let sign = if negative { "-" } else { "" };
        let canonical = if frac.is_empty() {
            format!("{sign}{whole}")
        } else {
            format!("{sign}{whole}.{frac}")
        };

        Decimal::from_str(&canonical)
            .map(Amount)
            .map_err(|_| AmountError::OutOfRange(s.to_string()))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Strictly below zero (`-0` is not negative).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.cmp(&Decimal::ZERO) == Ordering::Less
    }

    /// Strictly above zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.cmp(&Decimal::ZERO) == Ordering::Greater
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

/// Canonical form: normalized, no trailing zeros, zero printed as `0`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_zero() {
            return f.write_str("0");
        }
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Amount::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    #[test]
    fn test_parse_valid_forms() {
        assert_eq!(amt("100").to_string(), "100");
        assert_eq!(amt("  100.25 ").to_string(), "100.25");
        assert_eq!(amt("+7").to_string(), "7");
        assert_eq!(amt("-3.5").to_string(), "-3.5");
        assert_eq!(amt(".25").to_string(), "0.25");
        assert_eq!(amt("7.").to_string(), "7");
        assert_eq!(amt("000012.50").to_string(), "12.5");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Amount::parse(""), Err(AmountError::Empty));
        assert_eq!(Amount::parse("   "), Err(AmountError::Empty));
        assert!(matches!(Amount::parse("xyz"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("."), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("-"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("1e5"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("1_000"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("1 000"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("1.2.3"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("--1"), Err(AmountError::Malformed(_))));
        assert!(matches!(Amount::parse("NaN"), Err(AmountError::Malformed(_))));
    }

    #[test]
    fn test_parse_precision_limits() {
        assert!(Amount::parse("0.000000000000000001").is_ok()); // 18 places
        assert_eq!(
            Amount::parse("0.0000000000000000001"),
            Err(AmountError::TooPrecise { scale: 19 })
        );
        // 30 significant digits would be rounded by Decimal, so refuse it
        assert!(matches!(
            Amount::parse("123456789012345678901234567890"),
            Err(AmountError::OutOfRange(_))
        ));
        assert!(matches!(
            Amount::parse("12345678901234.123456789012345"),
            Err(AmountError::OutOfRange(_)) | Err(AmountError::TooPrecise { .. })
        ));
    }

    #[test]
    fn test_exact_arithmetic() {
        // The classic f64 failure: 0.1 + 0.2 != 0.3
        assert_eq!(amt("0.1").checked_add(amt("0.2")).unwrap(), amt("0.3"));
        assert_eq!(amt("100").checked_sub(amt("40")).unwrap(), amt("60"));
        assert_eq!(
            amt("0.000000000000000001")
                .checked_add(amt("99999999.999999999999999999"))
                .unwrap(),
            amt("100000000")
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        let max = Amount::from_decimal(Decimal::MAX);
        assert!(max.checked_add(amt("1")).is_none());
        let min = Amount::from_decimal(Decimal::MIN);
        assert!(min.checked_sub(amt("1")).is_none());
    }

    #[test]
    fn test_comparison_by_value() {
        assert_eq!(amt("1.0"), amt("1.00"));
        assert!(amt("40") < amt("100"));
        assert!(amt("100") <= amt("100.000"));
        assert!(amt("-0.01") < Amount::ZERO);
    }

    #[test]
    fn test_sign_inspection() {
        assert!(amt("-0.01").is_negative());
        assert!(!amt("-0").is_negative());
        assert!(!amt("0").is_positive());
        assert!(amt("0.01").is_positive());
        assert!(amt("-0").is_zero());
    }

    #[test]
    fn test_canonical_display() {
        assert_eq!(amt("150.50").to_string(), "150.5");
        assert_eq!(amt("100.00").to_string(), "100");
        assert_eq!(amt("0.000").to_string(), "0");
        assert_eq!(amt("-0").to_string(), "0");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&amt("250.50")).unwrap();
        assert_eq!(json, "\"250.5\"");

        let back: Amount = serde_json::from_str("\"250.50\"").unwrap();
        assert_eq!(back, amt("250.5"));

        assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
        assert!(serde_json::from_str::<Amount>("250.5").is_err()); // numbers are not accepted
    }
}
