//! Transfer Core Types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::account::validation::AccountId;
use crate::money::Amount;

/// Transfer identifier - ULID-based, sortable by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(ulid::Ulid);

impl TransferId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Get the inner ULID value
    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

impl TryFrom<String> for TransferId {
    type Error = ulid::DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for TransferId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A validated transfer request
#[derive(Debug, Clone, PartialEq)]
pub struct TransferCommand {
    pub source: AccountId,
    pub destination: AccountId,
    pub amount: Amount,
}

impl TransferCommand {
    /// Both accounts in global lock order (byte-wise ascending).
    ///
    /// The order is independent of which side is source and which is
    /// destination, so opposing transfers on one pair never deadlock.
    pub fn lock_order(&self) -> [&AccountId; 2] {
        if self.source <= self.destination {
            [&self.source, &self.destination]
        } else {
            [&self.destination, &self.source]
        }
    }
}

/// Audit row to be written inside the transfer's transaction
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    pub transfer_id: TransferId,
    pub source: AccountId,
    pub destination: AccountId,
    pub amount: Amount,
}

/// Committed audit row (`transactions` table)
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TransferRecord {
    #[sqlx(try_from = "String")]
    pub transfer_id: TransferId,
    #[sqlx(rename = "source_account_id")]
    pub source: AccountId,
    #[sqlx(rename = "destination_account_id")]
    pub destination: AccountId,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

/// What a successful transfer returns to its caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReceipt {
    pub transfer_id: TransferId,
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

impl From<TransferRecord> for TransferReceipt {
    fn from(r: TransferRecord) -> Self {
        Self {
            transfer_id: r.transfer_id,
            source_account_id: r.source,
            destination_account_id: r.destination,
            amount: r.amount,
            created_at: r.created_at,
        }
    }
}
