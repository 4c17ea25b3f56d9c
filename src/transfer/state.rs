//! Transfer attempt lifecycle
//!
//! ```text
//! Started -> LocksAcquired -> BalancesValidated -> Applied -> Committed
//!    \              \                 \               \
//!     +--------------+-----------------+---------------+--> RolledBack
//! ```
//!
//! Each retry of a transfer is a fresh attempt starting at `Started`.

use std::fmt;

/// Transfer attempt states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    /// Transaction opened, no locks held yet
    Started,

    /// Both account rows locked in global order
    LocksAcquired,

    /// Existence and funds checked under the locks
    BalancesValidated,

    /// Debit, credit and audit row written, not yet committed
    Applied,

    /// Terminal: transaction committed
    Committed,

    /// Terminal: transaction rolled back, nothing applied
    RolledBack,
}

impl TransferState {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Committed | TransferState::RolledBack)
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: TransferState) -> bool {
        use TransferState::*;
        match (self, next) {
            (Started, LocksAcquired)
            | (LocksAcquired, BalancesValidated)
            | (BalancesValidated, Applied)
            | (Applied, Committed) => true,
            (from, RolledBack) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Started => "STARTED",
            TransferState::LocksAcquired => "LOCKS_ACQUIRED",
            TransferState::BalancesValidated => "BALANCES_VALIDATED",
            TransferState::Applied => "APPLIED",
            TransferState::Committed => "COMMITTED",
            TransferState::RolledBack => "ROLLED_BACK",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
