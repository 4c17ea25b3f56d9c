//! Data models for ledger accounts

use serde::Serialize;

use super::validation::AccountId;
use crate::money::Amount;

/// Account row as stored
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Account {
    #[serde(rename = "account_id")]
    pub id: AccountId,
    pub balance: Amount,
}

impl Account {
    pub fn new(id: AccountId, balance: Amount) -> Self {
        Self { id, balance }
    }

    /// Whether `amount` can be debited without going negative
    pub fn can_cover(&self, amount: Amount) -> bool {
        self.balance >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, balance: &str) -> Account {
        Account::new(AccountId::new(id).unwrap(), Amount::parse(balance).unwrap())
    }

    #[test]
    fn test_can_cover() {
        let acc = account("acc-1", "100");
        assert!(acc.can_cover(Amount::parse("40").unwrap()));
        assert!(acc.can_cover(Amount::parse("100.000").unwrap()));
        assert!(!acc.can_cover(Amount::parse("100.01").unwrap()));
    }

    #[test]
    fn test_serializes_with_string_balance() {
        let json = serde_json::to_value(account("acc-1", "150.50")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "account_id": "acc-1", "balance": "150.5" })
        );
    }
}
