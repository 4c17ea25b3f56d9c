//! PostgreSQL ledger store
//!
//! Row locks are taken with `SELECT ... FOR UPDATE`, one statement per id so
//! the lock order is exactly the order the caller passes. Every transaction
//! sets a local `lock_timeout`, so a blocked lock surfaces as SQLSTATE 55P03
//! instead of waiting forever.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::{LedgerStore, LedgerTx, StoreError};
use crate::account::models::Account;
use crate::account::validation::AccountId;
use crate::money::Amount;
use crate::transfer::types::{NewTransfer, TransferRecord};

pub struct PgLedgerStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn insert_account(&self, id: &AccountId, balance: Amount) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO accounts (id, balance) VALUES ($1, $2)")
            .bind(id)
            .bind(balance)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn fetch_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>("SELECT id, balance FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // is_local = true: reverts at commit or rollback
        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis().max(1)))
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PgLedgerTx {
            tx,
            locked: Vec::new(),
        }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Open transaction against [`PgLedgerStore`]
///
/// Dropping it without commit returns the connection to the pool with a
/// rollback queued.
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
    locked: Vec<AccountId>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn lock_accounts(&mut self, ids: &[&AccountId]) -> Result<Vec<Account>, StoreError> {
        let mut rows = Vec::with_capacity(ids.len());

        for &id in ids {
            let row = sqlx::query_as::<_, Account>(
                "SELECT id, balance FROM accounts WHERE id = $1 FOR UPDATE",
            )
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

            if let Some(account) = row {
                if !self.locked.contains(id) {
                    self.locked.push(id.clone());
                }
                rows.push(account);
            }
        }

        Ok(rows)
    }

    async fn set_balance(&mut self, id: &AccountId, balance: Amount) -> Result<(), StoreError> {
        if !self.locked.contains(id) {
            return Err(StoreError::NotLocked(id.to_string()));
        }

        let result =
            sqlx::query("UPDATE accounts SET balance = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(balance)
                .execute(&mut *self.tx)
                .await?;

        if result.rows_affected() != 1 {
            return Err(StoreError::NotLocked(id.to_string()));
        }
        Ok(())
    }

    async fn record_transfer(
        &mut self,
        transfer: &NewTransfer,
    ) -> Result<TransferRecord, StoreError> {
        let record = sqlx::query_as::<_, TransferRecord>(
            r#"
            INSERT INTO transactions (transfer_id, source_account_id, destination_account_id, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING transfer_id, source_account_id, destination_account_id, amount, created_at
            "#,
        )
        .bind(transfer.transfer_id.to_string())
        .bind(&transfer.source)
        .bind(&transfer.destination)
        .bind(transfer.amount)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(record)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
