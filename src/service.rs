//! Ledger service: the contract the HTTP boundary calls into
//!
//! Every operation takes raw strings, runs them through the validation
//! layer, and hands typed values to the Account Store or the Transfer
//! Engine.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::warn;

use crate::account::models::Account;
use crate::account::store::AccountStore;
use crate::account::validation::{validate_account_id, validate_create_account, validate_transfer};
use crate::config::{AppConfig, LedgerConfig};
use crate::context::RequestContext;
use crate::db::Database;
use crate::error::LedgerError;
use crate::store::{LedgerStore, MemoryLedgerStore, PgLedgerStore, StoreError};
use crate::transfer::engine::TransferEngine;
use crate::transfer::retry::RetryPolicy;
use crate::transfer::types::TransferReceipt;

pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    accounts: AccountStore,
    engine: TransferEngine,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>, cfg: &LedgerConfig) -> Self {
        let engine = TransferEngine::new(
            Arc::clone(&store),
            RetryPolicy::from_config(cfg),
            Duration::from_millis(cfg.attempt_timeout_ms),
        );
        Self {
            accounts: AccountStore::new(Arc::clone(&store)),
            store,
            engine,
        }
    }

    pub fn in_memory(cfg: &LedgerConfig) -> Self {
        let store = MemoryLedgerStore::new(Duration::from_millis(cfg.lock_timeout_ms));
        Self::new(Arc::new(store), cfg)
    }

    /// PostgreSQL when `postgres_url` is set (migrations applied), else in memory.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let Some(url) = config.postgres_url.as_deref() else {
            warn!("postgres_url not set, using in-memory store; balances are lost on exit");
            return Ok(Self::in_memory(&config.ledger));
        };

        let db = Database::connect(url, &config.postgres)
            .await
            .context("Failed to connect to PostgreSQL")?;
        db.migrate().await.context("Failed to apply migrations")?;

        let store = PgLedgerStore::new(
            db.pool().clone(),
            Duration::from_millis(config.ledger.lock_timeout_ms),
        );
        Ok(Self::new(Arc::new(store), &config.ledger))
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }

    /// CreateAccount(id, initialBalance)
    pub async fn create_account(
        &self,
        ctx: &RequestContext,
        account_id: &str,
        initial_balance: &str,
    ) -> Result<Account, LedgerError> {
        let new = validate_create_account(account_id, initial_balance)?;
        self.accounts.create(ctx, &new).await?;
        Ok(Account::new(new.id, new.initial_balance))
    }

    /// GetAccount(id)
    pub async fn get_account(
        &self,
        ctx: &RequestContext,
        account_id: &str,
    ) -> Result<Account, LedgerError> {
        let id = validate_account_id(account_id)?;
        self.accounts.get(ctx, &id).await
    }

    /// Transfer(sourceID, destID, amount)
    pub async fn transfer(
        &self,
        ctx: &RequestContext,
        source_account_id: &str,
        destination_account_id: &str,
        amount: &str,
    ) -> Result<TransferReceipt, LedgerError> {
        let cmd = validate_transfer(source_account_id, destination_account_id, amount)?;
        self.engine.transfer(ctx, &cmd).await
    }
}
