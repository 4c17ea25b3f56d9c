//! Account Store: create and read single account rows

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span};

use super::models::Account;
use super::validation::{AccountId, NewAccount};
use crate::context::RequestContext;
use crate::error::LedgerError;
use crate::store::{LedgerStore, StoreError};

/// Account CRUD over a [`LedgerStore`]
#[derive(Clone)]
pub struct AccountStore {
    store: Arc<dyn LedgerStore>,
}

impl AccountStore {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Insert a new account.
    ///
    /// Duplicates are detected by the datastore's uniqueness constraint, so
    /// two racing creates for one id yield exactly one success.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        account: &NewAccount,
    ) -> Result<(), LedgerError> {
        let span = info_span!(
            parent: &ctx.span,
            "create_account",
            account_id = %account.id,
        );

        async {
            match self
                .store
                .insert_account(&account.id, account.initial_balance)
                .await
            {
                Ok(()) => {
                    info!(balance = %account.initial_balance, "account created");
                    Ok(())
                }
                Err(StoreError::UniqueViolation) => {
                    debug!("account already exists");
                    Err(LedgerError::AccountExists)
                }
                Err(e) => {
                    error!(error = %e, backend = self.store.name(), "failed to create account");
                    Err(LedgerError::store_unavailable(e))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Point-in-time read of one account
    pub async fn get(&self, ctx: &RequestContext, id: &AccountId) -> Result<Account, LedgerError> {
        let span = info_span!(parent: &ctx.span, "get_account", account_id = %id);

        async {
            match self.store.fetch_account(id).await {
                Ok(Some(account)) => Ok(account),
                Ok(None) => Err(LedgerError::AccountNotFound),
                Err(e) => {
                    error!(error = %e, backend = self.store.name(), "failed to read account");
                    Err(LedgerError::store_unavailable(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}
