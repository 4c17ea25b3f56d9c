//! In-process ledger store
//!
//! Each account row carries an async row lock and its committed balance.
//! A transaction holds owned lock guards for the rows it locked and stages
//! its writes; commit publishes them under a store-wide gate so readers
//! never see one side of a transfer without the other. Dropping a
//! transaction releases its guards and discards the staged writes.
//!
//! Used when no PostgreSQL URL is configured, and by tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::OwnedMutexGuard;

use super::{LedgerStore, LedgerTx, StoreError};
use crate::account::models::Account;
use crate::account::validation::AccountId;
use crate::money::Amount;
use crate::transfer::types::{NewTransfer, TransferRecord};

struct Row {
    lock: Arc<tokio::sync::Mutex<()>>,
    committed: RwLock<Amount>,
}

impl Row {
    fn committed(&self) -> Amount {
        *self.committed.read().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Inner {
    accounts: DashMap<AccountId, Arc<Row>>,
    transfers: Mutex<Vec<TransferRecord>>,
    /// Commits take it exclusively, multi-row reads take it shared.
    gate: RwLock<()>,
    lock_timeout: Duration,
}

impl Inner {
    fn row(&self, id: &AccountId) -> Option<Arc<Row>> {
        self.accounts.get(id).map(|r| Arc::clone(r.value()))
    }
}

/// In-memory [`LedgerStore`]
#[derive(Clone)]
pub struct MemoryLedgerStore {
    inner: Arc<Inner>,
}

impl MemoryLedgerStore {
    /// `lock_timeout` bounds every wait for a row lock.
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                accounts: DashMap::new(),
                transfers: Mutex::new(Vec::new()),
                gate: RwLock::new(()),
                lock_timeout,
            }),
        }
    }

    /// Committed audit rows, oldest first
    pub fn transfer_log(&self) -> Vec<TransferRecord> {
        self.inner
            .transfers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of all committed balances, read as one consistent snapshot.
    /// `None` if the sum does not fit in an [`Amount`].
    pub fn total_balance(&self) -> Option<Amount> {
        let _gate = self.inner.gate.read().unwrap_or_else(PoisonError::into_inner);
        self.inner
            .accounts
            .iter()
            .try_fold(Amount::ZERO, |sum, row| {
                sum.checked_add(row.value().committed())
            })
    }

    pub fn account_count(&self) -> usize {
        self.inner.accounts.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert_account(&self, id: &AccountId, balance: Amount) -> Result<(), StoreError> {
        match self.inner.accounts.entry(id.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Row {
                    lock: Arc::new(tokio::sync::Mutex::new(())),
                    committed: RwLock::new(balance),
                }));
                Ok(())
            }
        }
    }

    async fn fetch_account(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self
            .inner
            .row(id)
            .map(|row| Account::new(id.clone(), row.committed())))
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        Ok(Box::new(MemoryLedgerTx {
            store: Arc::clone(&self.inner),
            held: Vec::new(),
            staged: HashMap::new(),
            records: Vec::new(),
        }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

struct HeldRow {
    id: AccountId,
    row: Arc<Row>,
    _guard: OwnedMutexGuard<()>,
}

/// Open transaction against [`MemoryLedgerStore`]
pub struct MemoryLedgerTx {
    store: Arc<Inner>,
    held: Vec<HeldRow>,
    staged: HashMap<AccountId, Amount>,
    records: Vec<TransferRecord>,
}

impl MemoryLedgerTx {
    fn holds(&self, id: &AccountId) -> Option<&HeldRow> {
        self.held.iter().find(|h| &h.id == id)
    }

    fn current(&self, held: &HeldRow) -> Amount {
        self.staged
            .get(&held.id)
            .copied()
            .unwrap_or_else(|| held.row.committed())
    }
}

#[async_trait]
impl LedgerTx for MemoryLedgerTx {
    async fn lock_accounts(&mut self, ids: &[&AccountId]) -> Result<Vec<Account>, StoreError> {
        let mut rows = Vec::with_capacity(ids.len());

        for &id in ids {
            if let Some(held) = self.holds(id) {
                rows.push(Account::new(id.clone(), self.current(held)));
                continue;
            }
            let Some(row) = self.store.row(id) else {
                continue;
            };

            let guard = tokio::time::timeout(
                self.store.lock_timeout,
                Arc::clone(&row.lock).lock_owned(),
            )
            .await
            .map_err(|_| StoreError::LockTimeout)?;

            rows.push(Account::new(id.clone(), row.committed()));
            self.held.push(HeldRow {
                id: id.clone(),
                row,
                _guard: guard,
            });
        }

        Ok(rows)
    }

    async fn set_balance(&mut self, id: &AccountId, balance: Amount) -> Result<(), StoreError> {
        if self.holds(id).is_none() {
            return Err(StoreError::NotLocked(id.to_string()));
        }
        self.staged.insert(id.clone(), balance);
        Ok(())
    }

    async fn record_transfer(
        &mut self,
        transfer: &NewTransfer,
    ) -> Result<TransferRecord, StoreError> {
        let record = TransferRecord {
            transfer_id: transfer.transfer_id,
            source: transfer.source.clone(),
            destination: transfer.destination.clone(),
            amount: transfer.amount,
            created_at: Utc::now(),
        };
        self.records.push(record.clone());
        Ok(record)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        {
            let _gate = this
                .store
                .gate
                .write()
                .unwrap_or_else(PoisonError::into_inner);

            for held in &this.held {
                if let Some(balance) = this.staged.get(&held.id) {
                    *held
                        .row
                        .committed
                        .write()
                        .unwrap_or_else(PoisonError::into_inner) = *balance;
                }
            }
            this.store
                .transfers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(this.records);
        }
        // row guards released here
        drop(this.held);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
