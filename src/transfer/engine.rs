//! Transfer Engine
//!
//! Moves funds between two accounts as one atomic unit:
//!
//! 1. open a transaction
//! 2. lock both rows in global order (byte-wise ascending id)
//! 3. destination must exist, then source must exist
//! 4. source balance must cover the amount
//! 5. write both balances and the audit row
//! 6. commit
//!
//! Any failure before commit rolls the transaction back. Lock timeouts and
//! serialization conflicts are retried with backoff up to the configured
//! attempt count. The work before commit is also bounded in wall-clock
//! time; the commit itself is never retried on a timeout.
//!
//! # Cancellation
//! Dropping the future returned by [`TransferEngine::transfer`] drops the
//! open transaction, which the store rolls back and whose locks it releases.

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, debug, error, info, info_span, warn};

use super::retry::RetryPolicy;
use super::state::TransferState;
use super::types::{NewTransfer, TransferCommand, TransferId, TransferReceipt, TransferRecord};
use crate::context::RequestContext;
use crate::error::LedgerError;
use crate::store::{LedgerStore, LedgerTx, StoreError};

/// Outcome of one failed attempt
#[derive(Debug)]
enum AttemptError {
    /// Transient conflict, the whole attempt may be re-run
    Retryable(StoreError),
    /// Surfaced to the caller as-is
    Fatal(LedgerError),
}

impl From<StoreError> for AttemptError {
    fn from(e: StoreError) -> Self {
        if e.is_retryable() {
            AttemptError::Retryable(e)
        } else {
            AttemptError::Fatal(LedgerError::processing_failed(e))
        }
    }
}

impl From<LedgerError> for AttemptError {
    fn from(e: LedgerError) -> Self {
        AttemptError::Fatal(e)
    }
}

fn advance(state: &mut TransferState, next: TransferState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal transfer transition {state} -> {next}"
    );
    debug!(from = %state, to = %next, "transfer state");
    *state = next;
}

pub struct TransferEngine {
    store: Arc<dyn LedgerStore>,
    retry: RetryPolicy,
    attempt_timeout: Duration,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn LedgerStore>, retry: RetryPolicy, attempt_timeout: Duration) -> Self {
        Self {
            store,
            retry,
            attempt_timeout,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Execute a validated transfer.
    pub async fn transfer(
        &self,
        ctx: &RequestContext,
        cmd: &TransferCommand,
    ) -> Result<TransferReceipt, LedgerError> {
        let span = info_span!(
            parent: &ctx.span,
            "transfer",
            source = %cmd.source,
            destination = %cmd.destination,
            amount = %cmd.amount,
        );

        async {
            let mut attempt = 0u32;
            loop {
                attempt += 1;

                match self.attempt(cmd).await {
                    Ok(receipt) => {
                        info!(transfer_id = %receipt.transfer_id, attempt, "transfer committed");
                        return Ok(receipt);
                    }
                    Err(AttemptError::Fatal(e)) => {
                        match &e {
                            LedgerError::ProcessingFailed { .. }
                            | LedgerError::StoreUnavailable { .. } => {
                                error!(error = %e, attempt, "transfer failed")
                            }
                            _ => info!(code = e.code(), "transfer rejected"),
                        }
                        return Err(e);
                    }
                    Err(AttemptError::Retryable(e)) if self.retry.should_retry(attempt) => {
                        let delay = self.retry.backoff(attempt);
                        warn!(
                            error = %e,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "transient conflict, retrying transfer"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    Err(AttemptError::Retryable(e)) => {
                        error!(error = %e, attempts = attempt, "transfer retries exhausted");
                        return Err(match e {
                            StoreError::LockTimeout => LedgerError::Timeout,
                            other => LedgerError::processing_failed(other),
                        });
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// One attempt: prepare under the attempt deadline, then commit.
    ///
    /// The commit is awaited outside the deadline; a late commit
    /// acknowledgement is never turned into a retry.
    async fn attempt(&self, cmd: &TransferCommand) -> Result<TransferReceipt, AttemptError> {
        let mut state = TransferState::Started;

        let prepared =
            tokio::time::timeout(self.attempt_timeout, self.prepare(cmd, &mut state)).await;
        let (tx, record) = match prepared {
            Ok(res) => res?,
            Err(_) => {
                // the dropped future dropped its transaction, which rolls back
                warn!(
                    timeout_ms = self.attempt_timeout.as_millis() as u64,
                    "transfer attempt timed out"
                );
                if !state.is_terminal() {
                    advance(&mut state, TransferState::RolledBack);
                }
                return Err(AttemptError::Retryable(StoreError::LockTimeout));
            }
        };

        match tx.commit().await {
            Ok(()) => {
                advance(&mut state, TransferState::Committed);
                Ok(record.into())
            }
            Err(e) => {
                advance(&mut state, TransferState::RolledBack);
                Err(e.into())
            }
        }
    }

    /// Open a transaction and apply the transfer, leaving it ready to commit.
    /// Rolls back on any error.
    async fn prepare(
        &self,
        cmd: &TransferCommand,
        state: &mut TransferState,
    ) -> Result<(Box<dyn LedgerTx>, TransferRecord), AttemptError> {
        let mut tx = match self.store.begin().await {
            Ok(tx) => tx,
            Err(e) if e.is_retryable() => return Err(AttemptError::Retryable(e)),
            Err(e) => return Err(AttemptError::Fatal(LedgerError::store_unavailable(e))),
        };

        match Self::apply(tx.as_mut(), cmd, state).await {
            Ok(record) => Ok((tx, record)),
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!(error = %rb, "rollback failed, connection discarded");
                }
                advance(state, TransferState::RolledBack);
                Err(e)
            }
        }
    }

    async fn apply(
        tx: &mut dyn LedgerTx,
        cmd: &TransferCommand,
        state: &mut TransferState,
    ) -> Result<TransferRecord, AttemptError> {
        let rows = tx.lock_accounts(&cmd.lock_order()).await?;
        advance(state, TransferState::LocksAcquired);

        let destination = rows
            .iter()
            .find(|a| a.id == cmd.destination)
            .ok_or(LedgerError::DestinationNotFound)?;
        let source = rows
            .iter()
            .find(|a| a.id == cmd.source)
            .ok_or(LedgerError::SourceNotFound)?;

        if !source.can_cover(cmd.amount) {
            debug!(balance = %source.balance, "insufficient funds");
            return Err(LedgerError::InsufficientFunds.into());
        }
        let new_source = source
            .balance
            .checked_sub(cmd.amount)
            .ok_or(LedgerError::InsufficientFunds)?;
        let new_destination = destination
            .balance
            .checked_add(cmd.amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        advance(state, TransferState::BalancesValidated);

        tx.set_balance(&cmd.source, new_source).await?;
        tx.set_balance(&cmd.destination, new_destination).await?;
        let record = tx
            .record_transfer(&NewTransfer {
                transfer_id: TransferId::new(),
                source: cmd.source.clone(),
                destination: cmd.destination.clone(),
                amount: cmd.amount,
            })
            .await?;
        advance(state, TransferState::Applied);

        Ok(record)
    }
}
