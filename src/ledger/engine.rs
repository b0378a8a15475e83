//! Transfer Engine
//!
//! Moves `amount` minor units from one wallet to another under an
//! idempotency key, as one atomic unit of work:
//!
//! ```text
//! find(reference) ──found──▶ commit no-op ─▶ AlreadyApplied
//!       │
//!       ▼
//! lock(min(from,to)) ─▶ lock(max(from,to)) ─▶ find(reference) again ─▶ balance check ──short──▶ rollback ─▶ InsufficientBalance
//!                                                   │
//!                                                   ▼
//!              insert transaction ─▶ insert debit+credit ─▶ adjust balances ─▶ commit ─▶ Applied
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Lock Ordering**: wallets are locked lower id first, independent of
//!    direction, so two transfers over the same pair cannot form a lock cycle.
//! 2. **Lock-Before-Read**: the balance used for the check is read under the
//!    exclusive row lock of the same unit of work.
//! 3. **Exactly Once**: the reference is looked up again once both locks
//!    are held, so a duplicate that committed while this call waited is
//!    reported as `AlreadyApplied`. A unique violation on `reference_id` at
//!    insert is reported the same way.
//! 4. **All or Nothing**: every error path drops the unit of work uncommitted.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::{LedgerError, StoreError};
use super::models::{Transaction, TransactionType};
use super::store::{LedgerStore, LockedWallet, REFERENCE_ID_CONSTRAINT, UnitOfWork};
use crate::account::validation::ReferenceId;
use crate::core_types::WalletId;

/// One invocation of the transfer primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCommand {
    pub reference_id: ReferenceId,
    pub tx_type: TransactionType,
    pub from: WalletId,
    pub to: WalletId,
    /// Minor units, strictly positive
    pub amount: i64,
}

impl TransferCommand {
    pub fn new(
        reference_id: ReferenceId,
        tx_type: TransactionType,
        from: WalletId,
        to: WalletId,
        amount: i64,
    ) -> Self {
        Self {
            reference_id,
            tx_type,
            from,
            to,
            amount,
        }
    }

    /// Reject inputs that never need a store round-trip
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if self.from == self.to {
            return Err(LedgerError::SameWallet);
        }
        Ok(())
    }
}

/// Successful result of the primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Funds moved by this call
    Applied(Transaction),
    /// The reference was already committed; nothing moved
    AlreadyApplied(Transaction),
}

impl TransferOutcome {
    pub fn transaction(&self) -> &Transaction {
        match self {
            TransferOutcome::Applied(tx) | TransferOutcome::AlreadyApplied(tx) => tx,
        }
    }

    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, TransferOutcome::Applied(_))
    }

    pub fn status_str(&self) -> &'static str {
        match self {
            TransferOutcome::Applied(_) => "applied",
            TransferOutcome::AlreadyApplied(_) => "already_applied",
        }
    }
}

/// Transfer Engine - sole writer of transactions, entries and balances
///
/// Holds no mutable state of its own; all coordination happens through the
/// store's row locks.
pub struct TransferEngine {
    store: Arc<dyn LedgerStore>,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Run one attempt of the primitive
    ///
    /// Write conflicts are returned as `LedgerError::WriteConflict`; wrapping
    /// the call in a [`RetryPolicy`](super::retry::RetryPolicy) is the
    /// caller's job.
    pub async fn execute(&self, cmd: &TransferCommand) -> Result<TransferOutcome, LedgerError> {
        cmd.validate()?;

        let mut uow = self.store.begin().await?;

        // 1. Idempotency check
        if let Some(existing) = uow.find_transaction_by_reference(&cmd.reference_id).await? {
            uow.commit().await?;
            info!(
                reference_id = %cmd.reference_id,
                transaction_id = %existing.id,
                "Transfer already applied - idempotent replay"
            );
            return Ok(TransferOutcome::AlreadyApplied(existing));
        }

        // 2-3. Lock both wallets in global order, then check funds
        let (source, destination) = lock_pair(uow.as_mut(), cmd.from, cmd.to).await?;

        // A duplicate that committed while we waited on the locks
        if let Some(existing) = uow.find_transaction_by_reference(&cmd.reference_id).await? {
            uow.rollback().await?;
            info!(
                reference_id = %cmd.reference_id,
                transaction_id = %existing.id,
                "Concurrent duplicate committed while waiting on locks"
            );
            return Ok(TransferOutcome::AlreadyApplied(existing));
        }

        if source.asset_code != destination.asset_code {
            uow.rollback().await?;
            return Err(LedgerError::AssetMismatch {
                wallet: destination.asset_code,
                requested: source.asset_code,
            });
        }

        if source.balance < cmd.amount {
            uow.rollback().await?;
            debug!(
                reference_id = %cmd.reference_id,
                wallet_id = %source.id,
                available = source.balance,
                requested = cmd.amount,
                "Insufficient balance"
            );
            return Err(LedgerError::InsufficientBalance {
                available: source.balance,
                requested: cmd.amount,
            });
        }

        if destination.balance.checked_add(cmd.amount).is_none() {
            uow.rollback().await?;
            return Err(LedgerError::Overflow);
        }

        // 4-6. Record, project, commit
        let transaction = Transaction::completed(cmd.reference_id.clone(), cmd.tx_type);
        match record_and_commit(uow, &transaction, cmd).await {
            Ok(()) => {
                info!(
                    reference_id = %cmd.reference_id,
                    transaction_id = %transaction.id,
                    tx_type = %cmd.tx_type,
                    from = %cmd.from,
                    to = %cmd.to,
                    amount = cmd.amount,
                    "Transfer applied"
                );
                Ok(TransferOutcome::Applied(transaction))
            }
            Err(StoreError::UniqueViolation { constraint })
                if constraint == REFERENCE_ID_CONSTRAINT =>
            {
                // Lost the race against a concurrent call with the same key.
                let existing = self
                    .store
                    .find_transaction(&cmd.reference_id)
                    .await?
                    .ok_or_else(|| {
                        LedgerError::Integrity(format!(
                            "no transaction for reference {} after unique violation",
                            cmd.reference_id
                        ))
                    })?;
                info!(
                    reference_id = %cmd.reference_id,
                    transaction_id = %existing.id,
                    "Concurrent duplicate detected at insert - treating as already applied"
                );
                Ok(TransferOutcome::AlreadyApplied(existing))
            }
            Err(e) => {
                if e.is_write_conflict() {
                    warn!(reference_id = %cmd.reference_id, error = %e, "Write conflict");
                }
                Err(e.into())
            }
        }
    }
}

/// Lock `from` and `to` lower id first; returns (source, destination)
async fn lock_pair<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    from: WalletId,
    to: WalletId,
) -> Result<(LockedWallet, LockedWallet), LedgerError> {
    let (first, second) = if from < to { (from, to) } else { (to, from) };

    let first_locked = lock_one(uow, first).await?;
    let second_locked = lock_one(uow, second).await?;
    debug!(first = %first, second = %second, "Wallet pair locked");

    if first == from {
        Ok((first_locked, second_locked))
    } else {
        Ok((second_locked, first_locked))
    }
}

async fn lock_one<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    wallet_id: WalletId,
) -> Result<LockedWallet, LedgerError> {
    match uow.lock_wallet_for_update(wallet_id).await {
        Ok(w) => Ok(w),
        Err(StoreError::NotFound(_)) => Err(LedgerError::WalletNotFound(wallet_id)),
        Err(e) => Err(e.into()),
    }
}

async fn record_and_commit(
    mut uow: Box<dyn UnitOfWork>,
    transaction: &Transaction,
    cmd: &TransferCommand,
) -> Result<(), StoreError> {
    uow.insert_transaction(transaction).await?;
    uow.insert_ledger_entries(transaction.id, cmd.from, cmd.to, cmd.amount)
        .await?;
    uow.adjust_wallet_balance(cmd.from, -cmd.amount).await?;
    uow.adjust_wallet_balance(cmd.to, cmd.amount).await?;
    uow.commit().await
}
