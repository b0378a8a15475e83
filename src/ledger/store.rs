//! Store contract consumed by the transfer engine
//!
//! All methods on [`UnitOfWork`] run inside one all-or-nothing database
//! transaction. Dropping a unit of work without calling `commit` rolls it
//! back, so a cancelled caller never leaves partial state behind.

use async_trait::async_trait;

use super::error::StoreError;
use super::models::Transaction;
use crate::account::validation::{AssetCode, ReferenceId};
use crate::core_types::{TransactionId, WalletId};

/// Unique constraint on `transactions.reference_id`
pub const REFERENCE_ID_CONSTRAINT: &str = "transactions_reference_id_key";

/// Wallet state observed under an exclusive row lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedWallet {
    pub id: WalletId,
    pub balance: i64,
    pub asset_code: AssetCode,
}

/// Entry point to the transactional store
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a new unit of work
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    /// Committed balance of a wallet (no lock)
    async fn wallet_balance(&self, wallet_id: WalletId) -> Result<i64, StoreError>;

    /// Asset code the wallet is configured for (no lock)
    async fn wallet_asset_code(&self, wallet_id: WalletId) -> Result<AssetCode, StoreError>;

    /// Committed transaction for an idempotency key, if any
    async fn find_transaction(
        &self,
        reference_id: &ReferenceId,
    ) -> Result<Option<Transaction>, StoreError>;
}

/// One atomic unit of work
#[async_trait]
pub trait UnitOfWork: Send {
    /// Acquire an exclusive row lock on the wallet and read it
    ///
    /// Returns `StoreError::NotFound` for unknown wallets and
    /// `StoreError::WriteConflict` when the lock cannot be acquired in time.
    async fn lock_wallet_for_update(
        &mut self,
        wallet_id: WalletId,
    ) -> Result<LockedWallet, StoreError>;

    async fn find_transaction_by_reference(
        &mut self,
        reference_id: &ReferenceId,
    ) -> Result<Option<Transaction>, StoreError>;

    /// Insert the transaction row
    ///
    /// A concurrent commit under the same `reference_id` surfaces as
    /// `StoreError::UniqueViolation`, here or at `commit`.
    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError>;

    /// Insert the debit and credit entries of one transaction
    async fn insert_ledger_entries(
        &mut self,
        transaction_id: TransactionId,
        debit_wallet: WalletId,
        credit_wallet: WalletId,
        amount: i64,
    ) -> Result<(), StoreError>;

    async fn adjust_wallet_balance(
        &mut self,
        wallet_id: WalletId,
        delta: i64,
    ) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// In-memory store for tests
///
/// Mirrors the row-locking semantics of PostgreSQL closely enough to exercise
/// the engine: one async mutex per wallet held until the unit of work ends,
/// buffered writes applied on commit, and a uniqueness check on
/// `reference_id` at insert and commit time.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

    use crate::ledger::models::LedgerEntry;

    #[derive(Debug, Clone)]
    struct WalletRow {
        asset_code: AssetCode,
        balance: i64,
    }

    #[derive(Default)]
    struct Committed {
        wallets: HashMap<WalletId, WalletRow>,
        transactions: Vec<Transaction>,
        entries: Vec<LedgerEntry>,
    }

    pub struct MockStore {
        committed: Arc<Mutex<Committed>>,
        locks: Mutex<HashMap<WalletId, Arc<AsyncMutex<()>>>>,
        lock_timeout: Duration,
        /// Lock attempts that fail with a write conflict before succeeding
        injected_conflicts: Arc<AtomicUsize>,
        /// Hide committed transactions from the in-unit idempotency lookup
        hide_existing_references: Arc<AtomicBool>,
        begin_count: AtomicUsize,
        unavailable: AtomicBool,
    }

    impl MockStore {
        pub fn new() -> Self {
            Self {
                committed: Arc::new(Mutex::new(Committed::default())),
                locks: Mutex::new(HashMap::new()),
                lock_timeout: Duration::from_secs(5),
                injected_conflicts: Arc::new(AtomicUsize::new(0)),
                hide_existing_references: Arc::new(AtomicBool::new(false)),
                begin_count: AtomicUsize::new(0),
                unavailable: AtomicBool::new(false),
            }
        }

        pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
            self.lock_timeout = timeout;
            self
        }

        pub fn add_wallet(&self, asset: &str, balance: i64) -> WalletId {
            let id = WalletId::new();
            self.insert_wallet(id, asset, balance);
            id
        }

        pub fn insert_wallet(&self, id: WalletId, asset: &str, balance: i64) {
            self.committed.lock().unwrap().wallets.insert(
                id,
                WalletRow {
                    asset_code: AssetCode::new(asset).unwrap(),
                    balance,
                },
            );
        }

        pub fn inject_conflicts(&self, n: usize) {
            self.injected_conflicts.store(n, Ordering::SeqCst);
        }

        pub fn set_hide_existing_references(&self, hide: bool) {
            self.hide_existing_references.store(hide, Ordering::SeqCst);
        }

        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        pub fn begin_count(&self) -> usize {
            self.begin_count.load(Ordering::SeqCst)
        }

        pub fn balance(&self, id: WalletId) -> i64 {
            self.committed.lock().unwrap().wallets[&id].balance
        }

        pub fn transactions_for(&self, reference: &str) -> Vec<Transaction> {
            self.committed
                .lock()
                .unwrap()
                .transactions
                .iter()
                .filter(|t| t.reference_id.as_str() == reference)
                .cloned()
                .collect()
        }

        pub fn transaction_count(&self) -> usize {
            self.committed.lock().unwrap().transactions.len()
        }

        pub fn entries(&self) -> Vec<LedgerEntry> {
            self.committed.lock().unwrap().entries.clone()
        }

        /// Credits minus debits over the wallet's ledger entries
        pub fn ledger_balance(&self, id: WalletId) -> i64 {
            self.committed
                .lock()
                .unwrap()
                .entries
                .iter()
                .filter(|e| e.wallet_id == id)
                .map(|e| e.direction.signed(e.amount))
                .sum()
        }

        /// Hold the row lock of a wallet outside any unit of work
        pub async fn hold_lock(&self, id: WalletId) -> OwnedMutexGuard<()> {
            self.lock_handle(id).lock_owned().await
        }

        fn lock_handle(&self, id: WalletId) -> Arc<AsyncMutex<()>> {
            self.locks
                .lock()
                .unwrap()
                .entry(id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        }
    }

    #[async_trait]
    impl LedgerStore for MockStore {
        async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection refused".into()));
            }
            self.begin_count.fetch_add(1, Ordering::SeqCst);
            let lock_handles = {
                let wallets = &self.committed.lock().unwrap().wallets;
                wallets
                    .keys()
                    .map(|id| (*id, self.lock_handle(*id)))
                    .collect()
            };
            Ok(Box::new(MockUnit {
                committed: self.committed.clone(),
                lock_handles,
                lock_timeout: self.lock_timeout,
                injected_conflicts: self.injected_conflicts.clone(),
                hide_existing_references: self.hide_existing_references.clone(),
                guards: Vec::new(),
                locked: HashMap::new(),
                pending_transaction: None,
                pending_entries: Vec::new(),
                pending_deltas: Vec::new(),
            }))
        }

        async fn wallet_balance(&self, wallet_id: WalletId) -> Result<i64, StoreError> {
            self.committed
                .lock()
                .unwrap()
                .wallets
                .get(&wallet_id)
                .map(|w| w.balance)
                .ok_or_else(|| StoreError::NotFound(format!("wallet {}", wallet_id)))
        }

        async fn wallet_asset_code(&self, wallet_id: WalletId) -> Result<AssetCode, StoreError> {
            self.committed
                .lock()
                .unwrap()
                .wallets
                .get(&wallet_id)
                .map(|w| w.asset_code.clone())
                .ok_or_else(|| StoreError::NotFound(format!("wallet {}", wallet_id)))
        }

        async fn find_transaction(
            &self,
            reference_id: &ReferenceId,
        ) -> Result<Option<Transaction>, StoreError> {
            Ok(self
                .committed
                .lock()
                .unwrap()
                .transactions
                .iter()
                .find(|t| &t.reference_id == reference_id)
                .cloned())
        }
    }

    struct MockUnit {
        committed: Arc<Mutex<Committed>>,
        lock_handles: HashMap<WalletId, Arc<AsyncMutex<()>>>,
        lock_timeout: Duration,
        injected_conflicts: Arc<AtomicUsize>,
        hide_existing_references: Arc<AtomicBool>,
        guards: Vec<OwnedMutexGuard<()>>,
        locked: HashMap<WalletId, LockedWallet>,
        pending_transaction: Option<Transaction>,
        pending_entries: Vec<LedgerEntry>,
        pending_deltas: Vec<(WalletId, i64)>,
    }

    impl MockUnit {
        fn reference_taken(&self, reference_id: &ReferenceId) -> bool {
            self.committed
                .lock()
                .unwrap()
                .transactions
                .iter()
                .any(|t| &t.reference_id == reference_id)
        }
    }

    #[async_trait]
    impl UnitOfWork for MockUnit {
        async fn lock_wallet_for_update(
            &mut self,
            wallet_id: WalletId,
        ) -> Result<LockedWallet, StoreError> {
            let injected = self.injected_conflicts.fetch_update(
                Ordering::SeqCst,
                Ordering::SeqCst,
                |n| n.checked_sub(1),
            );
            if injected.is_ok() {
                return Err(StoreError::WriteConflict("deadlock detected".into()));
            }

            if let Some(locked) = self.locked.get(&wallet_id) {
                return Ok(locked.clone());
            }

            let handle = self
                .lock_handles
                .get(&wallet_id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("wallet {}", wallet_id)))?;

            let guard = tokio::time::timeout(self.lock_timeout, handle.lock_owned())
                .await
                .map_err(|_| {
                    StoreError::WriteConflict("canceling statement due to lock timeout".into())
                })?;
            self.guards.push(guard);

            let row = self.committed.lock().unwrap().wallets[&wallet_id].clone();
            let locked = LockedWallet {
                id: wallet_id,
                balance: row.balance,
                asset_code: row.asset_code,
            };
            self.locked.insert(wallet_id, locked.clone());
            Ok(locked)
        }

        async fn find_transaction_by_reference(
            &mut self,
            reference_id: &ReferenceId,
        ) -> Result<Option<Transaction>, StoreError> {
            if self.hide_existing_references.load(Ordering::SeqCst) {
                return Ok(None);
            }
            Ok(self
                .committed
                .lock()
                .unwrap()
                .transactions
                .iter()
                .find(|t| &t.reference_id == reference_id)
                .cloned())
        }

        async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError> {
            if self.reference_taken(&transaction.reference_id) {
                return Err(StoreError::UniqueViolation {
                    constraint: REFERENCE_ID_CONSTRAINT.into(),
                });
            }
            self.pending_transaction = Some(transaction.clone());
            Ok(())
        }

        async fn insert_ledger_entries(
            &mut self,
            transaction_id: TransactionId,
            debit_wallet: WalletId,
            credit_wallet: WalletId,
            amount: i64,
        ) -> Result<(), StoreError> {
            self.pending_entries.extend(LedgerEntry::pair(
                transaction_id,
                debit_wallet,
                credit_wallet,
                amount,
            ));
            Ok(())
        }

        async fn adjust_wallet_balance(
            &mut self,
            wallet_id: WalletId,
            delta: i64,
        ) -> Result<(), StoreError> {
            if !self.locked.contains_key(&wallet_id) {
                return Err(StoreError::ConstraintViolation(format!(
                    "wallet {} updated without lock",
                    wallet_id
                )));
            }
            self.pending_deltas.push((wallet_id, delta));
            Ok(())
        }

        async fn commit(self: Box<Self>) -> Result<(), StoreError> {
            let mut committed = self.committed.lock().unwrap();
            if let Some(tx) = &self.pending_transaction
                && committed
                    .transactions
                    .iter()
                    .any(|t| t.reference_id == tx.reference_id)
            {
                return Err(StoreError::UniqueViolation {
                    constraint: REFERENCE_ID_CONSTRAINT.into(),
                });
            }
            for (wallet_id, delta) in &self.pending_deltas {
                let row = committed
                    .wallets
                    .get_mut(wallet_id)
                    .ok_or_else(|| StoreError::NotFound(format!("wallet {}", wallet_id)))?;
                row.balance += delta;
            }
            if let Some(tx) = self.pending_transaction.clone() {
                committed.transactions.push(tx);
            }
            committed.entries.extend(self.pending_entries.iter().cloned());
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
            Ok(())
        }
    }
}
