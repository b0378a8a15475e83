//! Value-transfer ledger
//!
//! Every balance change is a [`Transaction`](models::Transaction) with exactly
//! one debit and one credit [`LedgerEntry`](models::LedgerEntry) of the same
//! amount, committed atomically with the balance projection on both wallets.
//!
//! - [`engine`]: the single write path (idempotency, ordered locks, balance check)
//! - [`retry`]: bounded re-execution on write conflicts
//! - [`asset_policy`]: asset → treasury / revenue wallets
//! - [`service`]: caller-facing operations
//! - [`store`] / [`pg_store`]: transactional storage seam and its PostgreSQL implementation

pub mod asset_policy;
pub mod engine;
pub mod error;
pub mod models;
pub mod pg_store;
pub mod retry;
pub mod service;
pub mod store;

pub use asset_policy::{AssetPolicy, AssetWallets, CounterpartyRole};
pub use engine::{TransferCommand, TransferEngine, TransferOutcome};
pub use error::{LedgerError, StoreError};
pub use models::{Direction, LedgerEntry, Transaction, TransactionStatus, TransactionType};
pub use pg_store::PgLedgerStore;
pub use retry::RetryPolicy;
pub use service::WalletService;
pub use store::{LedgerStore, UnitOfWork};
