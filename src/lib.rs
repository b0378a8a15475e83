//! Wallet Ledger - double-entry value-transfer ledger
//!
//! Idempotent, deadlock-free wallet transfers on PostgreSQL.
//!
//! # Modules
//!
//! - [`core_types`] - Identifier types (WalletId, UserId, AssetId)
//! - [`account`] - Provisioning of users, assets and wallets
//! - [`ledger`] - Transfer engine, retry policy, asset policy, wallet service
//! - [`db`] - PostgreSQL pool, migrations, health check
//! - [`config`] - YAML application config
//! - [`logging`] - tracing subscriber setup
//! - [`gateway`] - HTTP API

// Core types - must be first!
pub mod core_types;

pub mod account;
pub mod config;
pub mod db;
pub mod gateway;
pub mod ledger;
pub mod logging;

// Convenient re-exports at crate root
pub use core_types::{AssetId, UserId, WalletId};
pub use ledger::{
    AssetPolicy, LedgerError, RetryPolicy, TransferEngine, TransferOutcome, WalletService,
};
