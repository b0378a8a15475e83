//! Account provisioning
//!
//! Users, asset types and wallets. Provisioning is plain inserts; balances
//! only move through the ledger.

pub mod error;
pub mod models;
pub mod repository;
pub mod validation;

pub use error::AccountError;
pub use models::{Asset, User, Wallet};
pub use repository::AccountRepository;
pub use validation::{AssetCode, ReferenceId, ValidationError};
