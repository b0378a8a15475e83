//! Ledger Error Types
//!
//! Two layers:
//! - [`StoreError`]: what the transactional store reports, classified from
//!   driver errors (SQLSTATE) so the engine never inspects message text.
//! - [`LedgerError`]: the caller-facing taxonomy, with stable codes and HTTP
//!   status suggestions.

use thiserror::Error;

use crate::account::validation::{AssetCode, ValidationError};
use crate::core_types::WalletId;

/// SQLSTATE codes the store classifies
pub mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
    pub const LOCK_NOT_AVAILABLE: &str = "55P03";
    pub const QUERY_CANCELED: &str = "57014";
}

/// Store-level failure classification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Row not found: {0}")]
    NotFound(String),

    /// Transient contention: deadlock, serialization failure, lock timeout
    #[error("Write conflict: {0}")]
    WriteConflict(String),

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Classify a SQLSTATE code reported by the database
    pub fn from_sqlstate(code: &str, constraint: Option<&str>, message: &str) -> Self {
        match code {
            sqlstate::UNIQUE_VIOLATION => StoreError::UniqueViolation {
                constraint: constraint.unwrap_or("unknown").to_string(),
            },
            sqlstate::FOREIGN_KEY_VIOLATION | sqlstate::CHECK_VIOLATION => {
                StoreError::ConstraintViolation(message.to_string())
            }
            sqlstate::SERIALIZATION_FAILURE
            | sqlstate::DEADLOCK_DETECTED
            | sqlstate::LOCK_NOT_AVAILABLE
            | sqlstate::QUERY_CANCELED => StoreError::WriteConflict(message.to_string()),
            _ => StoreError::Unavailable(format!("[{}] {}", code, message)),
        }
    }

    #[inline]
    pub fn is_write_conflict(&self) -> bool {
        matches!(self, StoreError::WriteConflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db) => match db.code() {
                Some(code) => StoreError::from_sqlstate(&code, db.constraint(), db.message()),
                None => StoreError::Unavailable(db.message().to_string()),
            },
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Transfer engine / wallet service error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // === Validation Errors (rejected before any store access) ===
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Source and destination wallet cannot be the same")]
    SameWallet,

    #[error("Balance would overflow")]
    Overflow,

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    // === Lookup Errors ===
    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    // === Business-Rule Rejections ===
    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(AssetCode),

    #[error("Wallet asset mismatch: wallet={wallet} request={requested}")]
    AssetMismatch {
        wallet: AssetCode,
        requested: AssetCode,
    },

    #[error("Insufficient balance: available={available} requested={requested}")]
    InsufficientBalance { available: i64, requested: i64 },

    // === Transient / System Errors ===
    #[error("Write conflict: {0}")]
    WriteConflict(String),

    #[error("Transfer failed after {attempts} conflicting attempts")]
    ConflictExceeded { attempts: u32 },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Integrity violation: {0}")]
    Integrity(String),
}

impl LedgerError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount => "INVALID_AMOUNT",
            LedgerError::SameWallet => "SAME_WALLET",
            LedgerError::Overflow => "OVERFLOW",
            LedgerError::Validation(_) => "VALIDATION_ERROR",
            LedgerError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            LedgerError::UnsupportedAsset(_) => "UNSUPPORTED_ASSET",
            LedgerError::AssetMismatch { .. } => "ASSET_MISMATCH",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::WriteConflict(_) => "WRITE_CONFLICT",
            LedgerError::ConflictExceeded { .. } => "CONFLICT_EXCEEDED",
            LedgerError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            LedgerError::Integrity(_) => "INTEGRITY_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    ///
    /// Rejections the caller can act on map to 4xx; the "try again" class
    /// (conflict exhaustion, store failures) maps to 503.
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::InvalidAmount
            | LedgerError::SameWallet
            | LedgerError::Overflow
            | LedgerError::Validation(_) => 400,
            LedgerError::WalletNotFound(_) => 404,
            LedgerError::UnsupportedAsset(_)
            | LedgerError::AssetMismatch { .. }
            | LedgerError::InsufficientBalance { .. } => 422,
            LedgerError::WriteConflict(_)
            | LedgerError::ConflictExceeded { .. }
            | LedgerError::StoreUnavailable(_) => 503,
            LedgerError::Integrity(_) => 500,
        }
    }

    /// Whether the conflict retry policy may re-run the operation
    #[inline]
    pub fn is_write_conflict(&self) -> bool {
        matches!(self, LedgerError::WriteConflict(_))
    }

    /// Business-rule or validation rejection (as opposed to "try again")
    #[inline]
    pub fn is_rejection(&self) -> bool {
        (400..500).contains(&self.http_status())
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::WriteConflict(msg) => LedgerError::WriteConflict(msg),
            StoreError::Unavailable(msg) => LedgerError::StoreUnavailable(msg),
            StoreError::NotFound(msg) | StoreError::ConstraintViolation(msg) => {
                LedgerError::Integrity(msg)
            }
            StoreError::UniqueViolation { constraint } => {
                LedgerError::Integrity(format!("unique constraint violated: {}", constraint))
            }
        }
    }
}
