//! Provisioning error types

use thiserror::Error;

use super::validation::ValidationError;
use crate::ledger::error::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl AccountError {
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::AlreadyExists(_) => "ALREADY_EXISTS",
            AccountError::NotFound(_) => "NOT_FOUND",
            AccountError::Validation(_) => "VALIDATION_ERROR",
            AccountError::Store(StoreError::Unavailable(_)) => "STORE_UNAVAILABLE",
            AccountError::Store(_) => "STORE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            AccountError::AlreadyExists(_) => 409,
            AccountError::NotFound(_) => 404,
            AccountError::Validation(_) => 400,
            AccountError::Store(StoreError::Unavailable(_) | StoreError::WriteConflict(_)) => 503,
            AccountError::Store(_) => 500,
        }
    }
}

impl From<StoreError> for AccountError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation { constraint } => AccountError::AlreadyExists(constraint),
            // Dangling reference, e.g. a wallet for an unknown user or asset
            StoreError::ConstraintViolation(msg) | StoreError::NotFound(msg) => {
                AccountError::NotFound(msg)
            }
            other => AccountError::Store(other),
        }
    }
}

impl From<sqlx::Error> for AccountError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::from(e).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::error::sqlstate;

    #[test]
    fn test_unique_violation_is_already_exists() {
        let store = StoreError::from_sqlstate(
            sqlstate::UNIQUE_VIOLATION,
            Some("assets_code_key"),
            "duplicate key value",
        );
        let err = AccountError::from(store);
        assert_eq!(err, AccountError::AlreadyExists("assets_code_key".to_string()));
        assert_eq!(err.http_status(), 409);
        assert_eq!(err.code(), "ALREADY_EXISTS");
    }

    #[test]
    fn test_foreign_key_violation_is_not_found() {
        let store = StoreError::from_sqlstate(
            sqlstate::FOREIGN_KEY_VIOLATION,
            Some("wallets_user_id_fkey"),
            "insert or update on table \"wallets\" violates foreign key constraint",
        );
        let err = AccountError::from(store);
        assert!(matches!(err, AccountError::NotFound(_)));
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn test_unavailable_is_retryable_status() {
        let err = AccountError::from(StoreError::Unavailable("pool timed out".to_string()));
        assert_eq!(err.http_status(), 503);
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
    }
}
