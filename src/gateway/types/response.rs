//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: handler error, rendered as an `ApiResponse` with `data: null`
//! - `error_codes`: Standard error code constants
//! - Response DTOs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::account::{AccountError, Wallet};
use crate::ledger::{LedgerError, TransferOutcome};

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Handler errors
// ============================================================================

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap `data` in a success envelope
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_PARAMETER,
            msg,
        )
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            "internal error",
        )
    }

    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let status = StatusCode::from_u16(e.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = e.code(), error = %e, "Ledger operation failed");
        }
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return Self::internal();
        }

        let code = match &e {
            LedgerError::InsufficientBalance { .. } => error_codes::INSUFFICIENT_BALANCE,
            LedgerError::UnsupportedAsset(_) => error_codes::UNSUPPORTED_ASSET,
            LedgerError::AssetMismatch { .. } => error_codes::ASSET_MISMATCH,
            LedgerError::WalletNotFound(_) => error_codes::NOT_FOUND,
            LedgerError::ConflictExceeded { .. } | LedgerError::WriteConflict(_) => {
                error_codes::CONFLICT_EXCEEDED
            }
            LedgerError::StoreUnavailable(_) => error_codes::SERVICE_UNAVAILABLE,
            _ => error_codes::INVALID_PARAMETER,
        };
        Self::new(status, code, e.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        let status = StatusCode::from_u16(e.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match &e {
            AccountError::AlreadyExists(_) => {
                Self::new(status, error_codes::ALREADY_EXISTS, e.to_string())
            }
            AccountError::NotFound(_) => Self::new(status, error_codes::NOT_FOUND, e.to_string()),
            AccountError::Validation(_) => {
                Self::new(status, error_codes::INVALID_PARAMETER, e.to_string())
            }
            AccountError::Store(_) if status == StatusCode::SERVICE_UNAVAILABLE => {
                tracing::error!(error = %e, "Provisioning store unavailable");
                Self::service_unavailable(e.to_string())
            }
            AccountError::Store(_) => {
                tracing::error!(error = %e, "Provisioning failed");
                Self::internal()
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<crate::account::ValidationError> for ApiError {
    fn from(e: crate::account::ValidationError) -> Self {
        Self::bad_request(e.to_string())
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(value_type = String, format = Uuid)]
    pub wallet_id: Uuid,
    /// Minor units
    #[schema(example = 70)]
    pub balance: i64,
}

/// Result of a balance-moving operation
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferResponse {
    /// `applied` or `already_applied`
    #[schema(example = "applied")]
    pub status: String,
    #[schema(value_type = String, format = Uuid)]
    pub transaction_id: Uuid,
    #[schema(example = "s1")]
    pub reference_id: String,
    #[serde(rename = "type")]
    #[schema(example = "spend")]
    pub tx_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<TransferOutcome> for TransferResponse {
    fn from(outcome: TransferOutcome) -> Self {
        let status = outcome.status_str().to_string();
        let tx = outcome.transaction();
        Self {
            status,
            transaction_id: tx.id,
            reference_id: tx.reference_id.to_string(),
            tx_type: tx.tx_type.to_string(),
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "GOLD")]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub label: String,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub user_id: Option<Uuid>,
    pub asset_id: i32,
    #[schema(example = "GOLD")]
    pub asset: String,
    pub balance: i64,
}

impl From<Wallet> for WalletResponse {
    fn from(w: Wallet) -> Self {
        Self {
            id: w.id.inner(),
            label: w.label,
            user_id: w.user_id,
            asset_id: w.asset_id,
            asset: w.asset_code.to_string(),
            balance: w.balance,
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const UNSUPPORTED_ASSET: i32 = 1003;
    pub const ASSET_MISMATCH: i32 = 1004;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4001;
    pub const ALREADY_EXISTS: i32 = 4009;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const CONFLICT_EXCEEDED: i32 = 5002;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AssetCode;

    #[test]
    fn test_ledger_error_mapping() {
        let e = ApiError::from(LedgerError::InsufficientBalance {
            available: 10,
            requested: 30,
        });
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.code, error_codes::INSUFFICIENT_BALANCE);

        let e = ApiError::from(LedgerError::InvalidAmount);
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.code, error_codes::INVALID_PARAMETER);

        let e = ApiError::from(LedgerError::UnsupportedAsset(
            AssetCode::new("RUBY").unwrap(),
        ));
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.code, error_codes::UNSUPPORTED_ASSET);

        let e = ApiError::from(LedgerError::ConflictExceeded { attempts: 3 });
        assert_eq!(e.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(e.code, error_codes::CONFLICT_EXCEEDED);
    }

    #[test]
    fn test_integrity_error_hides_details() {
        let e = ApiError::from(LedgerError::Integrity("row vanished".to_string()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.msg, "internal error");
    }

    #[test]
    fn test_account_error_mapping() {
        let e = ApiError::from(AccountError::AlreadyExists("users_pkey".to_string()));
        assert_eq!(e.status, StatusCode::CONFLICT);
        assert_eq!(e.code, error_codes::ALREADY_EXISTS);

        let e = ApiError::from(AccountError::NotFound("wallet".to_string()));
        assert_eq!(e.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::<()>::error(1001, "bad")).unwrap();
        assert_eq!(json["code"], 1001);
        assert_eq!(json["msg"], "bad");
        assert!(json.get("data").is_none());
    }
}
