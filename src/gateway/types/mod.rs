//! Gateway types module
//!
//! ## Input Types
//! - [`AssetAmountRequest`], [`TransferRequest`]: balance-moving requests
//! - [`CreateUserRequest`], [`CreateAssetRequest`], [`CreateWalletRequest`]: provisioning
//!
//! ## Extractors
//! - [`ApiJson<T>`], [`ApiPath<T>`]: body and path extractors with enveloped rejections
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`ApiError`]: error envelope with HTTP status

pub mod extract;
pub mod request;
pub mod response;

pub use extract::{ApiJson, ApiPath};
pub use request::{
    AssetAmountRequest, CreateAssetRequest, CreateUserRequest, CreateWalletRequest,
    TransferRequest,
};
pub use response::{
    ApiError, ApiResponse, ApiResult, AssetResponse, BalanceResponse, TransferResponse,
    UserResponse, WalletResponse, error_codes, ok,
};
