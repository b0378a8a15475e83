//! Provisioning handlers: users, assets, wallets

use std::sync::Arc;

use axum::extract::State;
use uuid::Uuid;
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiJson, ApiResult, AssetResponse, CreateAssetRequest, CreateUserRequest,
    CreateWalletRequest, UserResponse, WalletResponse, ok,
};
use crate::account::{AccountRepository, AssetCode};
use crate::core_types::WalletId;
use crate::db::Database;

fn require_db(state: &AppState) -> Result<&Arc<Database>, ApiError> {
    state
        .pg_db
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Database not available"))
}

/// Create a user
///
/// POST /api/v1/users
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = UserResponse, content_type = "application/json"),
        (status = 400, description = "Invalid parameters"),
        (status = 409, description = "User already exists"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "Provisioning"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<UserResponse> {
    req.validate()?;
    let db = require_db(&state)?;

    let id = req.id.unwrap_or_else(Uuid::new_v4);
    let user = AccountRepository::create_user(db.pool(), id, &req.name).await?;
    ok(UserResponse {
        id: user.id,
        name: user.name,
        created_at: user.created_at,
    })
}

/// Create an asset type
///
/// POST /api/v1/assets
#[utoipa::path(
    post,
    path = "/api/v1/assets",
    request_body = CreateAssetRequest,
    responses(
        (status = 200, description = "Asset created", body = AssetResponse, content_type = "application/json"),
        (status = 400, description = "Invalid asset code"),
        (status = 409, description = "Asset already exists"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "Provisioning"
)]
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateAssetRequest>,
) -> ApiResult<AssetResponse> {
    req.validate()?;
    let code = AssetCode::new(&req.code)?;
    let db = require_db(&state)?;

    let id = AccountRepository::create_asset(db.pool(), &code).await?;
    ok(AssetResponse {
        id,
        code: code.to_string(),
    })
}

/// Create a zero-balance wallet
///
/// POST /api/v1/wallets
#[utoipa::path(
    post,
    path = "/api/v1/wallets",
    request_body = CreateWalletRequest,
    responses(
        (status = 200, description = "Wallet created", body = WalletResponse, content_type = "application/json"),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Unknown user or asset"),
        (status = 409, description = "Wallet already exists"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "Provisioning"
)]
pub async fn create_wallet(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateWalletRequest>,
) -> ApiResult<WalletResponse> {
    req.validate()?;
    let db = require_db(&state)?;

    let id = req.id.map(WalletId::from).unwrap_or_default();
    let wallet =
        AccountRepository::create_wallet(db.pool(), id, &req.label, req.user_id, req.asset_id)
            .await?;
    ok(wallet.into())
}
