//! Wallet handlers: balance, top-up, bonus, spend

use std::sync::Arc;

use axum::extract::State;
use uuid::Uuid;
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{
    ApiJson, ApiPath, ApiResult, AssetAmountRequest, BalanceResponse, TransferResponse, ok,
};
use crate::core_types::WalletId;

/// Get wallet balance
///
/// GET /api/v1/wallets/{wallet_id}/balance
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{wallet_id}/balance",
    params(
        ("wallet_id" = String, Path, description = "Wallet ID (UUID)")
    ),
    responses(
        (status = 200, description = "Committed balance", body = BalanceResponse, content_type = "application/json"),
        (status = 404, description = "Wallet not found"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "Wallet"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    ApiPath(wallet_id): ApiPath<Uuid>,
) -> ApiResult<BalanceResponse> {
    let balance = state.service.get_balance(WalletId::from(wallet_id)).await?;
    ok(BalanceResponse { wallet_id, balance })
}

/// Top up a wallet from the asset treasury
///
/// POST /api/v1/wallets/{wallet_id}/topup
#[utoipa::path(
    post,
    path = "/api/v1/wallets/{wallet_id}/topup",
    params(
        ("wallet_id" = String, Path, description = "Wallet ID (UUID)")
    ),
    request_body = AssetAmountRequest,
    responses(
        (status = 200, description = "Applied or already applied", body = TransferResponse, content_type = "application/json"),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Wallet not found"),
        (status = 422, description = "Unsupported asset, asset mismatch or insufficient treasury balance"),
        (status = 503, description = "Conflict retries exhausted or store unavailable")
    ),
    tag = "Wallet"
)]
pub async fn top_up(
    State(state): State<Arc<AppState>>,
    ApiPath(wallet_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AssetAmountRequest>,
) -> ApiResult<TransferResponse> {
    req.validate()?;
    let (reference_id, asset) = req.parse()?;
    let outcome = state
        .service
        .top_up(reference_id, WalletId::from(wallet_id), &asset, req.amount)
        .await?;
    ok(outcome.into())
}

/// Grant a bonus from the asset treasury
///
/// POST /api/v1/wallets/{wallet_id}/bonus
#[utoipa::path(
    post,
    path = "/api/v1/wallets/{wallet_id}/bonus",
    params(
        ("wallet_id" = String, Path, description = "Wallet ID (UUID)")
    ),
    request_body = AssetAmountRequest,
    responses(
        (status = 200, description = "Applied or already applied", body = TransferResponse, content_type = "application/json"),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Wallet not found"),
        (status = 422, description = "Unsupported asset, asset mismatch or insufficient treasury balance"),
        (status = 503, description = "Conflict retries exhausted or store unavailable")
    ),
    tag = "Wallet"
)]
pub async fn grant_bonus(
    State(state): State<Arc<AppState>>,
    ApiPath(wallet_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AssetAmountRequest>,
) -> ApiResult<TransferResponse> {
    req.validate()?;
    let (reference_id, asset) = req.parse()?;
    let outcome = state
        .service
        .grant_bonus(reference_id, WalletId::from(wallet_id), &asset, req.amount)
        .await?;
    ok(outcome.into())
}

/// Spend from a wallet into the asset revenue wallet
///
/// POST /api/v1/wallets/{wallet_id}/spend
#[utoipa::path(
    post,
    path = "/api/v1/wallets/{wallet_id}/spend",
    params(
        ("wallet_id" = String, Path, description = "Wallet ID (UUID)")
    ),
    request_body = AssetAmountRequest,
    responses(
        (status = 200, description = "Applied or already applied", body = TransferResponse, content_type = "application/json"),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Wallet not found"),
        (status = 422, description = "Unsupported asset, asset mismatch or insufficient balance"),
        (status = 503, description = "Conflict retries exhausted or store unavailable")
    ),
    tag = "Wallet"
)]
pub async fn spend(
    State(state): State<Arc<AppState>>,
    ApiPath(wallet_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AssetAmountRequest>,
) -> ApiResult<TransferResponse> {
    req.validate()?;
    let (reference_id, asset) = req.parse()?;
    let outcome = state
        .service
        .spend(reference_id, WalletId::from(wallet_id), &asset, req.amount)
        .await?;
    ok(outcome.into())
}
