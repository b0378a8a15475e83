//! Wallet-to-wallet transfer handler

use std::sync::Arc;

use axum::extract::State;
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{ApiJson, ApiResult, TransferRequest, TransferResponse, ok};
use crate::account::ReferenceId;
use crate::core_types::WalletId;

/// Transfer between two wallets of the same asset
///
/// POST /api/v1/transfers
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Applied or already applied", body = TransferResponse, content_type = "application/json"),
        (status = 400, description = "Invalid parameters or same wallet"),
        (status = 404, description = "Wallet not found"),
        (status = 422, description = "Asset mismatch or insufficient balance"),
        (status = 503, description = "Conflict retries exhausted or store unavailable")
    ),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TransferRequest>,
) -> ApiResult<TransferResponse> {
    req.validate()?;
    let reference_id = ReferenceId::new(&req.reference_id)?;

    let outcome = state
        .service
        .transfer(
            reference_id,
            WalletId::from(req.from_wallet_id),
            WalletId::from(req.to_wallet_id),
            req.amount,
        )
        .await?;
    ok(outcome.into())
}
