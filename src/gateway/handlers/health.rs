//! Health check handler

use std::sync::Arc;

use axum::extract::State;
use chrono::Utc;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
    /// Build revision
    #[schema(example = "a1b2c3d")]
    pub version: &'static str,
}

/// Health check endpoint
///
/// Pings PostgreSQL when configured. Connection details never leave the server.
///
/// - Healthy: 200 OK + {code: 0, data: {timestamp_ms, version}}
/// - Unhealthy: 503 Service Unavailable
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    if let Some(ref db) = state.pg_db
        && let Err(e) = db.health_check().await
    {
        tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
        return ApiError::service_unavailable("unavailable").into_err();
    }

    ok(HealthResponse {
        timestamp_ms: Utc::now().timestamp_millis(),
        version: env!("GIT_HASH"),
    })
}
