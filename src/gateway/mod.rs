pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

/// Build the HTTP router
pub fn router(state: Arc<AppState>) -> Router {
    let wallet_routes = Router::new()
        .route("/{wallet_id}/balance", get(handlers::get_balance))
        .route("/{wallet_id}/topup", post(handlers::top_up))
        .route("/{wallet_id}/bonus", post(handlers::grant_bonus))
        .route("/{wallet_id}/spend", post(handlers::spend));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/v1/transfers", post(handlers::create_transfer))
        .route("/api/v1/users", post(handlers::create_user))
        .route("/api/v1/assets", post(handlers::create_asset))
        .route("/api/v1/wallets", post(handlers::create_wallet))
        .nest("/api/v1/wallets", wallet_routes)
        .with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until the process is stopped
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> std::io::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.inspect_err(|e| {
        tracing::error!(
            "Failed to bind to {}: {}. Port {} may already be in use",
            addr,
            e,
            port
        );
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await
}
