//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{
    AssetAmountRequest, AssetResponse, BalanceResponse, CreateAssetRequest, CreateUserRequest,
    CreateWalletRequest, TransferRequest, TransferResponse, UserResponse, WalletResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wallet Ledger API",
        version = "1.0.0",
        description = "Double-entry wallet ledger: idempotent top-ups, bonuses, spends and transfers.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::get_balance,
        crate::gateway::handlers::top_up,
        crate::gateway::handlers::grant_bonus,
        crate::gateway::handlers::spend,
        crate::gateway::handlers::create_transfer,
        crate::gateway::handlers::create_user,
        crate::gateway::handlers::create_asset,
        crate::gateway::handlers::create_wallet,
    ),
    components(
        schemas(
            HealthResponse,
            BalanceResponse,
            TransferResponse,
            AssetAmountRequest,
            TransferRequest,
            CreateUserRequest,
            CreateAssetRequest,
            CreateWalletRequest,
            UserResponse,
            AssetResponse,
            WalletResponse,
        )
    ),
    tags(
        (name = "Wallet", description = "Balances, top-ups, bonuses and spends"),
        (name = "Transfer", description = "Wallet-to-wallet transfers"),
        (name = "Provisioning", description = "Users, assets and wallets"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Wallet Ledger API");
        assert!(spec.to_json().is_ok());
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths;
        for path in [
            "/api/v1/health",
            "/api/v1/wallets/{wallet_id}/balance",
            "/api/v1/wallets/{wallet_id}/topup",
            "/api/v1/wallets/{wallet_id}/bonus",
            "/api/v1/wallets/{wallet_id}/spend",
            "/api/v1/transfers",
            "/api/v1/users",
            "/api/v1/assets",
            "/api/v1/wallets",
        ] {
            assert!(paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
