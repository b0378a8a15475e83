//! Wallet Ledger server
//!
//! ```text
//! config → logging → PostgreSQL (retry + migrations) → WalletService → HTTP gateway
//! ```

use std::sync::Arc;

use anyhow::Context;

use wallet_ledger::config::AppConfig;
use wallet_ledger::db::Database;
use wallet_ledger::gateway::{self, state::AppState};
use wallet_ledger::ledger::{PgLedgerStore, WalletService};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env).context("loading config")?;
    let _log_guard = wallet_ledger::logging::init_logging(&app_config);

    tracing::info!(
        env = %env,
        version = env!("GIT_HASH"),
        "Starting Wallet Ledger"
    );

    let database_url = app_config.database_url()?;
    let db = Database::connect_with_retry(database_url, &app_config.database)
        .await
        .context("connecting to PostgreSQL")?;
    db.run_migrations().await.context("running migrations")?;
    let db = Arc::new(db);

    let policy = app_config.asset_policy();
    for asset in policy.assets() {
        tracing::info!(asset = %asset, "Asset policy loaded");
    }

    let store = Arc::new(PgLedgerStore::new(
        db.pool().clone(),
        app_config.store.lock_timeout(),
    ));
    let service = Arc::new(WalletService::new(
        store,
        Arc::new(policy),
        app_config.retry,
    ));
    let state = Arc::new(AppState::new(service, Some(db)));

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(&app_config.gateway.host, port, state)
        .await
        .context("gateway server")?;

    Ok(())
}
