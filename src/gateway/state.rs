use std::sync::Arc;

use crate::db::Database;
use crate::ledger::WalletService;

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// Balance-moving operations
    pub service: Arc<WalletService>,
    /// Provisioning and health checks; `None` disables both
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(service: Arc<WalletService>, pg_db: Option<Arc<Database>>) -> Self {
        Self { service, pg_db }
    }
}
