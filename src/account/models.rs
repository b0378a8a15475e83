//! Data models for account provisioning

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::validation::AssetCode;
use crate::core_types::{AssetId, UserId, WalletId};

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Asset type, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub id: AssetId,
    pub code: AssetCode,
}

/// Wallet with its asset code resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wallet {
    pub id: WalletId,
    pub label: String,
    /// None for system wallets (treasury, revenue)
    pub user_id: Option<UserId>,
    pub asset_id: AssetId,
    pub asset_code: AssetCode,
    /// Minor units of the asset. Materialized projection of the ledger.
    pub balance: i64,
}

impl Wallet {
    #[inline]
    pub fn is_system(&self) -> bool {
        self.user_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_wallet() {
        let mut wallet = Wallet {
            id: WalletId::new(),
            label: "treasury-gold".to_string(),
            user_id: None,
            asset_id: 1,
            asset_code: AssetCode::new("GOLD").unwrap(),
            balance: 0,
        };
        assert!(wallet.is_system());

        wallet.user_id = Some(UserId::new_v4());
        assert!(!wallet.is_system());
    }
}
