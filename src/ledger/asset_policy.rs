//! Asset Policy
//!
//! Immutable mapping from asset code to the two system-owned counterparty
//! wallets. Built once from configuration at start-up and shared read-only.

use std::collections::HashMap;

use serde::Deserialize;

use super::error::{LedgerError, StoreError};
use super::store::LedgerStore;
use crate::account::validation::AssetCode;
use crate::core_types::WalletId;

/// Role of a system wallet relative to user wallets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterpartyRole {
    /// Source of funds for top-ups and bonuses
    Treasury,
    /// Sink for funds spent by users
    Revenue,
}

/// System wallets configured for one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AssetWallets {
    pub treasury: WalletId,
    pub revenue: WalletId,
}

impl AssetWallets {
    fn get(&self, role: CounterpartyRole) -> WalletId {
        match role {
            CounterpartyRole::Treasury => self.treasury,
            CounterpartyRole::Revenue => self.revenue,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetPolicy {
    wallets: HashMap<AssetCode, AssetWallets>,
}

impl AssetPolicy {
    pub fn new(wallets: HashMap<AssetCode, AssetWallets>) -> Self {
        Self { wallets }
    }

    /// System wallet for `asset` in the given role
    pub fn resolve_counterparty(
        &self,
        asset: &AssetCode,
        role: CounterpartyRole,
    ) -> Result<WalletId, LedgerError> {
        self.wallets
            .get(asset)
            .map(|w| w.get(role))
            .ok_or_else(|| LedgerError::UnsupportedAsset(asset.clone()))
    }

    /// Fail with `AssetMismatch` unless the wallet is configured for `asset`
    pub async fn validate_wallet_asset(
        &self,
        store: &dyn LedgerStore,
        wallet_id: WalletId,
        asset: &AssetCode,
    ) -> Result<(), LedgerError> {
        let wallet_asset = match store.wallet_asset_code(wallet_id).await {
            Ok(code) => code,
            Err(StoreError::NotFound(_)) => return Err(LedgerError::WalletNotFound(wallet_id)),
            Err(e) => return Err(e.into()),
        };

        if &wallet_asset != asset {
            return Err(LedgerError::AssetMismatch {
                wallet: wallet_asset,
                requested: asset.clone(),
            });
        }
        Ok(())
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetCode> {
        self.wallets.keys()
    }
}
