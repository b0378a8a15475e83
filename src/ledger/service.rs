//! Wallet Service
//!
//! Caller-facing operations. Each one resolves counterparties through the
//! [`AssetPolicy`], then runs a single [`TransferEngine`] primitive under the
//! [`RetryPolicy`].
//!
//! | Operation     | From              | To                | Type       |
//! |---------------|-------------------|-------------------|------------|
//! | `top_up`      | treasury(asset)   | user wallet       | `topup`    |
//! | `grant_bonus` | treasury(asset)   | user wallet       | `bonus`    |
//! | `spend`       | user wallet       | revenue(asset)    | `spend`    |
//! | `transfer`    | from wallet       | to wallet         | `transfer` |

use std::sync::Arc;

use tracing::debug;

use super::asset_policy::{AssetPolicy, CounterpartyRole};
use super::engine::{TransferCommand, TransferEngine, TransferOutcome};
use super::error::{LedgerError, StoreError};
use super::models::TransactionType;
use super::retry::RetryPolicy;
use super::store::LedgerStore;
use crate::account::validation::{AssetCode, ReferenceId};
use crate::core_types::WalletId;

pub struct WalletService {
    store: Arc<dyn LedgerStore>,
    engine: TransferEngine,
    policy: Arc<AssetPolicy>,
    retry: RetryPolicy,
}

impl WalletService {
    pub fn new(store: Arc<dyn LedgerStore>, policy: Arc<AssetPolicy>, retry: RetryPolicy) -> Self {
        Self {
            engine: TransferEngine::new(store.clone()),
            store,
            policy,
            retry,
        }
    }

    /// Committed balance of a wallet
    pub async fn get_balance(&self, wallet_id: WalletId) -> Result<i64, LedgerError> {
        match self.store.wallet_balance(wallet_id).await {
            Ok(balance) => Ok(balance),
            Err(StoreError::NotFound(_)) => Err(LedgerError::WalletNotFound(wallet_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Credit a user wallet from the asset's treasury
    pub async fn top_up(
        &self,
        reference_id: ReferenceId,
        wallet_id: WalletId,
        asset: &AssetCode,
        amount: i64,
    ) -> Result<TransferOutcome, LedgerError> {
        self.credit_from_treasury(reference_id, TransactionType::TopUp, wallet_id, asset, amount)
            .await
    }

    /// Credit a user wallet from the asset's treasury, recorded as a bonus
    pub async fn grant_bonus(
        &self,
        reference_id: ReferenceId,
        wallet_id: WalletId,
        asset: &AssetCode,
        amount: i64,
    ) -> Result<TransferOutcome, LedgerError> {
        self.credit_from_treasury(reference_id, TransactionType::Bonus, wallet_id, asset, amount)
            .await
    }

    /// Debit a user wallet into the asset's revenue wallet
    pub async fn spend(
        &self,
        reference_id: ReferenceId,
        wallet_id: WalletId,
        asset: &AssetCode,
        amount: i64,
    ) -> Result<TransferOutcome, LedgerError> {
        let revenue = self
            .policy
            .resolve_counterparty(asset, CounterpartyRole::Revenue)?;
        let cmd = TransferCommand::new(
            reference_id,
            TransactionType::Spend,
            wallet_id,
            revenue,
            amount,
        );
        cmd.validate()?;
        self.policy
            .validate_wallet_asset(self.store.as_ref(), wallet_id, asset)
            .await?;

        self.execute(cmd).await
    }

    /// Move funds between two wallets of the same asset
    pub async fn transfer(
        &self,
        reference_id: ReferenceId,
        from: WalletId,
        to: WalletId,
        amount: i64,
    ) -> Result<TransferOutcome, LedgerError> {
        let cmd = TransferCommand::new(reference_id, TransactionType::Transfer, from, to, amount);
        self.execute(cmd).await
    }

    async fn credit_from_treasury(
        &self,
        reference_id: ReferenceId,
        tx_type: TransactionType,
        wallet_id: WalletId,
        asset: &AssetCode,
        amount: i64,
    ) -> Result<TransferOutcome, LedgerError> {
        let treasury = self
            .policy
            .resolve_counterparty(asset, CounterpartyRole::Treasury)?;
        let cmd = TransferCommand::new(reference_id, tx_type, treasury, wallet_id, amount);
        cmd.validate()?;
        self.policy
            .validate_wallet_asset(self.store.as_ref(), wallet_id, asset)
            .await?;

        self.execute(cmd).await
    }

    async fn execute(&self, cmd: TransferCommand) -> Result<TransferOutcome, LedgerError> {
        debug!(
            reference_id = %cmd.reference_id,
            tx_type = %cmd.tx_type,
            "Executing transfer"
        );
        self.retry.run(|| self.engine.execute(&cmd)).await
    }
}
