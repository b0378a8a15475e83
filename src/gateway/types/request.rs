//! Request DTOs
//!
//! Shape checks run through `validator`; domain checks (asset code format,
//! reference id characters, amount sign) happen when the fields are converted
//! into ledger types.

use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::account::{AssetCode, ReferenceId, ValidationError};

/// Body of top-up, bonus and spend requests
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssetAmountRequest {
    /// Caller-chosen idempotency key
    #[validate(length(min = 1, max = 128))]
    #[schema(example = "s1")]
    pub reference_id: String,
    #[validate(length(min = 1, max = 16))]
    #[schema(example = "GOLD")]
    pub asset: String,
    /// Minor units, must be positive
    #[schema(example = 30)]
    pub amount: i64,
}

impl AssetAmountRequest {
    pub fn parse(&self) -> Result<(ReferenceId, AssetCode), ValidationError> {
        Ok((
            ReferenceId::new(&self.reference_id)?,
            AssetCode::new(&self.asset)?,
        ))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferRequest {
    #[validate(length(min = 1, max = 128))]
    #[schema(example = "t-42")]
    pub reference_id: String,
    #[schema(value_type = String, format = Uuid)]
    pub from_wallet_id: Uuid,
    #[schema(value_type = String, format = Uuid)]
    pub to_wallet_id: Uuid,
    #[schema(example = 30)]
    pub amount: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Generated when absent
    #[schema(value_type = Option<String>, format = Uuid)]
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 64))]
    #[schema(example = "alice")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, max = 16))]
    #[schema(example = "GOLD")]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWalletRequest {
    /// Generated when absent
    #[schema(value_type = Option<String>, format = Uuid)]
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 64))]
    #[schema(example = "main")]
    pub label: String,
    /// Absent for system wallets
    #[schema(value_type = Option<String>, format = Uuid)]
    pub user_id: Option<Uuid>,
    #[schema(example = 1)]
    pub asset_id: i32,
}
