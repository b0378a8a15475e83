//! Repository layer for provisioning
//!
//! Plain inserts guarded only by uniqueness; balances never change here.
//! Every new wallet starts at zero and is funded through the ledger.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::error::AccountError;
use super::models::{Asset, User, Wallet};
use super::validation::AssetCode;
use crate::core_types::{AssetId, UserId, WalletId};

pub struct AccountRepository;

impl AccountRepository {
    /// Create a user; a duplicate id is `AlreadyExists`
    pub async fn create_user(
        pool: &PgPool,
        user_id: UserId,
        name: &str,
    ) -> Result<User, AccountError> {
        let row = sqlx::query(
            r#"INSERT INTO users (id, name) VALUES ($1, $2)
               RETURNING id, name, created_at"#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
        })
    }

    /// Create an asset type and return its id
    pub async fn create_asset(pool: &PgPool, code: &AssetCode) -> Result<AssetId, AccountError> {
        let id: AssetId =
            sqlx::query_scalar(r#"INSERT INTO assets (code) VALUES ($1) RETURNING id"#)
                .bind(code.as_str())
                .fetch_one(pool)
                .await?;

        tracing::info!(asset = %code, asset_id = id, "Asset created");
        Ok(id)
    }

    pub async fn get_asset_by_code(
        pool: &PgPool,
        code: &AssetCode,
    ) -> Result<Option<Asset>, AccountError> {
        let id: Option<AssetId> = sqlx::query_scalar(r#"SELECT id FROM assets WHERE code = $1"#)
            .bind(code.as_str())
            .fetch_optional(pool)
            .await?;

        Ok(id.map(|id| Asset {
            id,
            code: code.clone(),
        }))
    }

    /// Create a zero-balance wallet
    ///
    /// `user_id = None` creates a system wallet. Unknown user or asset ids are
    /// reported as `NotFound`.
    pub async fn create_wallet(
        pool: &PgPool,
        wallet_id: WalletId,
        label: &str,
        user_id: Option<UserId>,
        asset_id: AssetId,
    ) -> Result<Wallet, AccountError> {
        let row = sqlx::query(
            r#"
            WITH w AS (
                INSERT INTO wallets (id, label, user_id, asset_type_id, balance)
                VALUES ($1, $2, $3, $4, 0)
                RETURNING id, label, user_id, asset_type_id, balance
            )
            SELECT w.id, w.label, w.user_id, w.asset_type_id, w.balance, a.code
            FROM w
            JOIN assets a ON a.id = w.asset_type_id
            "#,
        )
        .bind(wallet_id)
        .bind(label)
        .bind(user_id)
        .bind(asset_id)
        .fetch_one(pool)
        .await?;

        let wallet = row_to_wallet(&row)?;
        tracing::info!(
            wallet_id = %wallet.id,
            asset = %wallet.asset_code,
            system = wallet.is_system(),
            "Wallet created"
        );
        Ok(wallet)
    }

    pub async fn get_wallet(pool: &PgPool, wallet_id: WalletId) -> Result<Wallet, AccountError> {
        let row = sqlx::query(
            r#"
            SELECT w.id, w.label, w.user_id, w.asset_type_id, w.balance, a.code
            FROM wallets w
            JOIN assets a ON a.id = w.asset_type_id
            WHERE w.id = $1
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AccountError::NotFound(format!("wallet {}", wallet_id)))?;

        row_to_wallet(&row)
    }
}

fn row_to_wallet(row: &PgRow) -> Result<Wallet, AccountError> {
    let code: String = row.try_get("code")?;
    Ok(Wallet {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
        user_id: row.try_get("user_id")?,
        asset_id: row.try_get("asset_type_id")?,
        asset_code: AssetCode::new(&code)?,
        balance: row.try_get("balance")?,
    })
}
