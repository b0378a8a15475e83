//! PostgreSQL ledger store
//!
//! Every unit of work is one PostgreSQL transaction. Wallet rows are locked
//! with `SELECT ... FOR UPDATE`; the lock wait is bounded by a transaction-local
//! `lock_timeout`, so contention surfaces as SQLSTATE `55P03` and is
//! classified as a write conflict. Dropping an uncommitted [`PgUnit`] rolls the
//! transaction back.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row};
use tracing::debug;

use super::error::StoreError;
use super::models::{LedgerEntry, Transaction};
use super::store::{LedgerStore, LockedWallet, UnitOfWork};
use crate::account::validation::{AssetCode, ReferenceId};
use crate::core_types::{TransactionId, WalletId};

/// PostgreSQL-backed [`LedgerStore`]
pub struct PgLedgerStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis()))
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PgUnit { tx }))
    }

    async fn wallet_balance(&self, wallet_id: WalletId) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT balance FROM wallets WHERE id = $1")
            .bind(wallet_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("wallet {}", wallet_id)))
    }

    async fn wallet_asset_code(&self, wallet_id: WalletId) -> Result<AssetCode, StoreError> {
        let code = sqlx::query_scalar::<_, String>(
            r#"
            SELECT a.code
            FROM wallets w
            JOIN assets a ON a.id = w.asset_type_id
            WHERE w.id = $1
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("wallet {}", wallet_id)))?;

        parse_asset_code(&code)
    }

    async fn find_transaction(
        &self,
        reference_id: &ReferenceId,
    ) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query(SELECT_TRANSACTION_BY_REFERENCE)
            .bind(reference_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_transaction).transpose()
    }
}

/// One PostgreSQL transaction
pub struct PgUnit {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnit {
    async fn lock_wallet_for_update(
        &mut self,
        wallet_id: WalletId,
    ) -> Result<LockedWallet, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT w.id, w.balance, a.code
            FROM wallets w
            JOIN assets a ON a.id = w.asset_type_id
            WHERE w.id = $1
            FOR UPDATE OF w
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("wallet {}", wallet_id)))?;

        debug!(wallet_id = %wallet_id, "Wallet row locked");

        Ok(LockedWallet {
            id: row.try_get("id")?,
            balance: row.try_get("balance")?,
            asset_code: parse_asset_code(row.try_get("code")?)?,
        })
    }

    async fn find_transaction_by_reference(
        &mut self,
        reference_id: &ReferenceId,
    ) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query(SELECT_TRANSACTION_BY_REFERENCE)
            .bind(reference_id.as_str())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(row_to_transaction).transpose()
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, reference_id, type, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.reference_id.as_str())
        .bind(transaction.tx_type.as_str())
        .bind(transaction.status.as_str())
        .bind(transaction.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn insert_ledger_entries(
        &mut self,
        transaction_id: TransactionId,
        debit_wallet: WalletId,
        credit_wallet: WalletId,
        amount: i64,
    ) -> Result<(), StoreError> {
        let [debit, credit] = LedgerEntry::pair(transaction_id, debit_wallet, credit_wallet, amount);

        sqlx::query(
            r#"
            INSERT INTO ledger_entries
                (id, transaction_id, wallet_id, direction, amount, created_at)
            VALUES
                ($1, $2, $3, $4, $5, $6),
                ($7, $2, $8, $9, $5, $6)
            "#,
        )
        .bind(debit.id)
        .bind(transaction_id)
        .bind(debit.wallet_id)
        .bind(debit.direction.as_str())
        .bind(amount)
        .bind(debit.created_at)
        .bind(credit.id)
        .bind(credit.wallet_id)
        .bind(credit.direction.as_str())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn adjust_wallet_balance(
        &mut self,
        wallet_id: WalletId,
        delta: i64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE wallets SET balance = balance + $1 WHERE id = $2")
            .bind(delta)
            .bind(wallet_id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("wallet {}", wallet_id)));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

const SELECT_TRANSACTION_BY_REFERENCE: &str = r#"
    SELECT id, reference_id, type, status, created_at
    FROM transactions
    WHERE reference_id = $1
"#;

fn parse_asset_code(code: &str) -> Result<AssetCode, StoreError> {
    AssetCode::new(code)
        .map_err(|e| StoreError::ConstraintViolation(format!("stored asset code: {}", e)))
}

fn row_to_transaction(row: &PgRow) -> Result<Transaction, StoreError> {
    let reference: String = row.try_get("reference_id")?;
    let tx_type: String = row.try_get("type")?;
    let status: String = row.try_get("status")?;

    Ok(Transaction {
        id: row.try_get("id")?,
        reference_id: ReferenceId::new(&reference)
            .map_err(|e| StoreError::ConstraintViolation(format!("stored reference_id: {}", e)))?,
        tx_type: tx_type.parse().map_err(StoreError::ConstraintViolation)?,
        status: status.parse().map_err(StoreError::ConstraintViolation)?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    //! These tests require a running PostgreSQL instance with `DATABASE_URL`
    //! pointing at a scratch database.

    use super::*;
    use crate::account::AccountRepository;
    use crate::db::Database;
    use crate::ledger::engine::{TransferCommand, TransferEngine, TransferOutcome};
    use crate::ledger::error::LedgerError;
    use crate::ledger::models::TransactionType;
    use std::sync::Arc;

    async fn create_test_store() -> (Arc<PgLedgerStore>, PgPool) {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = Database::connect(&url).await.expect("Failed to connect");
        db.run_migrations().await.expect("Failed to migrate");
        let pool = db.pool().clone();
        (
            Arc::new(PgLedgerStore::new(pool.clone(), Duration::from_secs(2))),
            pool,
        )
    }

    /// Fresh asset with two funded wallets; returns (a, b)
    async fn seed_pair(pool: &PgPool, balance: i64) -> (WalletId, WalletId) {
        let code = format!("T{}", &uuid::Uuid::new_v4().simple().to_string()[..10]).to_uppercase();
        let asset = AccountRepository::create_asset(pool, &AssetCode::new(&code).unwrap())
            .await
            .unwrap();
        let a = WalletId::new();
        let b = WalletId::new();
        for id in [a, b] {
            AccountRepository::create_wallet(pool, id, "test", None, asset)
                .await
                .unwrap();
            sqlx::query("UPDATE wallets SET balance = $1 WHERE id = $2")
                .bind(balance)
                .bind(id)
                .execute(pool)
                .await
                .unwrap();
        }
        (a, b)
    }

    fn cmd(reference: &str, from: WalletId, to: WalletId, amount: i64) -> TransferCommand {
        TransferCommand::new(
            ReferenceId::new(reference).unwrap(),
            TransactionType::Transfer,
            from,
            to,
            amount,
        )
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_pg_transfer_and_replay() {
        let (store, pool) = create_test_store().await;
        let engine = TransferEngine::new(store.clone());
        let (a, b) = seed_pair(&pool, 100).await;
        let reference = format!("pg-{}", uuid::Uuid::new_v4());

        let first = engine.execute(&cmd(&reference, a, b, 30)).await.unwrap();
        assert!(first.is_applied());
        let second = engine.execute(&cmd(&reference, a, b, 30)).await.unwrap();
        assert!(matches!(second, TransferOutcome::AlreadyApplied(_)));

        assert_eq!(store.wallet_balance(a).await.unwrap(), 70);
        assert_eq!(store.wallet_balance(b).await.unwrap(), 130);

        let entries: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ledger_entries WHERE transaction_id = $1",
        )
        .bind(first.transaction().id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(entries, 2);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_pg_insufficient_balance_rolls_back() {
        let (store, pool) = create_test_store().await;
        let engine = TransferEngine::new(store.clone());
        let (a, b) = seed_pair(&pool, 10).await;
        let reference = ReferenceId::new(&format!("pg-{}", uuid::Uuid::new_v4())).unwrap();

        let err = engine
            .execute(&cmd(reference.as_str(), a, b, 1000))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert!(store.find_transaction(&reference).await.unwrap().is_none());
        assert_eq!(store.wallet_balance(a).await.unwrap(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires PostgreSQL database"]
    async fn test_pg_opposite_directions_complete() {
        let (store, pool) = create_test_store().await;
        let engine = Arc::new(TransferEngine::new(store.clone()));
        let (a, b) = seed_pair(&pool, 1_000).await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let engine = engine.clone();
            let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
            let reference = format!("pg-{}", uuid::Uuid::new_v4());
            handles.push(tokio::spawn(async move {
                engine.execute(&cmd(&reference, from, to, 3)).await
            }));
        }
        for h in handles {
            assert!(h.await.unwrap().unwrap().is_applied());
        }

        let a_balance = store.wallet_balance(a).await.unwrap();
        let b_balance = store.wallet_balance(b).await.unwrap();
        assert_eq!(a_balance, 1_000);
        assert_eq!(b_balance, 1_000);
    }
}
