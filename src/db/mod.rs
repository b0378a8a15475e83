//! Database connection management

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect with default pool settings
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        Self::connect_with(database_url, &DatabaseConfig::default()).await
    }

    pub async fn connect_with(
        database_url: &str,
        config: &DatabaseConfig,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(database_url)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            "PostgreSQL connection pool established"
        );
        Ok(Self { pool })
    }

    /// Connect, retrying a bounded number of times while the server comes up
    pub async fn connect_with_retry(
        database_url: &str,
        config: &DatabaseConfig,
    ) -> Result<Self, sqlx::Error> {
        let attempts = config.connect_attempts.max(1);
        let delay = Duration::from_millis(config.connect_retry_delay_ms);
        let mut attempt = 1;

        loop {
            match Self::connect_with(database_url, config).await {
                Ok(db) => return Ok(db),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        attempt,
                        attempts,
                        error = %e,
                        "PostgreSQL not ready, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(attempts, error = %e, "PostgreSQL connection failed");
                    return Err(e);
                }
            }
        }
    }

    /// Apply embedded migrations from `migrations/`
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
