use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use crate::account::validation::AssetCode;
use crate::ledger::asset_policy::{AssetPolicy, AssetWallets};
use crate::ledger::retry::RetryPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// Overridden by `DATABASE_URL`
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    /// System wallets per supported asset
    #[serde(default)]
    pub assets: HashMap<AssetCode, AssetWallets>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub connect_attempts: u32,
    pub connect_retry_delay_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 50,
            acquire_timeout_secs: 5,
            connect_attempts: 10,
            connect_retry_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound on waiting for a wallet row lock
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml` and apply environment overrides
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;

        let mut config = Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: config_path.clone(),
                source,
            },
            other => other,
        })?;

        if let Ok(url) = std::env::var("DATABASE_URL")
            && !url.is_empty()
        {
            config.postgres_url = Some(url);
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: "<inline>".to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.lock_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.lock_timeout_ms must be positive".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        for (code, wallets) in &self.assets {
            if wallets.treasury == wallets.revenue {
                return Err(ConfigError::Invalid(format!(
                    "asset {}: treasury and revenue must be different wallets",
                    code
                )));
            }
        }
        Ok(())
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.postgres_url
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("postgres_url or DATABASE_URL required".to_string()))
    }

    /// Immutable asset policy built from the `assets` section
    pub fn asset_policy(&self) -> AssetPolicy {
        AssetPolicy::new(self.assets.clone())
    }
}
