use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Keep the guard alive for the process
/// lifetime or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    // Installs the process-wide subscriber; keep it the only test that does.
    #[test]
    fn test_json_file_logging() {
        let dir = std::env::temp_dir().join(format!("wallet_ledger_log_{}", uuid::Uuid::new_v4()));
        let yaml = format!(
            r#"
log_level: info
log_dir: {}
log_file: ledger.log
use_json: true
rotation: never
gateway:
  host: 127.0.0.1
  port: 0
"#,
            dir.display()
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();

        let guard = init_logging(&config);
        tracing::info!(wallet_id = "w1", "json line");
        drop(guard);

        let content = std::fs::read_to_string(dir.join("ledger.log")).unwrap();
        for line in content.lines().filter(|l| !l.is_empty()) {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("fields").is_some());
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
