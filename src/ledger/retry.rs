//! Conflict Retry Policy
//!
//! Bounded re-execution of one transfer when the store reports a transient
//! write conflict (deadlock, serialization failure, lock timeout). Every other
//! error, business rejections included, is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, warn};

use super::error::LedgerError;

/// Retry bound and inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Fixed delay between attempts
    #[serde(rename = "delay_ms", with = "millis")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `op` until it succeeds, fails with a non-conflict error, or the
    /// attempt bound is reached (`LedgerError::ConflictExceeded`).
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, LedgerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let max_attempts = self.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match op().await {
                Err(e) if e.is_write_conflict() => {
                    if attempt < max_attempts {
                        warn!(
                            attempt,
                            max_attempts,
                            error = %e,
                            "Write conflict - retrying"
                        );
                        tokio::time::sleep(self.delay).await;
                    } else {
                        error!(attempt, error = %e, "Write conflict - retries exhausted");
                    }
                }
                other => return other,
            }
        }

        Err(LedgerError::ConflictExceeded {
            attempts: max_attempts,
        })
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
