// Backoff for the barcode database. The lookup is advisory, so we give up
// early rather than keep a user staring at a spinner.
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{LookupError, Result};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

/// Run `operation`, retrying transient failures with doubling delays.
///
/// Non-transient errors (4xx, malformed payloads) come back immediately -
/// hammering a server that already said no is pointless.
pub async fn with_backoff<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("Lookup succeeded after {} retries", attempt);
                }
                return Ok(result);
            }
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) => {
                attempt += 1;
                if attempt > config.max_retries {
                    warn!("Lookup failed after {} attempts: {}", attempt, err);
                    return Err(err);
                }

                debug!(
                    "Lookup attempt {}/{} failed: {}. Retrying in {}ms",
                    attempt, config.max_retries, err, delay_ms
                );
                sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = (delay_ms * 2).min(config.max_delay_ms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 4,
        }
    }

    #[tokio::test]
    async fn success_needs_one_attempt() {
        let calls = AtomicU32::new(0);
        let result = with_backoff(&fast_config(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, LookupError>(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_errors_are_retried() {
        let calls = AtomicU32::new(0);
        let result = with_backoff(&fast_config(), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(LookupError::RequestFailed(503))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result = with_backoff(&fast_config(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<i32, _>(LookupError::RequestFailed(400))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let config = fast_config();
        let result = with_backoff(&config, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<i32, _>(LookupError::RequestFailed(500))
        })
        .await;

        assert!(result.is_err());
        // Initial attempt + max_retries
        assert_eq!(calls.load(Ordering::SeqCst), config.max_retries + 1);
    }

    #[test]
    fn transient_classification() {
        assert!(LookupError::RequestFailed(500).is_transient());
        assert!(LookupError::RequestFailed(503).is_transient());
        assert!(LookupError::RequestFailed(429).is_transient());
        assert!(LookupError::RequestFailed(408).is_transient());

        assert!(!LookupError::RequestFailed(404).is_transient());
        assert!(!LookupError::RequestFailed(400).is_transient());
        assert!(!LookupError::RequestFailed(401).is_transient());
    }
}
