//! Shared helpers

use crate::{Error, Result};
use uuid::Uuid;

/// Generate a fresh transaction id for one request/response exchange.
pub fn new_txid() -> String {
    Uuid::new_v4().to_string()
}

/// Retry with exponential backoff
pub async fn retry_with_backoff<F, Fut, T>(
    mut f: F,
    max_retries: usize,
    initial_delay: std::time::Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut delay = initial_delay;

    for attempt in 0..max_retries {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < max_retries - 1 => {
                tracing::warn!(
                    "Retry attempt {} failed: {}, retrying in {:?}",
                    attempt + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }

    Err(Error::Internal("Max retries exceeded".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_txid_unique() {
        let a = new_txid();
        let b = new_txid();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[tokio::test]
    async fn test_retry_eventually_succeeds() {
        let attempts = AtomicUsize::new(0);
        let result = retry_with_backoff(
            || async {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Error::Timeout("not yet".into()))
                } else {
                    Ok(42)
                }
            },
            5,
            std::time::Duration::from_millis(1),
        )
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_stops_on_permanent_error() {
        let attempts = AtomicUsize::new(0);
        let result: Result<()> = retry_with_backoff(
            || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(Error::DuplicateName("d0".into()))
            },
            5,
            std::time::Duration::from_millis(1),
        )
        .await;
        assert!(matches!(result, Err(Error::DuplicateName(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
