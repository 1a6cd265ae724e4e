//! Bounded retry for optimistic-write conflicts.

use std::future::Future;

use tracing::debug;

use letstalk_core::AppResult;
use letstalk_core::error::AppError;

/// Run `op`, retrying while it fails with a retryable conflict.
///
/// Conflicts are an internal coordination signal and never surface to a
/// caller: exhausting the allowed attempts maps to `Unavailable`.
pub async fn with_conflict_retries<T, F, Fut>(max_attempts: u32, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Err(e) if e.is_retryable() => {
                attempt += 1;
                if attempt >= max_attempts.max(1) {
                    return Err(AppError::unavailable(format!(
                        "Write conflict persisted after {attempt} attempts: {}",
                        e.message
                    )));
                }
                debug!(attempt, "Retrying after write conflict");
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letstalk_core::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_conflicts() {
        let calls = AtomicU32::new(0);
        let result = with_conflict_retries(3, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(AppError::conflict("lost race"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_maps_to_unavailable() {
        let result: AppResult<()> =
            with_conflict_retries(3, || async { Err(AppError::conflict("lost race")) }).await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_non_retryable_errors_pass_through() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_conflict_retries(3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::not_found("gone")) }
        })
        .await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::NotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
