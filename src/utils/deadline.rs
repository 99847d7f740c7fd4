//! Bounded waiting for storage calls.

use std::future::Future;
use std::time::Duration;

use serde_json::json;

use crate::error::AppError;

/// Upper bound for one storage call unless configured otherwise.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Awaits `fut` for at most `limit`.
///
/// On expiry the future is dropped, which aborts the in-flight store call; an
/// open database transaction is rolled back when its handle drops. The caller
/// receives [`AppError::Storage`] naming the operation.
pub async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Storage call timed out"
            );
            Err(AppError::storage(
                "Storage call timed out",
                json!({ "operation": operation, "timeout_ms": limit.as_millis() as u64 }),
            ))
        }
    }
}
