//! Ordered candidate fallback: try each candidate until one succeeds.

use std::future::Future;

use tracing::warn;

use crate::error::ApiError;

/// Runs `attempt` over `candidates` in order, returning the first success.
/// When every candidate fails the last error is returned. An empty list is a
/// configuration problem and yields [`ApiError::MissingConfig`].
pub async fn first_success<C, T, F, Fut>(candidates: &[C], mut attempt: F) -> Result<T, ApiError>
where
    C: std::fmt::Debug,
    F: FnMut(&C) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut last_err = None;
    for candidate in candidates {
        match attempt(candidate).await {
            Ok(v) => return Ok(v),
            Err(e) => {
                warn!(candidate = ?candidate, error = %e, "candidate failed");
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| ApiError::MissingConfig("no candidates configured".into())))
}
