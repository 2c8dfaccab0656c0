//! Timeout enforcement.
//!
//! # Responsibilities
//! - Put a deadline on store lookups
//! - Cancel the lookup cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - The circuit breaker itself never times out a call; deadlines are applied
//!   inside the guarded operation so an expired lookup counts as a failure
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped future did not finish before its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

/// Await `fut`, giving up after `deadline`. `None` waits indefinitely.
pub async fn with_deadline<F>(deadline: Option<Duration>, fut: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DeadlineExceeded(limit)),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let result = with_deadline(Some(Duration::from_millis(50)), std::future::pending::<()>()).await;
        assert_eq!(result, Err(DeadlineExceeded(Duration::from_millis(50))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_future_completes() {
        let result = with_deadline(Some(Duration::from_secs(1)), async { 5 }).await;
        assert_eq!(result, Ok(5));
    }

    #[tokio::test]
    async fn test_no_deadline() {
        let result = with_deadline(None, async { "done" }).await;
        assert_eq!(result, Ok("done"));
    }
}
