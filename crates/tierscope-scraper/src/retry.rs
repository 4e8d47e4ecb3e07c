//! Target-level retry with exponential backoff.
//!
//! Only skips that another attempt could plausibly fix are retried: a
//! landmark that never loaded, a failed navigation, or a blown time budget.
//! Everything else, including successes, is returned as-is.

use std::future::Future;
use std::time::Duration;

use crate::session::Outcome;

/// Runs `operation` until it yields a non-retriable outcome or `max_retries`
/// extra attempts have been spent.
///
/// Before retry `n` (1-based) the function sleeps
/// `backoff_base_secs * 2^(n-1)` seconds. With `max_retries = 2` the
/// operation runs at most 3 times.
pub(crate) async fn retry_with_backoff<F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Outcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Outcome>,
{
    let mut attempt = 0u32;

    loop {
        let reason = match operation().await {
            Outcome::Skipped(reason) if reason.is_retriable() && attempt < max_retries => reason,
            outcome => return outcome,
        };

        // Cap the shift so extreme configs saturate instead of overflowing.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            reason = %reason,
            "retriable skip, retrying target after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
