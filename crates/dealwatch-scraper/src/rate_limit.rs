//! Retry with exponential back-off and jitter for page fetches.
//!
//! [`retry_with_backoff`] wraps a single fetch attempt and retries transient
//! failures (network errors, timeouts, 5xx). Client errors (4xx) and invalid
//! URLs are returned immediately: the target is presumed invalid or blocked.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Retry schedule consumed by [`crate::PageFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay, before jitter.
    pub max_delay_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
        }
    }
}

impl BackoffPolicy {
    /// A policy that never retries. Handy in tests.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Delay before retry number `retry` (1-based), capped and with ±25 % jitter.
    ///
    /// | Retry | Delay (base = 2 000 ms)   |
    /// |-------|---------------------------|
    /// | 1     | 2 000 ms × 2⁰ ± 25 %      |
    /// | 2     | 2 000 ms × 2¹ ± 25 %      |
    /// | 3     | 2 000 ms × 2² ± 25 %      |
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(20);
        let computed = self.base_delay_ms.saturating_mul(1u64 << exponent);
        let capped = computed.min(self.max_delay_ms);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
        Duration::from_millis(jittered)
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** network-level failures (timeout, connection reset, body
/// read failure) and HTTP 5xx.
///
/// **Not retriable:** every 4xx including 429, invalid URLs, and request
/// construction errors.
pub(crate) fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Http(e) => !e.is_builder(),
        FetchError::ServerStatus { .. } => true,
        FetchError::ClientStatus { .. } | FetchError::InvalidUrl { .. } => false,
    }
}

/// Runs `operation` with up to `policy.max_retries` additional attempts on
/// transient errors. The last error is returned once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: &BackoffPolicy,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut retry = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || retry >= policy.max_retries {
                    return Err(err);
                }
                retry += 1;
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    retry,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient fetch error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
