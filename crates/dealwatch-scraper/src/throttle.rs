//! Per-platform rate-limit clock.
//!
//! Consecutive requests against the same platform are spaced by a random
//! gap drawn from [`ThrottleRange`]. Every attempt goes through the clock,
//! retries included. Requests for different platforms never wait on each
//! other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dealwatch_core::Platform;
use rand::Rng;
use tokio::time::Instant;

/// Inclusive range the inter-request gap is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for ThrottleRange {
    fn default() -> Self {
        Self {
            min_ms: 2_000,
            max_ms: 4_000,
        }
    }
}

impl ThrottleRange {
    #[must_use]
    pub fn fixed(ms: u64) -> Self {
        Self { min_ms: ms, max_ms: ms }
    }

    fn sample(self) -> Duration {
        let (lo, hi) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

type Clock = Arc<tokio::sync::Mutex<Option<Instant>>>;

#[derive(Debug, Default)]
pub struct Throttle {
    range: ThrottleRange,
    clocks: Mutex<HashMap<Platform, Clock>>,
}

impl Throttle {
    #[must_use]
    pub fn new(range: ThrottleRange) -> Self {
        Self {
            range,
            clocks: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until `platform` may issue its next request, then records the
    /// request instant.
    ///
    /// The platform's clock stays locked across the sleep so concurrent
    /// callers for the same platform queue behind each other.
    pub async fn acquire(&self, platform: Platform) {
        let clock = self.clock_for(platform);
        let mut last = clock.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.range.sample();
            let now = Instant::now();
            if ready_at > now {
                tracing::debug!(
                    %platform,
                    wait_ms = u64::try_from((ready_at - now).as_millis()).unwrap_or(u64::MAX),
                    "throttling request"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn clock_for(&self, platform: Platform) -> Clock {
        let mut clocks = self.clocks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(clocks.entry(platform).or_default())
    }
}
