//! Retry pacing for polling scenes

use std::sync::Arc;
use std::time::Duration;

/// Produces successive wait durations for a retrying scene.
///
/// Each call consumes one retry; `None` means the budget is spent and the
/// scene has failed.
pub trait BackoffTimer: Send {
    fn wait_time(&mut self) -> Option<Duration>;
}

/// Builds a fresh timer for every scene
pub type TimerFactory = Arc<dyn Fn() -> Box<dyn BackoffTimer> + Send + Sync>;

/// Doubling backoff: the n-th wait is `min(cap, base * 2^n)`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    cap: Duration,
    max_retries: u32,
    retry: u32,
}

impl ExponentialBackoff {
    pub const DEFAULT_BASE: Duration = Duration::from_millis(100);
    pub const DEFAULT_CAP: Duration = Duration::from_secs(60);
    pub const DEFAULT_MAX_RETRIES: u32 = 10;

    pub fn new(base: Duration, cap: Duration, max_retries: u32) -> Self {
        Self {
            base,
            cap,
            max_retries,
            retry: 0,
        }
    }

    /// Default policy with a different retry budget
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self::new(Self::DEFAULT_BASE, Self::DEFAULT_CAP, max_retries)
    }

    /// Number of waits handed out so far
    pub fn retries(&self) -> u32 {
        self.retry
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_BASE,
            Self::DEFAULT_CAP,
            Self::DEFAULT_MAX_RETRIES,
        )
    }
}

impl BackoffTimer for ExponentialBackoff {
    fn wait_time(&mut self) -> Option<Duration> {
        if self.retry >= self.max_retries {
            return None;
        }
        let factor = 1u32.checked_shl(self.retry).unwrap_or(u32::MAX);
        self.retry += 1;
        Some(self.base.saturating_mul(factor).min(self.cap))
    }
}

/// Factory for the default exponential policy
pub fn default_timer_factory() -> TimerFactory {
    Arc::new(|| Box::new(ExponentialBackoff::default()))
}
