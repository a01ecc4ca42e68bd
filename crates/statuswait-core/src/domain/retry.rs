//! Retry policy for transient status-source errors.

use std::time::Duration;

use rand::Rng;

/// Backoff cap used by the CLI.
pub const DEFAULT_MAXIMUM_INTERVAL: Duration = Duration::from_secs(60);

/// Backoff between retries of a single query.
///
/// Retries only cover transient errors; they are not poll attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed per query (0 disables retrying).
    pub max_retries: u32,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Backoff multiplier for exponential backoff.
    pub multiplier: f64,

    /// Random extra delay, as a fraction of the computed delay (0.0 = none).
    pub jitter: f64,

    /// Upper bound on the backoff before jitter is added.
    pub maximum_interval: Option<Duration>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            multiplier: 2.0,
            jitter: 0.0,
            maximum_interval: None,
        }
    }

    /// 3 retries, 2s base, 2.0 multiplier, 10% jitter, capped at 60s.
    pub fn default_cli() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            multiplier: 2.0,
            jitter: 0.1,
            maximum_interval: Some(DEFAULT_MAXIMUM_INTERVAL),
        }
    }

    /// No retrying: the first transient error gives up.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.max(0.0);
        self
    }

    pub fn with_maximum_interval(mut self, maximum_interval: Duration) -> Self {
        self.maximum_interval = Some(maximum_interval);
        self
    }

    /// Delay before retry number `retry` (1-indexed):
    /// min(base_delay * multiplier^(retry - 1), maximum_interval), plus jitter.
    ///
    /// Example with base_delay=2s, multiplier=2.0, no jitter, no cap:
    /// - retry 1: 2s
    /// - retry 2: 4s
    /// - retry 3: 8s
    pub fn next_delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let mut delay_secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if let Some(max) = self.maximum_interval {
            // NaN/inf also collapse to the cap
            delay_secs = if delay_secs.is_finite() {
                delay_secs.min(max.as_secs_f64())
            } else {
                max.as_secs_f64()
            };
        }
        if !delay_secs.is_finite() {
            return Duration::MAX;
        }

        let jitter_secs = if self.jitter > 0.0 && delay_secs > 0.0 {
            rand::thread_rng().gen_range(0.0..=delay_secs * self.jitter)
        } else {
            0.0
        };

        Duration::try_from_secs_f64(delay_secs + jitter_secs).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::default_cli()
    }
}
