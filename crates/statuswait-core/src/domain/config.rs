//! PollConfig - 1 回の実行パラメータ
//!
//! 起動時に一度だけ組み立て、以後は変更しない。

use std::time::Duration;

use super::errors::ConfigError;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 12;

/// Immutable parameters of a single poll run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    context: String,
    reference: String,
    interval: Duration,
    max_attempts: u32,
}

impl PollConfig {
    /// Validate and build a config.
    ///
    /// A zero `interval` is accepted (poll back to back); the CLI enforces its own
    /// lower bound.
    pub fn new(
        context: impl Into<String>,
        reference: impl Into<String>,
        interval: Duration,
        max_attempts: u32,
    ) -> Result<Self, ConfigError> {
        let context = context.into();
        let reference = reference.into();

        if context.trim().is_empty() {
            return Err(ConfigError::EmptyContext);
        }
        if reference.trim().is_empty() {
            return Err(ConfigError::EmptyReference);
        }
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        Ok(Self {
            context,
            reference,
            interval,
            max_attempts,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound on time spent sleeping between polls (retry backoff excluded).
    pub fn worst_case_wait(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts.saturating_add(1))
    }
}
