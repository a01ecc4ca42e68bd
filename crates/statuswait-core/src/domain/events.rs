//! Events - 実行ログに残す遷移
//!
//! Poller はイベントを EventSink に渡すだけで、表示形式はここで決める。

use std::time::Duration;

use super::status::CheckState;

/// How a run-log line is surfaced (stdout for Info, stderr otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A transition reported by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Query { endpoint: String },
    NotStarted { context: String },
    ContextMismatch { context: String, found: String },
    Waiting { context: String },
    /// `raw` is the state string as reported; `state` is its classification.
    Observed {
        context: String,
        state: CheckState,
        raw: String,
        poll: u32,
    },
    TransientError {
        context: String,
        error: String,
        retry: u32,
        max_retries: u32,
        delay: Duration,
    },
    SourceUnavailable { context: String, error: String },
    SourceRejected { context: String, error: String },
    Timeout { context: String, polls: u32 },
    /// `state` is the raw failing state (`failure` or `error`).
    Failed { context: String, state: String },
    Passed { context: String },
}

impl PollEvent {
    pub fn severity(&self) -> Severity {
        match self {
            PollEvent::Query { .. }
            | PollEvent::NotStarted { .. }
            | PollEvent::Waiting { .. }
            | PollEvent::Passed { .. } => Severity::Info,
            PollEvent::Observed { state, .. } if state.is_unknown() => Severity::Warning,
            PollEvent::Observed { .. } => Severity::Info,
            PollEvent::TransientError { .. } => Severity::Warning,
            PollEvent::ContextMismatch { .. }
            | PollEvent::SourceUnavailable { .. }
            | PollEvent::SourceRejected { .. }
            | PollEvent::Timeout { .. }
            | PollEvent::Failed { .. } => Severity::Error,
        }
    }

    /// The run-log line for this event.
    pub fn message(&self) -> String {
        match self {
            PollEvent::Query { endpoint } => format!("api call to {endpoint}"),
            PollEvent::NotStarted { context } => {
                format!("{context} failed to start or not triggered! Stopping.")
            }
            PollEvent::ContextMismatch { context, .. } => {
                format!("{context} failed to start! Stopping.")
            }
            PollEvent::Waiting { context } => format!("Waiting for {context} to complete..."),
            PollEvent::Observed {
                context, state, raw, ..
            } => {
                if state.is_unknown() || raw.trim().eq_ignore_ascii_case(&state.to_string()) {
                    format!("{context}: {state}")
                } else {
                    format!("{context}: {raw} ({state})")
                }
            }
            PollEvent::TransientError {
                context,
                error,
                retry,
                max_retries,
                delay,
            } => format!(
                "{context}: transient error from status source (retry {retry}/{max_retries} in {:.1}s): {error}",
                delay.as_secs_f64()
            ),
            PollEvent::SourceUnavailable { context, error } => {
                format!("{context}: status source unavailable, giving up: {error}")
            }
            PollEvent::SourceRejected { context, error } => {
                format!("{context}: status source rejected the request: {error}")
            }
            PollEvent::Timeout { context, .. } => format!("{context} Timeout! Stopping."),
            PollEvent::Failed { context, state } => {
                format!("::error::{context} failed with state {state}")
            }
            PollEvent::Passed { context } => format!("{context} Passed Successfully!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_run_log_format() {
        let context = "build".to_string();
        assert_eq!(
            PollEvent::NotStarted { context: context.clone() }.message(),
            "build failed to start or not triggered! Stopping."
        );
        assert_eq!(
            PollEvent::Waiting { context: context.clone() }.message(),
            "Waiting for build to complete..."
        );
        assert_eq!(
            PollEvent::Observed {
                context: context.clone(),
                state: CheckState::Pending,
                raw: "pending".to_string(),
                poll: 1,
            }
            .message(),
            "build: pending"
        );
        assert_eq!(
            PollEvent::Observed {
                context: context.clone(),
                state: CheckState::Pending,
                raw: "in_progress".to_string(),
                poll: 2,
            }
            .message(),
            "build: in_progress (pending)"
        );
        assert_eq!(
            PollEvent::Timeout { context: context.clone(), polls: 3 }.message(),
            "build Timeout! Stopping."
        );
        assert_eq!(
            PollEvent::Passed { context }.message(),
            "build Passed Successfully!"
        );
    }

    #[test]
    fn unknown_observations_are_warnings() {
        let event = PollEvent::Observed {
            context: "build".to_string(),
            state: CheckState::Unknown("stale".to_string()),
            raw: "stale".to_string(),
            poll: 2,
        };
        assert_eq!(event.severity(), Severity::Warning);
        assert_eq!(event.message(), "build: stale (unrecognised)");
    }

    #[test]
    fn terminal_failures_are_errors() {
        let mismatch = PollEvent::ContextMismatch {
            context: "build".to_string(),
            found: "test".to_string(),
        };
        let failed = PollEvent::Failed {
            context: "build".to_string(),
            state: "error".to_string(),
        };
        assert_eq!(mismatch.severity(), Severity::Error);
        assert_eq!(failed.severity(), Severity::Error);
        assert_eq!(failed.message(), "::error::build failed with state error");
    }
}
