//! StatusPoller - bounded polling loop for one named context.
//!
//! States: Start -> Polling -> Resolved.
//! - Start -> Resolved(not_found): no statuses, 404, or the newest status belongs
//!   to another context. Polling is never entered.
//! - Start -> Polling: newest status matches the context and is not terminal.
//! - Polling -> Polling: non-terminal state, while polls <= max_attempts.
//! - Polling -> Resolved(success | failure): terminal state, or timeout.
//!
//! Source errors never escape: transient ones are retried with backoff, and
//! whatever cannot be retried resolves to failure.

use std::sync::Arc;

use crate::domain::{
    CheckState, ErrorKind, PollConfig, PollEvent, Reason, Resolution, RetryPolicy, StatusRecord,
};
use crate::ports::{Clock, EventSink, StatusSource};

/// Counters for the run in progress.
#[derive(Debug, Default)]
struct Progress {
    queries: u32,
    polls: u32,
    last_state: Option<CheckState>,
}

pub struct StatusPoller {
    config: PollConfig,
    source: Arc<dyn StatusSource>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    retry: RetryPolicy,
}

impl StatusPoller {
    pub fn new(
        config: PollConfig,
        source: Arc<dyn StatusSource>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            source,
            clock,
            sink,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Drive the run to its single resolution.
    #[tracing::instrument(
        name = "poll",
        skip(self),
        fields(context = %self.config.context(), reference = %self.config.reference())
    )]
    pub async fn run(&self) -> Resolution {
        let started_at = self.clock.now();
        let mut progress = Progress::default();

        let reason = self.drive(&mut progress).await;

        let elapsed = (self.clock.now() - started_at).to_std().unwrap_or_default();
        let resolution = Resolution {
            queries: progress.queries,
            polls: progress.polls,
            last_state: progress.last_state,
            elapsed,
            ..Resolution::new(reason)
        };
        tracing::info!(
            outcome = %resolution.outcome,
            reason = ?resolution.reason,
            queries = resolution.queries,
            polls = resolution.polls,
            elapsed_secs = resolution.elapsed.as_secs_f64(),
            "poll run resolved"
        );
        resolution
    }

    async fn drive(&self, progress: &mut Progress) -> Reason {
        let context = self.config.context();

        let records = match self.query(progress).await {
            Ok(records) => records,
            Err(reason) => return reason,
        };

        // Absence means "never started", not "pending".
        let Some(first) = records.first() else {
            self.emit(PollEvent::NotStarted {
                context: context.to_string(),
            });
            return Reason::NotStarted;
        };

        if first.context != context {
            self.emit(PollEvent::ContextMismatch {
                context: context.to_string(),
                found: first.context.clone(),
            });
            return Reason::ContextMismatch {
                found: first.context.clone(),
            };
        }

        self.emit(PollEvent::Waiting {
            context: context.to_string(),
        });

        let mut raw_state = first.state.clone();
        let mut state = first.check_state();
        progress.last_state = Some(state.clone());

        while !state.is_terminal() {
            if progress.polls > self.config.max_attempts() {
                self.emit(PollEvent::Timeout {
                    context: context.to_string(),
                    polls: progress.polls,
                });
                return Reason::TimedOut {
                    polls: progress.polls,
                };
            }

            self.clock.sleep(self.config.interval()).await;

            let records = match self.query(progress).await {
                Ok(records) => records,
                Err(reason) => return reason,
            };
            (raw_state, state) = match records.first() {
                Some(record) => (record.state.clone(), record.check_state()),
                None => (String::new(), CheckState::Unknown(String::new())),
            };
            progress.polls += 1;
            progress.last_state = Some(state.clone());

            self.emit(PollEvent::Observed {
                context: context.to_string(),
                state: state.clone(),
                raw: raw_state.clone(),
                poll: progress.polls,
            });
        }

        if state == CheckState::Success {
            self.emit(PollEvent::Passed {
                context: context.to_string(),
            });
            Reason::Passed
        } else {
            self.emit(PollEvent::Failed {
                context: context.to_string(),
                state: raw_state.clone(),
            });
            Reason::Failed { state: raw_state }
        }
    }

    /// One logical query, retrying transient errors.
    ///
    /// NotFound reads as an empty list. `Err` carries the terminal reason when
    /// the source cannot be read.
    async fn query(&self, progress: &mut Progress) -> Result<Vec<StatusRecord>, Reason> {
        let context = self.config.context();
        let reference = self.config.reference();
        let mut retry = 0;

        loop {
            self.emit(PollEvent::Query {
                endpoint: self.source.endpoint(reference),
            });
            progress.queries += 1;

            let error = match self.source.fetch(reference).await {
                Ok(records) => {
                    tracing::debug!(entries = records.len(), "status source answered");
                    return Ok(records);
                }
                Err(error) => error,
            };

            match error.kind() {
                ErrorKind::NotFound => {
                    tracing::debug!(%error, "status source reported not found");
                    return Ok(Vec::new());
                }
                ErrorKind::Permanent => {
                    self.emit(PollEvent::SourceRejected {
                        context: context.to_string(),
                        error: error.to_string(),
                    });
                    return Err(Reason::SourceRejected {
                        message: error.to_string(),
                    });
                }
                ErrorKind::Transient if retry < self.retry.max_retries => {
                    retry += 1;
                    let delay = self.retry.next_delay(retry);
                    tracing::warn!(%error, retry, ?delay, "transient status source error");
                    self.emit(PollEvent::TransientError {
                        context: context.to_string(),
                        error: error.to_string(),
                        retry,
                        max_retries: self.retry.max_retries,
                        delay,
                    });
                    self.clock.sleep(delay).await;
                }
                ErrorKind::Transient => {
                    self.emit(PollEvent::SourceUnavailable {
                        context: context.to_string(),
                        error: error.to_string(),
                    });
                    return Err(Reason::SourceUnavailable {
                        message: error.to_string(),
                    });
                }
            }
        }
    }

    fn emit(&self, event: PollEvent) {
        if let Err(error) = self.sink.record(&event) {
            tracing::warn!(%error, "failed to record run-log event");
        }
    }
}
