//! Outcome model: the single terminal result of a run.
//!
//! `Outcome` is what the calling workflow sees (`result=<outcome>`); `Reason`
//! keeps the path that led there so the log and the exit code can tell a
//! timeout from a reported failure.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::status::CheckState;

/// Terminal classification of a run.
///
/// Serialized as snake_case to match the workflow output contract:
/// not_found / success / failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    NotFound,
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::NotFound => "not_found",
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run resolved the way it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// No statuses recorded for the reference (empty list or 404).
    NotStarted,
    /// The most recent status belongs to another context.
    ContextMismatch { found: String },
    Passed,
    Failed { state: String },
    /// The attempt budget ran out while the check was still in progress.
    TimedOut { polls: u32 },
    /// Transient source errors persisted past the retry budget.
    SourceUnavailable { message: String },
    /// The source refused the request (auth, bad ref, undecodable body).
    SourceRejected { message: String },
}

impl Reason {
    pub fn outcome(&self) -> Outcome {
        match self {
            Reason::NotStarted | Reason::ContextMismatch { .. } => Outcome::NotFound,
            Reason::Passed => Outcome::Success,
            Reason::Failed { .. }
            | Reason::TimedOut { .. }
            | Reason::SourceUnavailable { .. }
            | Reason::SourceRejected { .. } => Outcome::Failure,
        }
    }
}

/// The resolved run: outcome plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub reason: Reason,

    /// Calls made to the status source, retries included.
    pub queries: u32,

    /// Poll-loop iterations (the initial query is not a poll).
    pub polls: u32,

    pub last_state: Option<CheckState>,
    pub elapsed: Duration,
}

impl Resolution {
    pub fn new(reason: Reason) -> Self {
        Self {
            outcome: reason.outcome(),
            reason,
            queries: 0,
            polls: 0,
            last_state: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Process exit status for this resolution.
    ///
    /// Anything but success is non-zero, both not_found paths included.
    pub fn exit_code(&self) -> u8 {
        match self.outcome {
            Outcome::Success => 0,
            Outcome::NotFound | Outcome::Failure => 1,
        }
    }
}
