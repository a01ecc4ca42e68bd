//! Domain model (config, status records, outcomes, events, errors, retry policy).

pub mod config;
pub mod status;
pub mod outcome;
pub mod events;
pub mod errors;
pub mod retry;

pub use self::config::PollConfig;
pub use self::status::{CheckState, StatusRecord};
pub use self::outcome::{Outcome, Reason, Resolution};
pub use self::events::{PollEvent, Severity};
pub use self::errors::{ConfigError, ErrorKind, SinkError, SourceError};
pub use self::retry::RetryPolicy;
