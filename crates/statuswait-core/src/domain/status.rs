//! Status records as returned by the source, and their classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One status entry recorded against a reference.
///
/// Only `state` and `context` drive the poller; the remaining fields are kept
/// for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub state: String,
    pub context: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl StatusRecord {
    pub fn new(context: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            context: context.into(),
            description: None,
            target_url: None,
            updated_at: None,
        }
    }

    pub fn check_state(&self) -> CheckState {
        CheckState::parse(&self.state)
    }
}

/// Closed classification of the raw `state` string.
///
/// State transitions seen by the poller:
/// - Pending -> Pending (keep polling)
/// - Pending -> Success | Failure (stop)
/// - Unknown は Pending と同様に polling を続けるが、警告としてログに残す
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CheckState {
    Success,
    Failure,
    Pending,
    /// Anything the source reported that we do not recognise. Empty when the
    /// source returned no entry at all.
    Unknown(String),
}

impl CheckState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => CheckState::Success,
            "failure" | "error" => CheckState::Failure,
            "pending" | "queued" | "in_progress" | "expected" | "waiting" => CheckState::Pending,
            _ => CheckState::Unknown(raw.to_string()),
        }
    }

    /// Is this a terminal state (no further polling)?
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckState::Success | CheckState::Failure)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, CheckState::Unknown(_))
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckState::Success => f.write_str("success"),
            CheckState::Failure => f.write_str("failure"),
            CheckState::Pending => f.write_str("pending"),
            CheckState::Unknown(raw) if raw.is_empty() => f.write_str("<no status>"),
            CheckState::Unknown(raw) => write!(f, "{raw} (unrecognised)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::success("success", CheckState::Success)]
    #[case::failure("failure", CheckState::Failure)]
    #[case::error("error", CheckState::Failure)]
    #[case::pending("pending", CheckState::Pending)]
    #[case::in_progress("in_progress", CheckState::Pending)]
    #[case::mixed_case("Success", CheckState::Success)]
    #[case::unknown("cancelled", CheckState::Unknown("cancelled".to_string()))]
    fn parses_raw_states(#[case] raw: &str, #[case] expected: CheckState) {
        assert_eq!(CheckState::parse(raw), expected);
    }

    #[test]
    fn only_success_and_failure_are_terminal() {
        assert!(CheckState::Success.is_terminal());
        assert!(CheckState::Failure.is_terminal());
        assert!(!CheckState::Pending.is_terminal());
        assert!(!CheckState::Unknown("weird".to_string()).is_terminal());
    }

    #[test]
    fn decodes_github_payload_with_extra_fields() {
        let body = r#"[{
            "id": 1,
            "state": "pending",
            "context": "build",
            "description": "queued",
            "target_url": null,
            "updated_at": "2024-01-02T03:04:05Z"
        }]"#;
        let records: Vec<StatusRecord> = serde_json::from_str(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context, "build");
        assert_eq!(records[0].check_state(), CheckState::Pending);
        assert_eq!(records[0].description.as_deref(), Some("queued"));
        assert!(records[0].target_url.is_none());
        assert!(records[0].updated_at.is_some());
    }

    #[test]
    fn missing_entry_renders_readably() {
        assert_eq!(CheckState::Unknown(String::new()).to_string(), "<no status>");
    }
}
