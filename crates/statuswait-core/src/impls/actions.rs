//! ActionsSink - GitHub Actions 向けの EventSink
//!
//! - 実行ログ: `$GITHUB_STEP_SUMMARY` に追記し、stdout / stderr にもミラーする
//! - 構造化出力: `$GITHUB_OUTPUT` に `result=<outcome>` を追記する

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::domain::{Outcome, PollEvent, Severity, SinkError};
use crate::ports::EventSink;

/// Name of the workflow output carrying the outcome.
pub const RESULT_OUTPUT: &str = "result";

/// Where run-log lines are echoed besides the summary file.
pub type Mirror = fn(Severity, &str) -> io::Result<()>;

/// stdout for Info, stderr otherwise.
pub fn terminal_mirror(severity: Severity, line: &str) -> io::Result<()> {
    match severity {
        Severity::Info => writeln!(io::stdout().lock(), "{line}"),
        Severity::Warning | Severity::Error => writeln!(io::stderr().lock(), "{line}"),
    }
}

/// Writes the run log and the outcome where a workflow step expects them.
///
/// Either path may be missing (local runs); lines then only reach the terminal.
#[derive(Debug, Clone)]
pub struct ActionsSink {
    summary_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    mirror: Option<Mirror>,
}

impl ActionsSink {
    pub fn new(summary_path: Option<PathBuf>, output_path: Option<PathBuf>) -> Self {
        Self {
            summary_path,
            output_path,
            mirror: Some(terminal_mirror),
        }
    }

    /// Stop mirroring run-log lines to stdout/stderr.
    pub fn without_mirror(mut self) -> Self {
        self.mirror = None;
        self
    }

    pub fn with_mirror(mut self, mirror: Mirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    fn mirror_line(&self, severity: Severity, line: &str) -> Result<(), SinkError> {
        match self.mirror {
            Some(mirror) => mirror(severity, line).map_err(SinkError::Terminal),
            None => Ok(()),
        }
    }
}

fn append_line(path: &Path, line: &str) -> Result<(), SinkError> {
    let to_sink_error = |source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_sink_error)?;
    writeln!(file, "{line}").map_err(to_sink_error)?;
    file.flush().map_err(to_sink_error)
}

impl EventSink for ActionsSink {
    fn record(&self, event: &PollEvent) -> Result<(), SinkError> {
        let line = event.message();
        // summary first; a broken terminal must not drop the line
        let appended = match &self.summary_path {
            Some(path) => append_line(path, &line),
            None => Ok(()),
        };
        let mirrored = self.mirror_line(event.severity(), &line);
        appended.and(mirrored)
    }

    fn publish(&self, outcome: Outcome) -> Result<(), SinkError> {
        let line = format!("{RESULT_OUTPUT}={outcome}");
        match &self.output_path {
            Some(path) => append_line(path, &line),
            None => writeln!(io::stdout().lock(), "{line}").map_err(SinkError::Terminal),
        }
    }
}
