//! Errors - エラー型と分類

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// ErrorKind は status source エラーの運用分類
///
/// - Transient: 一時的なエラー（リトライ推奨）
/// - NotFound: 参照先にまだ何も記録されていない（空の結果と同じ扱い）
/// - Permanent: 恒久的なエラー（リトライ無意味）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    NotFound,
    Permanent,
}

/// Errors reported by a status source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("no statuses recorded for {0}")]
    NotFound(String),

    #[error("status request failed: {0}")]
    Transient(String),

    #[error("status request rejected: {0}")]
    Permanent(String),
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::NotFound(_) => ErrorKind::NotFound,
            SourceError::Transient(_) => ErrorKind::Transient,
            SourceError::Permanent(_) => ErrorKind::Permanent,
        }
    }
}

/// Invalid poll parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("context must not be empty")]
    EmptyContext,

    #[error("ref must not be empty")]
    EmptyReference,

    #[error("max attempts must be at least 1")]
    ZeroAttempts,
}

/// Failures writing the run log or the structured output.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to append to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to terminal: {0}")]
    Terminal(#[source] io::Error),
}
