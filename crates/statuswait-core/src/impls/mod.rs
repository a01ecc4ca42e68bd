//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **GithubStatusSource**: GitHub commit status API（本番用）
//! - **ActionsSink**: GitHub Actions の step summary / output ファイル（本番用）
//! - **ScriptedSource / MemorySink**: テスト・開発用の in-memory 実装

pub mod github;
pub mod actions;
pub mod memory;

pub use self::github::{GithubStatusSource, SetupError};
pub use self::actions::ActionsSink;
pub use self::memory::{MemorySink, ScriptedSource};
