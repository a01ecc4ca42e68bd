//! statuswait-core
//!
//! Commit status の待ち合わせ（polling）を行うコア部分。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（config, status, outcome, events, errors, retry）
//! - **ports**: 抽象化レイヤー（StatusSource, EventSink, Clock）
//! - **app**: アプリケーションロジック（StatusPoller）
//! - **impls**: 実装（GitHub API, GitHub Actions のファイル出力, テスト用の in-memory 実装）

pub mod domain;
pub mod ports;
pub mod app;
pub mod impls;
