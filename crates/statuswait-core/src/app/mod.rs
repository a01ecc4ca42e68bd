//! App - アプリケーション層
//!
//! ports を組み合わせて polling の状態遷移を実装します。
//!
//! # 主要コンポーネント
//! - **StatusPoller**: Start → Polling → Resolved(not_found | success | failure)

pub mod poller;

pub use self::poller::StatusPoller;
