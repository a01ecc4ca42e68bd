//! EventSink port - 実行ログと構造化出力

use crate::domain::{Outcome, PollEvent, SinkError};

/// Receives the run log and the final outcome.
///
/// - `record`: 1 イベント = 1 行、即時に書き出す（バッファしない）
/// - `publish`: `result=<outcome>` を 1 回だけ書き出す
pub trait EventSink: Send + Sync {
    fn record(&self, event: &PollEvent) -> Result<(), SinkError>;

    fn publish(&self, outcome: Outcome) -> Result<(), SinkError>;
}
