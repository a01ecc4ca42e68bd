//! StatusSource port - 参照（commit）ごとの status 一覧を取得

use async_trait::async_trait;

use crate::domain::{SourceError, StatusRecord};

/// Read-only query-by-reference endpoint.
///
/// Entries are expected most-recent-first; the poller only reads the first one.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch every status entry recorded against `reference`.
    async fn fetch(&self, reference: &str) -> Result<Vec<StatusRecord>, SourceError>;

    /// Human-readable location queried for `reference` (used in the run log).
    fn endpoint(&self, reference: &str) -> String;
}
