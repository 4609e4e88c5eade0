//! The `SocrataSink` port: the public-facing Socrata open-data dataset.

use async_trait::async_trait;
use mds_domain::Result;

/// Result of a Socrata upsert call.
#[derive(Debug, Clone, Default)]
pub struct SocrataUpsertResult {
    pub rows_created: i64,
    pub rows_updated: i64,
    pub errors: Vec<String>,
}

/// Publishes aggregated trip rows to the public Socrata dataset.
#[async_trait]
pub trait SocrataSinkPort: Send + Sync {
    /// Fetches rows already published in `[time_min, time_max)` from the
    /// warehouse, projected to the Socrata schema.
    async fn fetch_rows(&self, time_min: &str, time_max: &str) -> Result<Vec<serde_json::Value>>;

    /// Upserts `rows` into the Socrata dataset.
    async fn upsert(&self, rows: Vec<serde_json::Value>) -> Result<SocrataUpsertResult>;
}
