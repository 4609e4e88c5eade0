//! The `ScheduleRepo` port: the persistent `(provider, hour)` schedule table.

use async_trait::async_trait;
use mds_domain::{Result, ScheduleBlock};

use crate::graphql_value::GraphQlValue;

/// Query parameters for `ScheduleRepoPort::pending_blocks`, mirroring the
/// scheduler's `fetchPendingSchedules` query filters.
#[derive(Debug, Clone, Default)]
pub struct PendingBlocksQuery {
    pub provider_name: Option<String>,
    pub status_id: Option<i32>,
    pub status_operator: Option<&'static str>,
    pub time_min: Option<i64>,
    pub time_max: Option<i64>,
}

/// Reads and updates rows in the schedule table. Status transitions are
/// enforced by `BlockExecutor`, not by this port.
#[async_trait]
pub trait ScheduleRepoPort: Send + Sync {
    /// Fetches blocks matching `query`, ordered oldest-hour-first.
    async fn pending_blocks(&self, query: PendingBlocksQuery) -> Result<Vec<ScheduleBlock>>;

    /// Fetches a single block by id.
    async fn block_by_id(&self, schedule_id: i64) -> Result<Option<ScheduleBlock>>;

    /// Updates a block's status and any additional columns, returning the
    /// number of affected rows.
    async fn update_status(
        &self,
        schedule_id: i64,
        status_id: i32,
        extra_fields: Vec<(&'static str, GraphQlValue)>,
    ) -> Result<i64>;
}
