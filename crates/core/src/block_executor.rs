//! `BlockExecutor`: the pure three-stage state machine that advances one
//! `(provider, hour)` schedule block through Extract, DB-Sync, and
//! Socrata-Sync. Holds only port trait objects — no concrete I/O lives here.

use std::sync::Arc;

use chrono_tz::Tz;
use mds_domain::{MdsError, ProviderProfile, Result, ScheduleBlock, ScheduleStatus, Trip};
use tracing::{info, warn};

use crate::graphql_value::GraphQlValue;
use crate::ports::{
    GeoEnricherPort, GraphQlGatewayPort, ObjectStorePort, ProviderClientPort, ScheduleRepoPort,
};
use crate::trip_model;

/// Outcome of a single stage transition: the block's new status and, for
/// DB-Sync, how many trip rows succeeded versus failed.
#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub status_id: i32,
    pub records_processed: i64,
    pub records_total: i64,
    pub records_error_count: i64,
}

/// Advances one schedule block through the pipeline's three stages.
pub struct BlockExecutor {
    object_store: Arc<dyn ObjectStorePort>,
    schedule_repo: Arc<dyn ScheduleRepoPort>,
    graphql_gateway: Arc<dyn GraphQlGatewayPort>,
    geo_enricher: Arc<dyn GeoEnricherPort>,
    zone: Tz,
    /// Object-key stage prefix (`"staging"` or `"processed"`), sourced from
    /// the run mode rather than hardcoded, so blobs land in the right
    /// partition for the environment the process is running in.
    stage: String,
}

impl BlockExecutor {
    pub fn new(
        object_store: Arc<dyn ObjectStorePort>,
        schedule_repo: Arc<dyn ScheduleRepoPort>,
        graphql_gateway: Arc<dyn GraphQlGatewayPort>,
        geo_enricher: Arc<dyn GeoEnricherPort>,
        zone: Tz,
        stage: impl Into<String>,
    ) -> Self {
        Self { object_store, schedule_repo, graphql_gateway, geo_enricher, zone, stage: stage.into() }
    }

    /// Extract: fetches trips for the block's hour from `provider`, stages
    /// the raw payload in the object store, and moves the block from `NEW`
    /// to `EXTRACTED`.
    pub async fn extract(
        &self,
        block: &ScheduleBlock,
        profile: &ProviderProfile,
        provider_client: &dyn ProviderClientPort,
        force: bool,
    ) -> Result<StageOutcome> {
        if !force && block.status_id != ScheduleStatus::NEW {
            return Err(MdsError::ValidationError(format!(
                "block {} is not eligible for extract (status {})",
                block.schedule_id, block.status_id
            )));
        }

        let (start_time, end_time) = self.hour_window(block.year, block.month, block.day, block.hour);
        let response = provider_client.get_trips(start_time, end_time, Default::default()).await?;

        let key = mds_domain::data_path(
            &self.stage,
            &block.provider_name.to_lowercase(),
            block.year,
            block.month,
            block.day,
            block.hour,
        );
        let body = serde_json::to_vec(&response.trips)
            .map_err(|e| MdsError::Internal(format!("failed to serialize staged trips: {e}")))?;
        self.object_store.put(&key, body, true).await?;

        let new_status = ScheduleStatus::EXTRACTED;
        let extra = vec![("payload", GraphQlValue::Str(key))];
        self.schedule_repo.update_status(block.schedule_id, new_status, extra).await?;

        info!(schedule_id = block.schedule_id, provider = %profile.name, trips = response.trips.len(), "extract complete");

        Ok(StageOutcome {
            status_id: new_status,
            records_processed: response.trips.len() as i64,
            records_total: response.trips.len() as i64,
            records_error_count: 0,
        })
    }

    /// DB-Sync: reads the staged payload back, validates and enriches each
    /// trip, and upserts it into the warehouse one row at a time, tallying
    /// successes and failures into the block's terminal status.
    pub async fn db_sync(&self, block: &ScheduleBlock, force: bool) -> Result<StageOutcome> {
        if !force && block.status_id != ScheduleStatus::EXTRACTED {
            return Err(MdsError::ValidationError(format!(
                "block {} is not eligible for db-sync (status {})",
                block.schedule_id, block.status_id
            )));
        }

        let key = block
            .payload
            .clone()
            .ok_or_else(|| MdsError::ValidationError("extracted block is missing its payload key".into()))?;
        let staged = self.object_store.get(&key).await;
        let raw_trips: Vec<serde_json::Value> = staged.as_array().cloned().unwrap_or_default();

        let total = raw_trips.len() as i64;
        if total == 0 {
            self.schedule_repo.update_status(block.schedule_id, ScheduleStatus::DB_SYNC_EMPTY, vec![]).await?;
            return Ok(StageOutcome {
                status_id: ScheduleStatus::DB_SYNC_EMPTY,
                records_processed: 0,
                records_total: 0,
                records_error_count: 0,
            });
        }

        let mut success = 0i64;
        let mut failures: Vec<serde_json::Value> = Vec::new();

        for raw in raw_trips {
            match self.sync_one_trip(raw).await {
                Ok(()) => success += 1,
                Err(e) => failures.push(serde_json::json!({ "error": e.to_string() })),
            }
        }

        let error_count = failures.len() as i64;
        let status_id = match (success, error_count) {
            (s, 0) if s == total => ScheduleStatus::DB_SYNC_OK,
            (0, e) if e == total => ScheduleStatus::DB_SYNC_ALL_FAIL,
            _ => ScheduleStatus::DB_SYNC_PARTIAL,
        };

        let extra = vec![
            ("records_processed", GraphQlValue::Int(success)),
            ("records_total", GraphQlValue::Int(total)),
            ("records_error_count", GraphQlValue::Int(error_count)),
            ("error_payload", GraphQlValue::Raw(serde_json::to_string(&failures).unwrap_or_default())),
        ];
        self.schedule_repo.update_status(block.schedule_id, status_id, extra).await?;

        if error_count > 0 {
            warn!(schedule_id = block.schedule_id, error_count, total, "db-sync completed with errors");
        }

        Ok(StageOutcome { status_id, records_processed: success, records_total: total, records_error_count: error_count })
    }

    async fn sync_one_trip(&self, raw: serde_json::Value) -> Result<()> {
        let mut trip: Trip = serde_json::from_value(raw)
            .map_err(|e| MdsError::ValidationError(format!("malformed trip payload: {e}")))?;

        let errors = trip_model::validate(&trip);
        if !errors.is_ok() {
            return Err(MdsError::ValidationError(errors.0.join("; ")));
        }

        trip_model::default_optional_fields(&mut trip);
        trip_model::enrich(&mut trip, self.geo_enricher.as_ref());

        let mutation = trip_model::render_insert_mutation(&trip, self.zone)?;
        let data = self.graphql_gateway.execute(&mutation, None).await?;

        let affected_rows =
            data.get("insert_api_trips").and_then(|v| v.get("affected_rows")).and_then(|v| v.as_i64()).unwrap_or(0);

        if affected_rows > 0 {
            Ok(())
        } else {
            Err(MdsError::ValidationError("insert_api_trips affected_rows was not greater than zero".into()))
        }
    }

    /// Socrata-Sync: fetches the hour's upserted warehouse rows and
    /// publishes them to the public dataset. Only eligible once DB-Sync has
    /// produced at least one successful row.
    pub async fn socrata_sync(
        &self,
        block: &ScheduleBlock,
        socrata: &dyn crate::ports::SocrataSinkPort,
    ) -> Result<StageOutcome> {
        if !ScheduleStatus::is_socrata_eligible(block.status_id) {
            return Err(MdsError::ValidationError(format!(
                "block {} is not eligible for socrata-sync (status {})",
                block.schedule_id, block.status_id
            )));
        }

        let (time_min, time_max) = self.hour_window(block.year, block.month, block.day, block.hour);
        let rows = socrata.fetch_rows(&time_min.to_string(), &time_max.to_string()).await?;
        let row_count = rows.len() as i64;
        let rows: Vec<serde_json::Value> =
            rows.iter().map(|row| trip_model::normalize_socrata_row(row, self.zone)).collect();

        let result = socrata.upsert(rows).await;
        let status_id = match &result {
            Ok(outcome) if outcome.errors.is_empty() => ScheduleStatus::SOCRATA_OK,
            _ => ScheduleStatus::SOCRATA_FAIL,
        };

        let message = result.as_ref().err().map(std::string::ToString::to_string);
        let extra = match &message {
            Some(m) => vec![("message", GraphQlValue::Str(m.clone()))],
            None => vec![],
        };
        self.schedule_repo.update_status(block.schedule_id, status_id, extra).await?;

        Ok(StageOutcome { status_id, records_processed: row_count, records_total: row_count, records_error_count: 0 })
    }

    /// The `[start, end)` UNIX-epoch-second window a schedule block's
    /// `(year, month, day, hour)` addresses, interpreting those fields as
    /// civil time in `self.zone` (the schedule table stores civil time, not
    /// UTC) before converting to epoch seconds.
    fn hour_window(&self, year: i32, month: u32, day: u32, hour: u32) -> (i64, i64) {
        use chrono::TimeZone;
        let start =
            self.zone.with_ymd_and_hms(year, month, day, hour, 0, 0).single().map(|d| d.timestamp()).unwrap_or(0);
        (start, start + 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use mds_domain::GeoLayer;

    struct NullObjectStore;
    #[async_trait]
    impl ObjectStorePort for NullObjectStore {
        async fn put(&self, _key: &str, _body: Vec<u8>, _encrypt: bool) -> Result<Option<String>> {
            Ok(None)
        }
        async fn get(&self, _key: &str) -> serde_json::Value {
            serde_json::json!({})
        }
        async fn list_versions(&self, _key: &str) -> Result<Vec<String>> {
            Ok(vec![])
        }
        async fn delete_all_versions(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    struct NullScheduleRepo;
    #[async_trait]
    impl ScheduleRepoPort for NullScheduleRepo {
        async fn pending_blocks(&self, _query: crate::ports::PendingBlocksQuery) -> Result<Vec<ScheduleBlock>> {
            Ok(vec![])
        }
        async fn block_by_id(&self, _schedule_id: i64) -> Result<Option<ScheduleBlock>> {
            Ok(None)
        }
        async fn update_status(
            &self,
            _schedule_id: i64,
            _new_status_id: i32,
            _extra_fields: Vec<(&'static str, GraphQlValue)>,
        ) -> Result<i64> {
            Ok(0)
        }
    }

    struct NullGraphQlGateway;
    #[async_trait]
    impl GraphQlGatewayPort for NullGraphQlGateway {
        async fn execute(&self, _query: &str, _variables: Option<serde_json::Value>) -> Result<serde_json::Value> {
            Ok(serde_json::json!({}))
        }
    }

    struct NullGeoEnricher;
    impl GeoEnricherPort for NullGeoEnricher {
        fn lookup(&self, _longitude: f64, _latitude: f64, _layer: GeoLayer) -> Option<String> {
            None
        }
    }

    fn test_executor(zone: Tz) -> BlockExecutor {
        BlockExecutor::new(Arc::new(NullObjectStore), Arc::new(NullScheduleRepo), Arc::new(NullGraphQlGateway), Arc::new(NullGeoEnricher), zone, "staging")
    }

    #[test]
    fn hour_window_spans_one_hour() {
        let executor = test_executor(chrono_tz::UTC);
        let (start, end) = executor.hour_window(2020, 1, 1, 1);
        assert_eq!(end - start, 3600);
    }

    #[test]
    fn hour_window_converts_central_civil_time_to_utc() {
        let utc_executor = test_executor(chrono_tz::UTC);
        let central_executor = test_executor(chrono_tz::US::Central);

        let (utc_start, _) = utc_executor.hour_window(2020, 7, 1, 12);
        let (central_start, _) = central_executor.hour_window(2020, 7, 1, 12);

        // US/Central is UTC-5 during daylight saving, so the same civil hour
        // resolves to a later UTC instant.
        assert_eq!(central_start - utc_start, 5 * 3600);
    }
}
