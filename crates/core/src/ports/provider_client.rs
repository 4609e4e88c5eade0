//! The `ProviderClient` port: per-MDS-version HTTP access to a provider's
//! `/trips` endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use mds_domain::Result;

/// Raw trips payload fetched from a provider for one `(start_time, end_time)`
/// window, already unwrapped from the version-specific response envelope but
/// not yet validated or enriched.
#[derive(Debug, Clone)]
pub struct ProviderTripsResponse {
    pub mds_version: String,
    pub trips: Vec<serde_json::Value>,
}

/// Speaks one MDS protocol version to one provider's `/trips` endpoint,
/// handling paging, inter-page delay, and timeout/retry internally.
#[async_trait]
pub trait ProviderClientPort: Send + Sync {
    async fn get_trips(
        &self,
        start_time: i64,
        end_time: i64,
        extra_params: HashMap<String, String>,
    ) -> Result<ProviderTripsResponse>;
}
