//! `SocrataSink`: reads rows destined for the open-data portal out of the
//! warehouse through the GraphQL gateway, then upserts them to Socrata's SODA2
//! REST API directly — there is no maintained Rust Socrata client, so this
//! talks to the documented HTTP upsert endpoint with the shared [`HttpClient`].

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use mds_core::{GraphQlGatewayPort, SocrataSinkPort, SocrataUpsertResult};
use mds_domain::{MdsError, Result};
use reqwest::Method;
use serde::Deserialize;

use crate::http::HttpClient;

const TRIPS_QUERY_FIELDS: &str = "trip_id device_id vehicle_type trip_duration trip_distance start_time end_time \
     modified_date council_district_start council_district_end census_geoid_start census_geoid_end";

pub struct GraphQlSocrataSink {
    http: HttpClient,
    gateway: Arc<dyn GraphQlGatewayPort>,
    data_endpoint: String,
    dataset: String,
    app_token: String,
    key_id: String,
    key_secret: String,
}

impl GraphQlSocrataSink {
    pub fn new(
        http: HttpClient,
        gateway: Arc<dyn GraphQlGatewayPort>,
        data_endpoint: impl Into<String>,
        dataset: impl Into<String>,
        app_token: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            gateway,
            data_endpoint: data_endpoint.into(),
            dataset: dataset.into(),
            app_token: app_token.into(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    fn upsert_url(&self) -> String {
        format!("{}/resource/{}.json", self.data_endpoint.trim_end_matches('/'), self.dataset)
    }
}

#[async_trait]
impl SocrataSinkPort for GraphQlSocrataSink {
    async fn fetch_rows(&self, time_min: &str, time_max: &str) -> Result<Vec<serde_json::Value>> {
        let document = format!(
            "query getTrips {{ api_trips(where: {{end_time: {{_gte: \"{time_min}\"}}, \
             _and: {{start_time: {{_lt: \"{time_max}\"}}}}}}) {{ {TRIPS_QUERY_FIELDS} }} }}"
        );

        let data = self.gateway.execute(&document, None).await?;
        let rows = data
            .get("api_trips")
            .ok_or_else(|| MdsError::ValidationError("GraphQL response missing api_trips field".into()))?;

        let rows: Vec<serde_json::Value> = serde_json::from_value(rows.clone())
            .map_err(|e| MdsError::ValidationError(format!("malformed socrata source rows: {e}")))?;
        Ok(rows)
    }

    async fn upsert(&self, rows: Vec<serde_json::Value>) -> Result<SocrataUpsertResult> {
        let encoded = BASE64.encode(format!("{}:{}", self.key_id, self.key_secret));

        let request = self
            .http
            .request(Method::POST, self.upsert_url())
            .header("Authorization", format!("Basic {encoded}"))
            .header("X-App-Token", &self.app_token)
            .json(&rows);

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MdsError::Transport(format!("Socrata upsert returned HTTP {status}: {body}")));
        }

        #[derive(Deserialize)]
        struct UpsertResponse {
            #[serde(rename = "Rows Created", default)]
            rows_created: i64,
            #[serde(rename = "Rows Updated", default)]
            rows_updated: i64,
            #[serde(default)]
            errors: Vec<serde_json::Value>,
        }

        let body: UpsertResponse =
            response.json().await.map_err(|e| MdsError::ValidationError(format!("malformed Socrata response: {e}")))?;

        Ok(SocrataUpsertResult {
            rows_created: body.rows_created,
            rows_updated: body.rows_updated,
            errors: body.errors.into_iter().map(|v| v.to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct MockGateway {
        response: serde_json::Value,
    }

    #[async_trait]
    impl GraphQlGatewayPort for MockGateway {
        async fn execute(&self, _query: &str, _variables: Option<serde_json::Value>) -> Result<serde_json::Value> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn fetch_rows_parses_api_trips_array() {
        let gateway = Arc::new(MockGateway {
            response: serde_json::json!({ "api_trips": [{ "trip_id": "abc", "device_id": "def" }] }),
        });
        let sink = GraphQlSocrataSink::new(
            HttpClient::new().unwrap(),
            gateway,
            "https://data.example.gov",
            "abcd-1234",
            "token",
            "key",
            "secret",
        );

        let rows = sink.fetch_rows("2024-03-15T09:00:00", "2024-03-15T10:00:00").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["trip_id"], "abc");
    }

    #[tokio::test]
    async fn upsert_url_targets_the_soda2_resource_endpoint() {
        let gateway = Arc::new(MockGateway { response: serde_json::json!({}) });
        let sink = GraphQlSocrataSink::new(
            HttpClient::new().unwrap(),
            gateway,
            "https://data.example.gov/",
            "abcd-1234",
            "token",
            "key",
            "secret",
        );

        assert_eq!(sink.upsert_url(), "https://data.example.gov/resource/abcd-1234.json");
    }
}
