//! `ScheduleRepo`: the persistent `(provider, hour)` schedule table, read and
//! written through the warehouse's GraphQL gateway.
//!
//! Query/mutation bodies are hand-assembled strings rather than a generated
//! client, mirroring the original scheduler's own string-built GraphQL.

use std::sync::Arc;

use async_trait::async_trait;
use mds_core::{GraphQlGatewayPort, GraphQlValue, PendingBlocksQuery, ScheduleRepoPort};
use mds_domain::{MdsError, Result, ScheduleBlock};
use serde::Deserialize;

const TABLE: &str = "api_schedule";

pub struct GraphQlScheduleRepo {
    gateway: Arc<dyn GraphQlGatewayPort>,
}

impl GraphQlScheduleRepo {
    pub fn new(gateway: Arc<dyn GraphQlGatewayPort>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ScheduleRepoPort for GraphQlScheduleRepo {
    async fn pending_blocks(&self, query: PendingBlocksQuery) -> Result<Vec<ScheduleBlock>> {
        let mut predicates = Vec::new();

        if let Some(provider_name) = &query.provider_name {
            predicates.push(format!("provider_name: {{_eq: {}}}", GraphQlValue::Str(provider_name.clone()).render()));
        }
        if let Some(status_id) = query.status_id {
            let op = query.status_operator.unwrap_or("_eq");
            predicates.push(format!("status_id: {{{op}: {}}}", GraphQlValue::Int(status_id as i64).render()));
        }
        if let Some(time_min) = query.time_min {
            predicates.push(format!("date: {{_gt: {}}}", GraphQlValue::Int(time_min).render()));
        }
        if let Some(time_max) = query.time_max {
            predicates.push(format!("date: {{_lte: {}}}", GraphQlValue::Int(time_max).render()));
        }

        let where_clause = if predicates.is_empty() { String::new() } else { format!("where: {{{}}}, ", predicates.join(", ")) };

        let document = format!(
            "query {{ {TABLE}({where_clause}order_by: {{date: asc}}) {{ \
             schedule_id provider_id provider_name year month day hour status_id payload message \
             records_processed records_total records_error_count rerun_flag error_payload }} }}"
        );

        let data = self.gateway.execute(&document, None).await?;
        let rows = data
            .get(TABLE)
            .ok_or_else(|| MdsError::ValidationError(format!("GraphQL response missing {TABLE} field")))?;

        let blocks: Vec<ScheduleBlock> = serde_json::from_value(rows.clone())
            .map_err(|e| MdsError::ValidationError(format!("malformed schedule rows: {e}")))?;
        Ok(blocks)
    }

    async fn block_by_id(&self, schedule_id: i64) -> Result<Option<ScheduleBlock>> {
        let document = format!(
            "query {{ {TABLE}(where: {{schedule_id: {{_eq: {schedule_id}}}}}) {{ \
             schedule_id provider_id provider_name year month day hour status_id payload message \
             records_processed records_total records_error_count rerun_flag error_payload }} }}"
        );

        let data = self.gateway.execute(&document, None).await?;
        let rows = data
            .get(TABLE)
            .ok_or_else(|| MdsError::ValidationError(format!("GraphQL response missing {TABLE} field")))?;

        let mut blocks: Vec<ScheduleBlock> = serde_json::from_value(rows.clone())
            .map_err(|e| MdsError::ValidationError(format!("malformed schedule rows: {e}")))?;
        Ok(blocks.pop())
    }

    async fn update_status(
        &self,
        schedule_id: i64,
        status_id: i32,
        extra_fields: Vec<(&'static str, GraphQlValue)>,
    ) -> Result<i64> {
        let mut set_fields = vec![format!("status_id: {}", GraphQlValue::Int(status_id as i64).render())];
        for (field, value) in &extra_fields {
            set_fields.push(format!("{field}: {}", value.render()));
        }

        let mutation_name = format!("update_{TABLE}");
        let document = format!(
            "mutation {{ {mutation_name}(where: {{schedule_id: {{_eq: {schedule_id}}}}}, \
             _set: {{{}}}) {{ affected_rows }} }}",
            set_fields.join(", ")
        );

        let data = self.gateway.execute(&document, None).await?;

        #[derive(Deserialize)]
        struct AffectedRows {
            affected_rows: i64,
        }

        let result: AffectedRows = data
            .get(&mutation_name)
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e: serde_json::Error| MdsError::ValidationError(format!("malformed mutation response: {e}")))?
            .ok_or_else(|| MdsError::ValidationError(format!("GraphQL response missing {mutation_name} field")))?;

        Ok(result.affected_rows)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use super::*;

    struct MockGateway {
        response: serde_json::Value,
        last_query: Mutex<Option<String>>,
    }

    #[async_trait]
    impl GraphQlGatewayPort for MockGateway {
        async fn execute(&self, query: &str, _variables: Option<serde_json::Value>) -> Result<serde_json::Value> {
            *self.last_query.lock().unwrap() = Some(query.to_string());
            Ok(self.response.clone())
        }
    }

    fn sample_row() -> serde_json::Value {
        serde_json::json!({
            "schedule_id": 1,
            "provider_id": 10,
            "provider_name": "Acme Scooters",
            "year": 2024,
            "month": 3,
            "day": 15,
            "hour": 9,
            "status_id": 0,
            "payload": null,
            "message": null,
            "records_processed": null,
            "records_total": null,
            "records_error_count": null,
            "rerun_flag": false,
            "error_payload": null,
        })
    }

    #[tokio::test]
    async fn pending_blocks_applies_status_and_time_predicates() {
        let gateway =
            Arc::new(MockGateway { response: serde_json::json!({ TABLE: [sample_row()] }), last_query: Mutex::new(None) });
        let repo = GraphQlScheduleRepo::new(gateway.clone());

        let blocks = repo
            .pending_blocks(PendingBlocksQuery {
                status_id: Some(0),
                status_operator: Some("_eq"),
                time_min: Some(100),
                time_max: Some(200),
            })
            .await
            .unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].schedule_id, 1);

        let query = gateway.last_query.lock().unwrap().clone().unwrap();
        assert!(query.contains("status_id: {_eq: 0}"));
        assert!(query.contains("date: {_gt: 100}"));
        assert!(query.contains("date: {_lte: 200}"));
    }

    #[tokio::test]
    async fn update_status_renders_extra_fields_and_parses_affected_rows() {
        let gateway = Arc::new(MockGateway {
            response: serde_json::json!({ "update_api_schedule": { "affected_rows": 1 } }),
            last_query: Mutex::new(None),
        });
        let repo = GraphQlScheduleRepo::new(gateway.clone());

        let affected = repo
            .update_status(
                1,
                2,
                vec![("payload", GraphQlValue::Str("s3://bucket/key".into())), ("records_total", GraphQlValue::Int(42))],
            )
            .await
            .unwrap();

        assert_eq!(affected, 1);
        let query = gateway.last_query.lock().unwrap().clone().unwrap();
        assert!(query.contains("payload: \"s3://bucket/key\""));
        assert!(query.contains("records_total: 42"));
    }
}
