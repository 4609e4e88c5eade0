//! The `GraphQLGateway` port: a typed `{data, errors}` request/response cycle
//! against the warehouse's GraphQL endpoint.

use async_trait::async_trait;
use mds_domain::Result;

/// Executes a GraphQL document and returns its `data` field as raw JSON,
/// treating a non-empty `errors` array as a hard failure regardless of
/// whether `data` is also present. Callers deserialize `data` into whatever
/// shape they expect; kept untyped here so the port stays object-safe.
#[async_trait]
pub trait GraphQlGatewayPort: Send + Sync {
    async fn execute(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<serde_json::Value>;
}
