//! `GraphQLGateway`: a typed `{data, errors}` HTTP client against the
//! warehouse's GraphQL endpoint. No retry at this layer — retry belongs to
//! `ProviderClient` and to block-level reruns driven by `rerun_flag`.

use async_trait::async_trait;
use mds_core::GraphQlGatewayPort;
use mds_domain::{MdsError, Result};
use reqwest::Method;
use serde::Deserialize;

use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Executes GraphQL documents against the warehouse endpoint, authenticating
/// with a static admin secret header.
pub struct HttpGraphQlGateway {
    http: HttpClient,
    endpoint: String,
    admin_secret: String,
}

impl HttpGraphQlGateway {
    pub fn new(http: HttpClient, endpoint: impl Into<String>, admin_secret: impl Into<String>) -> Self {
        Self { http, endpoint: endpoint.into(), admin_secret: admin_secret.into() }
    }
}

#[async_trait]
impl GraphQlGatewayPort for HttpGraphQlGateway {
    async fn execute(&self, query: &str, variables: Option<serde_json::Value>) -> Result<serde_json::Value> {
        let mut body = serde_json::json!({ "query": query });
        if let Some(vars) = variables {
            body["variables"] = vars;
        }

        let request = self
            .http
            .request(Method::POST, &self.endpoint)
            .header("X-Hasura-Admin-Secret", &self.admin_secret)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&body);

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MdsError::Transport(format!("GraphQL gateway returned HTTP {status}: {text}")));
        }

        let envelope: GraphQlEnvelope =
            response.json().await.map_err(|e| MdsError::ValidationError(format!("malformed GraphQL response: {e}")))?;

        if let Some(errors) = envelope.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(MdsError::ValidationError(format!("GraphQL errors: {}", messages.join("; "))));
        }

        envelope.data.ok_or_else(|| MdsError::ValidationError("GraphQL response missing data field".into()))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn returns_data_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .and(header("X-Hasura-Admin-Secret", "shh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "affected_rows": 1 }
            })))
            .mount(&server)
            .await;

        let gateway =
            HttpGraphQlGateway::new(HttpClient::new().unwrap(), format!("{}/v1/graphql", server.uri()), "shh");

        let data = gateway.execute("query { noop }", None).await.unwrap();
        assert_eq!(data["affected_rows"], 1);
    }

    #[tokio::test]
    async fn surfaces_graphql_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errors": [{ "message": "field not found" }]
            })))
            .mount(&server)
            .await;

        let gateway = HttpGraphQlGateway::new(HttpClient::new().unwrap(), server.uri(), "shh");
        let err = gateway.execute("query { noop }", None).await.unwrap_err();
        assert!(matches!(err, MdsError::ValidationError(_)));
    }
}
