//! GraphQL transport over HTTPS using reqwest.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::error::{GitHubError, GraphQLErrorEntry, Result};

pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

const USER_AGENT: &str = concat!("resolve-threads/", env!("CARGO_PKG_VERSION"));

/// Wire shape of every GitHub GraphQL response.
#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphQLErrorEntry>>,
}

/// Executes a single GraphQL request.
///
/// Implementations return the unwrapped `data` value. A response carrying a
/// non-empty top-level `errors[]` must surface as [`GitHubError::Query`],
/// and network or HTTP failures as [`GitHubError::Transport`].
#[async_trait::async_trait]
pub trait GraphQLTransport: Send + Sync {
    async fn execute(&self, query: &str, variables: serde_json::Value)
    -> Result<serde_json::Value>;
}

/// Execute a GraphQL request and decode its `data` into `T`.
pub async fn query<T: DeserializeOwned>(
    transport: &dyn GraphQLTransport,
    query: &str,
    variables: serde_json::Value,
) -> Result<T> {
    let data = transport.execute(query, variables).await?;
    serde_json::from_value(data).map_err(GitHubError::Decode)
}

/// Production transport: one HTTPS POST per call, bearer-token authenticated.
pub struct GitHubClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GitHubClient {
    /// Build a client. `timeout` bounds each request end to end.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(GitHubError::from_reqwest)?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }
}

#[async_trait::async_trait]
impl GraphQLTransport for GitHubClient {
    async fn execute(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(GitHubError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GitHubError::from_status(status, &text));
        }

        let response: GraphQLResponse = response
            .json()
            .await
            .map_err(GitHubError::from_reqwest)?;
        unwrap_response(response)
    }
}

fn unwrap_response(response: GraphQLResponse) -> Result<serde_json::Value> {
    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        return Err(GitHubError::Query(errors));
    }

    match response.data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(GitHubError::Query(vec![GraphQLErrorEntry::new(
            "No data in response",
        )])),
    }
}
