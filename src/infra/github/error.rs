//! GitHub API error types.

use serde::Deserialize;
use thiserror::Error;

/// One entry of the top-level `errors[]` array in a GraphQL response.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GraphQLErrorEntry {
    pub message: String,
    /// GitHub's error classification, e.g. `NOT_FOUND` or `FORBIDDEN`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl GraphQLErrorEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("Failed to get GitHub token: {0}")]
    TokenError(String),

    /// Network or HTTP failure. `retryable` is informational only; nothing
    /// in this crate retries.
    #[error("GitHub request failed: {message}")]
    Transport { message: String, retryable: bool },

    #[error("GraphQL error: {}", format_query_errors(.0))]
    Query(Vec<GraphQLErrorEntry>),

    #[error("Unexpected GraphQL response shape: {0}")]
    Decode(serde_json::Error),
}

impl GitHubError {
    /// Whether GitHub reported that the requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Query(errors) => errors
                .iter()
                .any(|e| e.kind.as_deref() == Some("NOT_FOUND")),
            _ => false,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { retryable: true, .. })
    }

    /// Classify a reqwest failure. Timeouts and connection problems are
    /// reported as retryable.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        let retryable = err.is_timeout() || err.is_connect();
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        };
        Self::Transport { message, retryable }
    }

    /// Build a transport error from a non-success HTTP status.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let retryable =
            status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS;
        let detail = body.trim();
        let message = if detail.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            format!("HTTP {}: {}", status.as_u16(), truncate_detail(detail))
        };
        Self::Transport { message, retryable }
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

fn format_query_errors(errors: &[GraphQLErrorEntry]) -> String {
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    messages.join(", ")
}

/// HTTP error bodies can be whole HTML pages; keep the first line only.
fn truncate_detail(detail: &str) -> String {
    const MAX_CHARS: usize = 200;
    let first_line = detail.lines().next().unwrap_or_default();
    if first_line.chars().count() > MAX_CHARS {
        let truncated: String = first_line.chars().take(MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        first_line.to_string()
    }
}
