//! wiremock-based GitHub GraphQL mock server for testing.
//!
//! Provides `GitHubMockServer` for HTTP-level mocking of the GraphQL
//! endpoint. Queries and mutations share one URL, so mocks are told apart
//! by matching on the request body.
//!
//! # Usage
//!
//! ```ignore
//! let mock = GitHubMockServer::start().await;
//! mock.review_threads_page(None, &[thread_json("T_1", false)], None).await;
//! mock.resolve_thread("T_1", true).await;
//! let client = mock.client();
//! ```

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::client::GitHubClient;

/// Build a review thread node as GitHub returns it.
pub fn thread_json(id: &str, is_resolved: bool) -> serde_json::Value {
    json!({
        "id": id,
        "isResolved": is_resolved,
        "comments": {
            "nodes": [{
                "path": "src/lib.rs",
                "line": 1,
                "body": format!("comment on {id}"),
                "author": {"login": "reviewer"}
            }]
        }
    })
}

pub struct GitHubMockServer {
    server: MockServer,
}

impl GitHubMockServer {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.server.uri())
    }

    /// Get a GitHubClient configured to use this mock server.
    pub fn client(&self) -> GitHubClient {
        self.client_with_timeout(Duration::from_secs(5))
    }

    pub fn client_with_timeout(&self, timeout: Duration) -> GitHubClient {
        GitHubClient::new(self.graphql_url(), "test-token", timeout).unwrap()
    }

    /// Mock a single page of the review threads query.
    ///
    /// `after` selects which request this page answers: `None` matches the
    /// first request, `Some(cursor)` matches the request for that cursor.
    /// A page whose `next_cursor` is `Some` reports `hasNextPage: true`.
    pub async fn review_threads_page(
        &self,
        after: Option<&str>,
        nodes: &[serde_json::Value],
        next_cursor: Option<&str>,
    ) {
        let body = json!({
            "data": {
                "repository": {
                    "pullRequest": {
                        "id": "PR_test",
                        "url": "https://github.com/owner/repo/pull/1",
                        "reviewThreads": {
                            "pageInfo": {
                                "endCursor": next_cursor,
                                "hasNextPage": next_cursor.is_some()
                            },
                            "nodes": nodes
                        }
                    }
                }
            }
        });

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("reviewThreads"))
            .and(body_partial_json(json!({"variables": {"after": after}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Mock the resolve mutation for one thread id.
    pub async fn resolve_thread(&self, thread_id: &str, is_resolved: bool) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("resolveReviewThread"))
            .and(body_partial_json(json!({"variables": {"threadId": thread_id}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "resolveReviewThread": {
                        "thread": {"id": thread_id, "isResolved": is_resolved}
                    }
                }
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Mock a GraphQL response carrying only `errors[]`.
    pub async fn graphql_errors(&self, errors: &[(&str, Option<&str>)]) {
        let errors: Vec<serde_json::Value> = errors
            .iter()
            .map(|(message, kind)| json!({"message": message, "type": kind}))
            .collect();

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": null, "errors": errors})),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock every request with a bare HTTP status.
    pub async fn http_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}
