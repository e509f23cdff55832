//! Test factories and a scripted pull request served over [`FakeTransport`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::api::PAGE_SIZE;
use super::models::{AnchorComment, ReviewThread};
use crate::infra::github::fake::FakeTransport;
use crate::infra::github::{GitHubError, GraphQLErrorEntry};

pub const FAKE_PR_URL: &str = "https://github.com/owner/repo/pull/1";

pub fn make_thread(id: &str, is_resolved: bool) -> ReviewThread {
    make_thread_at(id, is_resolved, Some("src/lib.rs"), Some(1), "reviewer", "Please fix")
}

pub fn make_thread_at(
    id: &str,
    is_resolved: bool,
    path: Option<&str>,
    line: Option<u64>,
    author: &str,
    body: &str,
) -> ReviewThread {
    ReviewThread {
        id: id.to_string(),
        is_resolved,
        anchor_comment: Some(AnchorComment {
            path: path.map(str::to_string),
            line,
            body: body.to_string(),
            author_login: author.to_string(),
        }),
    }
}

pub fn make_thread_without_comment(id: &str, is_resolved: bool) -> ReviewThread {
    ReviewThread {
        id: id.to_string(),
        is_resolved,
        anchor_comment: None,
    }
}

fn thread_to_json(thread: &ReviewThread) -> serde_json::Value {
    let comments: Vec<serde_json::Value> = thread
        .anchor_comment
        .iter()
        .map(|c| {
            json!({
                "path": c.path,
                "line": c.line,
                "body": c.body,
                "author": {"login": c.author_login}
            })
        })
        .collect();
    json!({
        "id": thread.id,
        "isResolved": thread.is_resolved,
        "comments": {"nodes": comments}
    })
}

/// A pull request whose review threads are served page by page, and whose
/// threads really flip to resolved when the mutation succeeds.
#[derive(Default)]
pub struct FakePullRequest {
    threads: Vec<ReviewThread>,
    missing: bool,
    fail_page: Option<usize>,
    failing: HashSet<String>,
    rejected: HashSet<String>,
    ignored: HashSet<String>,
    cancel_on: Option<(String, CancellationToken)>,
}

impl FakePullRequest {
    pub fn new(threads: Vec<ReviewThread>) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }

    /// The repository exists but the pull request does not.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    /// Fail the request for the given 1-based page with a transport error.
    pub fn fail_page(mut self, page: usize) -> Self {
        self.fail_page = Some(page);
        self
    }

    /// Fail the mutation for `id` with a transport error.
    pub fn fail_thread(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Fail the mutation for `id` with a GraphQL `errors[]` response.
    pub fn reject_thread(mut self, id: &str) -> Self {
        self.rejected.insert(id.to_string());
        self
    }

    /// Accept the mutation for `id` but leave the thread unresolved.
    pub fn ignore_thread(mut self, id: &str) -> Self {
        self.ignored.insert(id.to_string());
        self
    }

    /// Cancel `token` while the mutation for `id` is in flight.
    pub fn cancel_on_mutation(mut self, id: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((id.to_string(), token));
        self
    }

    pub fn into_transport(self) -> FakeTransport {
        let state = Arc::new(Mutex::new(self.threads.clone()));
        FakeTransport::new(move |query, variables| {
            if query.trim_start().starts_with("mutation") {
                self.answer_mutation(&state, variables)
            } else {
                self.answer_page(&state, variables)
            }
        })
    }

    fn answer_page(
        &self,
        state: &Mutex<Vec<ReviewThread>>,
        variables: &serde_json::Value,
    ) -> Result<serde_json::Value, GitHubError> {
        if self.missing {
            return Ok(json!({"repository": {"pullRequest": null}}));
        }

        let offset = variables["after"]
            .as_str()
            .and_then(|c| c.strip_prefix("cursor-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        if self.fail_page == Some(offset / PAGE_SIZE + 1) {
            return Err(GitHubError::Transport {
                message: "connection reset by peer".to_string(),
                retryable: true,
            });
        }

        let threads = state.lock().unwrap();
        let end = (offset + PAGE_SIZE).min(threads.len());
        let nodes: Vec<serde_json::Value> = threads[offset.min(end)..end]
            .iter()
            .map(thread_to_json)
            .collect();
        let has_next_page = end < threads.len();

        Ok(json!({
            "repository": {
                "pullRequest": {
                    "id": "PR_fake",
                    "url": FAKE_PR_URL,
                    "reviewThreads": {
                        "pageInfo": {
                            "endCursor": has_next_page.then(|| format!("cursor-{end}")),
                            "hasNextPage": has_next_page
                        },
                        "nodes": nodes
                    }
                }
            }
        }))
    }

    fn answer_mutation(
        &self,
        state: &Mutex<Vec<ReviewThread>>,
        variables: &serde_json::Value,
    ) -> Result<serde_json::Value, GitHubError> {
        let id = variables["threadId"].as_str().unwrap_or_default();

        if let Some((_, token)) = self.cancel_on.as_ref().filter(|(c, _)| c == id) {
            token.cancel();
        }
        if self.failing.contains(id) {
            return Err(GitHubError::Transport {
                message: "connection reset by peer".to_string(),
                retryable: true,
            });
        }
        if self.rejected.contains(id) {
            return Err(GitHubError::Query(vec![GraphQLErrorEntry::new(
                "Resource not accessible by integration",
            )]));
        }

        let resolved = !self.ignored.contains(id);
        if resolved {
            let mut threads = state.lock().unwrap();
            if let Some(thread) = threads.iter_mut().find(|t| t.id == id) {
                thread.is_resolved = true;
            }
        }

        Ok(json!({
            "resolveReviewThread": {
                "thread": {"id": id, "isResolved": resolved}
            }
        }))
    }
}
