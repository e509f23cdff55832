use std::collections::HashSet;

use indoc::indoc;
use serde::Deserialize;
use serde_json::json;

use super::models::{AnchorComment, PullRequestRef, ReviewThread};
use super::{ResolveError, Result};
use crate::infra::github::{self, GitHubError, GraphQLErrorEntry, GraphQLTransport};

pub const PAGE_SIZE: usize = 100;

// Only the first comment of each thread is fetched; it is used for display.
const REVIEW_THREADS_QUERY: &str = indoc! {"
    query($owner: String!, $name: String!, $number: Int!, $first: Int!, $after: String) {
      repository(owner: $owner, name: $name) {
        pullRequest(number: $number) {
          id
          url
          reviewThreads(first: $first, after: $after) {
            pageInfo {
              endCursor
              hasNextPage
            }
            nodes {
              id
              isResolved
              comments(first: 1) {
                nodes {
                  path
                  line
                  body
                  author { login }
                }
              }
            }
          }
        }
      }
    }
"};

const RESOLVE_THREAD_MUTATION: &str = indoc! {"
    mutation($threadId: ID!) {
      resolveReviewThread(input: { threadId: $threadId }) {
        thread {
          id
          isResolved
        }
      }
    }
"};

#[derive(Debug, Deserialize)]
struct ThreadsData {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repository {
    pull_request: Option<PullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequest {
    url: Option<String>,
    review_threads: PagedThreads,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PagedThreads {
    page_info: PageInfo,
    nodes: Vec<ThreadNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadNode {
    id: String,
    is_resolved: bool,
    comments: CommentsNode,
}

#[derive(Debug, Deserialize)]
struct CommentsNode {
    nodes: Vec<CommentNode>,
}

#[derive(Debug, Deserialize)]
struct CommentNode {
    path: Option<String>,
    line: Option<u64>,
    body: String,
    author: Option<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    login: String,
}

impl From<ThreadNode> for ReviewThread {
    fn from(node: ThreadNode) -> Self {
        let anchor_comment = node
            .comments
            .nodes
            .into_iter()
            .next()
            .map(|c| AnchorComment {
                path: c.path,
                line: c.line,
                body: c.body,
                // Deleted accounts come back as a null author.
                author_login: c.author.map_or_else(|| "ghost".to_string(), |a| a.login),
            });
        Self {
            id: node.id,
            is_resolved: node.is_resolved,
            anchor_comment,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveData {
    resolve_review_thread: Option<ResolvePayload>,
}

#[derive(Debug, Deserialize)]
struct ResolvePayload {
    thread: Option<ThreadState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadState {
    is_resolved: bool,
}

/// Every review thread of one PR, read in a single pass.
#[derive(Debug, Clone)]
pub struct ThreadSnapshot {
    pub pr_url: String,
    pub threads: Vec<ReviewThread>,
}

/// Cursor over the `reviewThreads` connection.
#[derive(Debug, Default)]
struct PageCursor {
    token: Option<String>,
    done: bool,
}

impl PageCursor {
    fn advance(&mut self, page_info: PageInfo) -> std::result::Result<(), GitHubError> {
        if !page_info.has_next_page {
            self.done = true;
            return Ok(());
        }
        match page_info.end_cursor {
            Some(cursor) => {
                self.token = Some(cursor);
                Ok(())
            }
            None => Err(GitHubError::Query(vec![GraphQLErrorEntry::new(
                "hasNextPage is true but endCursor is null",
            )])),
        }
    }
}

/// Fetch every review thread of `pr`, following pagination to the end.
///
/// Any failure here is fatal for the run: a partially enumerated thread set
/// would silently under-resolve.
pub async fn fetch_review_threads(
    transport: &dyn GraphQLTransport,
    pr: &PullRequestRef,
) -> Result<ThreadSnapshot> {
    let mut threads: Vec<ReviewThread> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut pr_url: Option<String> = None;
    let mut cursor = PageCursor::default();
    let mut page = 0usize;

    while !cursor.done {
        page += 1;
        let variables = json!({
            "owner": pr.owner,
            "name": pr.repo,
            "number": pr.number,
            "first": PAGE_SIZE,
            "after": cursor.token,
        });

        let data: ThreadsData = github::query(transport, REVIEW_THREADS_QUERY, variables)
            .await
            .map_err(|e| enumeration_error(e, pr))?;

        let pull_request = data
            .repository
            .and_then(|r| r.pull_request)
            .ok_or_else(|| ResolveError::NotFound(pr.clone()))?;

        let PagedThreads { page_info, nodes } = pull_request.review_threads;
        tracing::debug!(
            pr = %pr,
            page,
            count = nodes.len(),
            has_next_page = page_info.has_next_page,
            "fetched review threads page"
        );

        pr_url = pr_url.or(pull_request.url);
        threads.extend(
            nodes
                .into_iter()
                .filter(|node| seen.insert(node.id.clone()))
                .map(ReviewThread::from),
        );
        cursor
            .advance(page_info)
            .map_err(ResolveError::Enumeration)?;
    }

    Ok(ThreadSnapshot {
        pr_url: pr_url.unwrap_or_else(|| pr.url()),
        threads,
    })
}

fn enumeration_error(err: GitHubError, pr: &PullRequestRef) -> ResolveError {
    if err.is_not_found() {
        ResolveError::NotFound(pr.clone())
    } else {
        ResolveError::Enumeration(err)
    }
}

/// Issue the resolve mutation for one thread.
///
/// Returns the thread's `isResolved` as reported after the mutation; a null
/// payload counts as not resolved.
pub async fn resolve_thread(
    transport: &dyn GraphQLTransport,
    thread_id: &str,
) -> std::result::Result<bool, GitHubError> {
    let data: ResolveData = github::query(
        transport,
        RESOLVE_THREAD_MUTATION,
        json!({ "threadId": thread_id }),
    )
    .await?;

    Ok(data
        .resolve_review_thread
        .and_then(|payload| payload.thread)
        .is_some_and(|thread| thread.is_resolved))
}
