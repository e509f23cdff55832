use std::fmt;

use serde::Serialize;

/// Identity of the pull request a run targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }

    /// Web URL of the pull request on github.com.
    pub fn url(&self) -> String {
        format!(
            "https://github.com/{}/{}/pull/{}",
            self.owner, self.repo, self.number
        )
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// The first comment of a review thread. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorComment {
    pub path: Option<String>,
    /// `None` for comments that are not attached to a diff line.
    pub line: Option<u64>,
    pub body: String,
    pub author_login: String,
}

impl AnchorComment {
    /// `path:line`, `path`, or a placeholder for PR-level conversations.
    pub fn location(&self) -> String {
        match (&self.path, self.line) {
            (Some(path), Some(line)) => format!("{path}:{line}"),
            (Some(path), None) => path.clone(),
            (None, _) => "(pull request)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewThread {
    /// Opaque GraphQL node id, e.g. `PRRT_kwDO...`.
    pub id: String,
    pub is_resolved: bool,
    /// Absent when every comment in the thread was deleted.
    pub anchor_comment: Option<AnchorComment>,
}

impl ReviewThread {
    pub fn location(&self) -> String {
        self.anchor_comment
            .as_ref()
            .map(AnchorComment::location)
            .unwrap_or_else(|| self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    Resolved,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOutcome {
    pub thread_id: String,
    pub result: ResolutionResult,
}

impl ResolutionOutcome {
    pub fn new(thread_id: impl Into<String>, result: ResolutionResult) -> Self {
        Self {
            thread_id: thread_id.into(),
            result,
        }
    }
}

/// Tally of a live run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    #[serde(rename = "resolved")]
    pub resolved_count: usize,
    #[serde(rename = "failed")]
    pub failed_count: usize,
    #[serde(rename = "skipped")]
    pub skipped_count: usize,
    pub total_unresolved: usize,
    pub pr_url: String,
    /// True when the run stopped before every unresolved thread was considered.
    pub interrupted: bool,
}

impl RunSummary {
    /// Fold outcomes into counts. `total_unresolved` is the size of the
    /// filtered list the run started from.
    pub fn from_outcomes(
        outcomes: &[ResolutionOutcome],
        total_unresolved: usize,
        pr_url: impl Into<String>,
    ) -> Self {
        let (resolved_count, failed_count, skipped_count) =
            outcomes
                .iter()
                .fold((0, 0, 0), |(resolved, failed, skipped), outcome| {
                    match outcome.result {
                        ResolutionResult::Resolved => (resolved + 1, failed, skipped),
                        ResolutionResult::Failed(_) => (resolved, failed + 1, skipped),
                        ResolutionResult::Skipped(_) => (resolved, failed, skipped + 1),
                    }
                });

        Self {
            resolved_count,
            failed_count,
            skipped_count,
            total_unresolved,
            pr_url: pr_url.into(),
            interrupted: outcomes.len() < total_unresolved,
        }
    }
}
