mod api;
mod executor;
mod filter;
mod format;
mod models;
mod target;
#[cfg(test)]
mod testing;

use std::io::{IsTerminal, Write};
use std::time::Duration;

use clap::Args;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::infra::github::{GitHubClient, GitHubError, GraphQLTransport, resolve_token};
use crate::shared::config::Config;

pub use format::{FormatOptions, OutputFormat};
use models::{PullRequestRef, RunSummary};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Pull request {0} not found")]
    NotFound(PullRequestRef),

    #[error("Failed to list review threads")]
    Enumeration(#[source] GitHubError),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Interrupted before any conversation was resolved")]
    Interrupted,

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("Failed to encode JSON report")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write report")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Args, Clone, PartialEq, Eq)]
pub struct ResolveArgs {
    /// PR number or URL (https://github.com/owner/repo/pull/N)
    pub pr: String,

    /// Target repository (owner/repo, or just the name together with --owner)
    #[arg(short = 'R', long = "repo")]
    pub repo: Option<String>,

    /// Repository owner
    #[arg(long)]
    pub owner: Option<String>,

    /// List what would be resolved without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pause between mutations in milliseconds [default: from config, else 100]
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Per-request timeout in seconds [default: from config, else 30]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// GraphQL endpoint, for GitHub Enterprise
    #[arg(long)]
    pub api_url: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub dry_run: bool,
    pub delay: Duration,
    pub output: FormatOptions,
}

/// What a run did, after its report has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// Dry run: the ids a live run would have attempted, in order.
    Preview(Vec<String>),
    Applied(RunSummary),
}

/// Enumerate, filter, then either preview or resolve, writing the report to
/// `writer`.
///
/// Cancellation during enumeration aborts with [`ResolveError::Interrupted`];
/// during resolution it ends the run early with a partial summary.
pub async fn run_with_transport(
    transport: &dyn GraphQLTransport,
    pr: &PullRequestRef,
    options: RunOptions,
    cancel: &CancellationToken,
    writer: &mut dyn Write,
) -> Result<RunReport> {
    let snapshot = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(ResolveError::Interrupted),
        snapshot = api::fetch_review_threads(transport, pr) => snapshot?,
    };
    let unresolved = filter::unresolved_of(&snapshot.threads);
    tracing::info!(
        pr = %pr,
        total = snapshot.threads.len(),
        unresolved = unresolved.len(),
        "enumerated review threads"
    );

    if options.dry_run {
        format::write_dry_run(writer, &snapshot.pr_url, &unresolved, options.output)?;
        return Ok(RunReport::Preview(
            unresolved.iter().map(|t| t.id.clone()).collect(),
        ));
    }

    let outcomes = executor::resolve_all(transport, &unresolved, options.delay, cancel).await;
    let summary = RunSummary::from_outcomes(&outcomes, unresolved.len(), snapshot.pr_url);
    format::write_summary(writer, &summary, &outcomes, &unresolved, options.output)?;

    Ok(RunReport::Applied(summary))
}

impl ResolveArgs {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let api_url = self.api_url.as_deref().unwrap_or(&config.github.api_url);
        let pr = target::resolve_target(
            &self.pr,
            self.owner.as_deref(),
            self.repo.as_deref(),
            api_url,
        )?;
        let token = resolve_token()?;

        let timeout = Duration::from_secs(self.timeout_secs.unwrap_or(config.github.timeout_secs));
        let client = GitHubClient::new(api_url, token, timeout)?;

        let options = RunOptions {
            dry_run: self.dry_run,
            delay: Duration::from_millis(self.delay_ms.unwrap_or(config.resolve.delay_ms)),
            output: FormatOptions {
                format: self.format,
                use_color: use_color(self.no_color),
            },
        };

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if watch_interrupts(tokio::signal::ctrl_c, on_interrupt).await {
                tracing::warn!("received second Ctrl-C; exiting");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        });

        tracing::debug!(pr = %pr, api_url, dry_run = self.dry_run, "starting run");
        let mut stdout = std::io::stdout();
        let report = run_with_transport(&client, &pr, options, &cancel, &mut stdout).await?;
        stdout.flush()?;

        match report {
            RunReport::Preview(ids) => tracing::debug!(count = ids.len(), "dry run finished"),
            RunReport::Applied(summary) if summary.interrupted => {
                tracing::warn!(
                    attempted = summary.resolved_count + summary.failed_count,
                    total = summary.total_unresolved,
                    "run interrupted"
                );
            }
            RunReport::Applied(summary) => tracing::debug!(
                resolved = summary.resolved_count,
                failed = summary.failed_count,
                skipped = summary.skipped_count,
                "run finished"
            ),
        }
        Ok(())
    }
}

/// Exit status after a second Ctrl-C (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Cancel `cancel` on the first interrupt, then wait for another.
///
/// Returns `true` once a second interrupt arrives, `false` if interrupts
/// cannot be received at all.
async fn watch_interrupts<F, Fut>(mut next_interrupt: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = next_interrupt().await {
        tracing::debug!(error = %e, "cannot listen for Ctrl-C");
        return false;
    }
    tracing::warn!("received Ctrl-C; finishing the in-flight request (press again to exit)");
    cancel.cancel();
    next_interrupt().await.is_ok()
}

fn use_color(no_color: bool) -> bool {
    color_enabled(
        no_color,
        std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
        std::io::stdout().is_terminal(),
    )
}

fn color_enabled(no_color_flag: bool, no_color_env: bool, is_terminal: bool) -> bool {
    !no_color_flag && !no_color_env && is_terminal
}
