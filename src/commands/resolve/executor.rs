//! Sequential application of the resolve mutation.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::api;
use super::models::{ResolutionOutcome, ResolutionResult, ReviewThread};
use crate::infra::github::GraphQLTransport;

pub const SKIP_NO_COMMENT: &str = "no comment";
pub const MUTATION_NOT_APPLIED: &str = "mutation did not resolve thread";

/// Resolve `threads` one at a time, pausing `delay` after every mutation.
///
/// Failures are recorded and the loop moves on. Once `cancel` fires no new
/// mutation is started; a call already in flight runs to completion and is
/// recorded. The returned list has one entry per thread considered, in order.
pub async fn resolve_all(
    transport: &dyn GraphQLTransport,
    threads: &[&ReviewThread],
    delay: Duration,
    cancel: &CancellationToken,
) -> Vec<ResolutionOutcome> {
    let mut outcomes = Vec::with_capacity(threads.len());

    for thread in threads {
        if cancel.is_cancelled() {
            tracing::warn!(
                remaining = threads.len() - outcomes.len(),
                "interrupted; not resolving remaining conversations"
            );
            break;
        }

        if thread.anchor_comment.is_none() {
            tracing::debug!(thread_id = %thread.id, "skipping thread without comment");
            outcomes.push(ResolutionOutcome::new(
                &thread.id,
                ResolutionResult::Skipped(SKIP_NO_COMMENT.to_string()),
            ));
            continue;
        }

        let result = attempt(transport, thread).await;
        outcomes.push(ResolutionOutcome::new(&thread.id, result));

        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = cancel.cancelled() => {}
        }
    }

    outcomes
}

async fn attempt(transport: &dyn GraphQLTransport, thread: &ReviewThread) -> ResolutionResult {
    tracing::debug!(thread_id = %thread.id, location = %thread.location(), "resolving thread");
    match api::resolve_thread(transport, &thread.id).await {
        Ok(true) => ResolutionResult::Resolved,
        Ok(false) => {
            tracing::warn!(thread_id = %thread.id, "{MUTATION_NOT_APPLIED}");
            ResolutionResult::Failed(MUTATION_NOT_APPLIED.to_string())
        }
        Err(e) => {
            tracing::warn!(
                thread_id = %thread.id,
                retryable = e.is_retryable(),
                error = %e,
                "failed to resolve thread"
            );
            ResolutionResult::Failed(e.to_string())
        }
    }
}
