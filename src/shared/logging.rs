//! Diagnostic logging setup.
//!
//! Logs go to stderr so that stdout carries only the report (which may be
//! JSON consumed by another program).

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "RESOLVE_THREADS_LOG";

/// Install the global tracing subscriber.
///
/// `RESOLVE_THREADS_LOG` takes an `EnvFilter` directive and wins over
/// `verbose`. Calling this twice is harmless; the second call is ignored.
pub fn init(verbose: bool) {
    let filter = build_filter(std::env::var(LOG_ENV).ok().as_deref(), verbose);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_filter(directive: Option<&str>, verbose: bool) -> EnvFilter {
    if let Some(filter) = directive
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
    {
        return filter;
    }
    EnvFilter::new(default_directive(verbose))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "resolve_threads=debug"
    } else {
        "warn"
    }
}
