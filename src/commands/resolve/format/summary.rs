use std::collections::HashMap;
use std::io::Write;

use super::{FormatOptions, OutputFormat, color, paint};
use crate::commands::resolve::Result;
use crate::commands::resolve::models::{
    ResolutionOutcome, ResolutionResult, ReviewThread, RunSummary,
};

/// Report a finished (or interrupted) live run.
///
/// `threads` is the list the run started from; it is only used to show
/// where each outcome's conversation lives.
pub fn write_summary(
    writer: &mut dyn Write,
    summary: &RunSummary,
    outcomes: &[ResolutionOutcome],
    threads: &[&ReviewThread],
    options: FormatOptions,
) -> Result<()> {
    match options.format {
        OutputFormat::Json => {
            writeln!(writer, "{}", serde_json::to_string_pretty(summary)?)?;
        }
        OutputFormat::Text => {
            write!(
                writer,
                "{}",
                format_summary(summary, outcomes, threads, options.use_color)
            )?;
        }
    }
    Ok(())
}

fn format_summary(
    summary: &RunSummary,
    outcomes: &[ResolutionOutcome],
    threads: &[&ReviewThread],
    use_color: bool,
) -> String {
    use color::*;

    let locations: HashMap<&str, String> = threads
        .iter()
        .map(|t| (t.id.as_str(), t.location()))
        .collect();
    let location_of = |id: &str| {
        locations
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    };

    let mut output = String::new();

    if summary.total_unresolved == 0 {
        output.push_str("No unresolved conversations.\n");
    }

    for outcome in outcomes {
        let location = location_of(&outcome.thread_id);
        let line = match &outcome.result {
            ResolutionResult::Resolved => format!("{} {location}", paint("✓", GREEN, use_color)),
            ResolutionResult::Failed(reason) => {
                format!("{} {location}: {reason}", paint("✗", RED, use_color))
            }
            ResolutionResult::Skipped(reason) => {
                format!(
                    "{} {location} {}",
                    paint("-", YELLOW, use_color),
                    paint(&format!("(skipped: {reason})"), DIM, use_color)
                )
            }
        };
        output.push_str(&line);
        output.push('\n');
    }

    if summary.interrupted {
        let remaining = summary.total_unresolved - outcomes.len();
        output.push_str(&paint(
            &format!("Interrupted: {remaining} conversation(s) not attempted."),
            YELLOW,
            use_color,
        ));
        output.push('\n');
    }

    if !outcomes.is_empty() || summary.interrupted {
        output.push('\n');
    }

    let failed = format!("{} failed", summary.failed_count);
    let failed = if summary.failed_count > 0 {
        paint(&failed, RED, use_color)
    } else {
        failed
    };
    output.push_str(&format!(
        "{} of {} conversation(s), {failed}, {} skipped\n",
        paint(
            &format!("Resolved {}", summary.resolved_count),
            BOLD,
            use_color
        ),
        summary.total_unresolved,
        summary.skipped_count
    ));
    output.push_str(&format!("{}\n", summary.pr_url));

    output
}
