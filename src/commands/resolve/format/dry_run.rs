use std::io::Write;

use serde::Serialize;

use super::{FormatOptions, OutputFormat, color, describe_thread, paint};
use crate::commands::resolve::Result;
use crate::commands::resolve::models::ReviewThread;

#[derive(Serialize)]
struct DryRunReport<'a> {
    dry_run: bool,
    pr_url: &'a str,
    total_unresolved: usize,
    threads: &'a [&'a ReviewThread],
}

/// Preview what a live run would touch. Never issues a mutation.
pub fn write_dry_run(
    writer: &mut dyn Write,
    pr_url: &str,
    unresolved: &[&ReviewThread],
    options: FormatOptions,
) -> Result<()> {
    match options.format {
        OutputFormat::Json => {
            let report = DryRunReport {
                dry_run: true,
                pr_url,
                total_unresolved: unresolved.len(),
                threads: unresolved,
            };
            writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        OutputFormat::Text => {
            write!(writer, "{}", format_dry_run(pr_url, unresolved, options.use_color))?;
        }
    }
    Ok(())
}

fn format_dry_run(pr_url: &str, unresolved: &[&ReviewThread], use_color: bool) -> String {
    if unresolved.is_empty() {
        return format!("No unresolved conversations.\n{pr_url}\n");
    }

    let mut output = String::new();
    let header = format!(
        "Dry run: would resolve {} conversation(s)",
        unresolved.len()
    );
    output.push_str(&format!(
        "{} on {pr_url}\n",
        paint(&header, color::BOLD, use_color)
    ));

    for thread in unresolved {
        output.push_str(&format!("  - {}\n", describe_thread(thread, use_color)));
    }

    let skipped = unresolved
        .iter()
        .filter(|t| t.anchor_comment.is_none())
        .count();
    if skipped > 0 {
        output.push_str(&format!(
            "{skipped} of them have no comment and will be skipped.\n"
        ));
    }

    output
}
