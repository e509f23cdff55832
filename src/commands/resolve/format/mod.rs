mod dry_run;
mod summary;

pub use dry_run::write_dry_run;
pub use summary::write_summary;

use clap::ValueEnum;

use super::models::ReviewThread;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    pub format: OutputFormat,
    pub use_color: bool,
}

pub(super) mod color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Wrap `text` in `code` when color is on.
pub(super) fn paint(text: &str, code: &str, use_color: bool) -> String {
    if use_color {
        format!("{code}{text}{}", color::RESET)
    } else {
        text.to_string()
    }
}

pub(super) fn truncate_text(text: &str, max_length: usize) -> String {
    let first_line = text.lines().next().unwrap_or("").trim_start();
    let char_count = first_line.chars().count();
    if char_count > max_length {
        let truncated: String = first_line.chars().take(max_length).collect();
        format!("{truncated}...")
    } else {
        first_line.to_string()
    }
}

/// One-line description of a thread: location, author and body preview.
pub(super) fn describe_thread(thread: &ReviewThread, use_color: bool) -> String {
    use color::*;
    match &thread.anchor_comment {
        Some(comment) => format!(
            "{} @{}: \"{}\"",
            paint(&comment.location(), CYAN, use_color),
            comment.author_login,
            truncate_text(&comment.body, BODY_PREVIEW_CHARS)
        ),
        None => format!(
            "{} {}",
            thread.id,
            paint("(no comment, will be skipped)", DIM, use_color)
        ),
    }
}

pub(super) const BODY_PREVIEW_CHARS: usize = 60;
