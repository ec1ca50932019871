//! Markdown rendering of a daily summary and insertion into a daily note.

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::aggregate::format_minutes;
use crate::usage::DailySummary;

/// Heading that starts the generated section.
pub const SECTION_MARKER: &str = "## Screen Time";

/// A second-level heading following the section.
const NEXT_HEADING: &str = "\n## ";

/// Tag line that closes a daily note, e.g. `#2026-01 #daily`.
static TAG_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n#\d{4}-\d{2}\s").expect("valid tag line regex"));

/// Renders the section as a Markdown table with a bold total row.
pub fn render_markdown(summary: &DailySummary) -> String {
    let mut out = String::new();
    writeln!(out, "{SECTION_MARKER}").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "| Hour | App | Duration |").unwrap();
    writeln!(out, "|------|-----|----------|").unwrap();
    for bucket in &summary.hourly {
        for app in &bucket.apps {
            writeln!(
                out,
                "| {} | {} | {} |",
                bucket.hour,
                app.name,
                format_minutes(app.minutes)
            )
            .unwrap();
        }
    }
    writeln!(
        out,
        "| **Total** | - | **{}** |",
        format_minutes(summary.total_minutes)
    )
    .unwrap();
    out
}

/// Places `section` into an existing note.
///
/// An existing section is replaced up to the next second-level heading. Without
/// one, the section goes before the closing tag line, or at the end.
pub fn insert_section(content: &str, section: &str) -> String {
    if let Some(start) = content.find(SECTION_MARKER) {
        let after_marker = start + SECTION_MARKER.len();
        let end = content[after_marker..]
            .find(NEXT_HEADING)
            .map_or(content.len(), |offset| after_marker + offset);
        return format!("{}{section}{}", &content[..start], &content[end..]);
    }

    if let Some(tag) = TAG_LINE_RE.find(content) {
        let at = tag.start();
        return format!("{}\n{section}{}", &content[..at], &content[at..]);
    }

    format!("{}\n\n{section}", content.trim_end())
}

/// Daily note location: `{folder}/{YYYY}/{MM}/{YYYY-MM-DD}.md`.
pub fn daily_note_path(folder: &Path, date: NaiveDate) -> PathBuf {
    folder
        .join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{}.md", date.format("%Y-%m-%d")))
}
