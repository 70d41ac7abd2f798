//! RECENT_CHANGES.md rendering and the reference timestamp it carries.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use crate::models::{Analysis, ChangeInfo};

pub const RECENT_CHANGES_FILE: &str = "RECENT_CHANGES.md";

const FILES_SHOWN: usize = 5;

pub fn recent_changes_path(docs_dir: &Path) -> PathBuf {
    docs_dir.join(RECENT_CHANGES_FILE)
}

/// Extracts the `Last updated:` timestamp from a rendered document.
pub fn last_updated(content: &str) -> Option<DateTime<Utc>> {
    let re = Regex::new(r"Last updated: ([^*\r\n]+)").ok()?;
    let raw = re.captures(content)?.get(1)?.as_str().trim();
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// The point in time history should be read from: the last render recorded
/// in `docs_dir`, or `fallback_days` before `now`.
pub fn reference_timestamp(docs_dir: &Path, now: DateTime<Utc>, fallback_days: u32) -> DateTime<Utc> {
    let path = recent_changes_path(docs_dir);
    match fs::read_to_string(&path) {
        Ok(content) => {
            if let Some(ts) = last_updated(&content) {
                return ts;
            }
            tracing::warn!("No timestamp in {}, using {} days ago", path.display(), fallback_days);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("{} not found, using {} days ago", path.display(), fallback_days);
        }
        Err(e) => {
            tracing::warn!("Could not read {}: {}, using {} days ago", path.display(), e, fallback_days);
        }
    }
    // Clamp instead of overflowing chrono's range.
    now.checked_sub_signed(Duration::days(i64::from(fallback_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn format_day(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn section(out: &mut String, title: &str, changes: &[ChangeInfo]) {
    let _ = writeln!(out, "### {}", title);
    for change in changes {
        let description = if change.description.is_empty() {
            "No description"
        } else {
            change.description.as_str()
        };
        let _ = writeln!(
            out,
            "- **{}** ({}) - {}",
            change.title,
            format_day(&change.date),
            description
        );
    }
    out.push('\n');
}

/// Renders the RECENT_CHANGES.md document for `analysis`.
pub fn render_recent_changes(analysis: &Analysis, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();

    out.push_str("# Recent Changes\n\n");
    out.push_str("*This document is automatically updated based on git history.*\n\n");

    out.push_str("## Summary\n");
    let _ = writeln!(out, "- **Total commits**: {}", analysis.total_commits);
    let _ = writeln!(out, "- **Contributors**: {}", analysis.contributors.join(", "));
    let _ = writeln!(out, "- **Files changed**: {}\n", analysis.files_changed.len());

    out.push_str("## Recent Updates\n\n");
    for change in &analysis.recent_changes {
        let _ = writeln!(out, "### {} - {}", format_day(&change.date), change.category);
        let _ = writeln!(out, "**{}**", change.title);
        if !change.description.is_empty() {
            let _ = writeln!(out, "{}", change.description);
        }
        let _ = writeln!(out, "**Impact:** {}", change.impact);
        let _ = writeln!(out, "**Author:** {}", change.author);
        let shown: Vec<&str> = change.files.iter().take(FILES_SHOWN).map(String::as_str).collect();
        let more = if change.files.len() > FILES_SHOWN { "..." } else { "" };
        let _ = writeln!(out, "**Files:** {}{}\n", shown.join(", "), more);
        out.push_str("---\n\n");
    }

    out.push_str("## Significant Changes\n\n");
    section(&mut out, "New Features", &analysis.new_features);
    section(&mut out, "Bug Fixes", &analysis.bug_fixes);
    section(&mut out, "Breaking Changes", &analysis.breaking_changes);
    section(&mut out, "Dependencies", &analysis.dependency_updates);
    section(&mut out, "Performance Improvements", &analysis.performance_improvements);

    out.push_str("## Change Statistics\n");
    let _ = writeln!(out, "- **Total commits:** {}", analysis.total_commits);
    let _ = writeln!(out, "- **Contributors:** {}", analysis.contributors.len());
    let _ = writeln!(out, "- **Files changed:** {}", analysis.files_changed.len());
    let _ = writeln!(out, "- **New features:** {}", analysis.new_features.len());
    let _ = writeln!(out, "- **Bug fixes:** {}", analysis.bug_fixes.len());
    let _ = writeln!(out, "- **Breaking changes:** {}\n", analysis.breaking_changes.len());

    out.push_str("---\n");
    let _ = writeln!(out, "*Last updated: {}*", generated_at.to_rfc3339());

    out
}

/// Writes the rendered document into `docs_dir`, creating it when missing.
pub fn write_recent_changes(
    docs_dir: &Path,
    analysis: &Analysis,
    generated_at: DateTime<Utc>,
) -> std::io::Result<PathBuf> {
    fs::create_dir_all(docs_dir)?;
    let path = recent_changes_path(docs_dir);
    fs::write(&path, render_recent_changes(analysis, generated_at))?;
    tracing::info!("Generated {}", path.display());
    Ok(path)
}
