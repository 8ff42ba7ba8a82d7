//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each entity (entry,
//! topic, subtopic) leads with its positional index and title; file paths and
//! diagnostics are secondary context on indented lines. Paths are shown
//! relative to the project root when they live under it.
//!
//! # Output Format
//!
//! ## Integrate
//!
//! ```text
//! Integrated
//! 001 Hugo
//! 002 ripgrep (replaced stored entry)
//!
//! Skipped
//!     sources/to_integrate/broken.json: malformed JSON: expected value at line 1 column 1
//!
//! Store now holds 6 entries → sources/treasures.json
//! ```
//!
//! ## Generate
//!
//! ```text
//! Topics
//! 001 Design (2)
//!     001 Color (1)
//!     002 Typography (1)
//! 002 Dev (4)
//!     001 CLI (2)
//!
//! Missing assets
//!     node_modules/bootstrap-icons/font/fonts
//!
//! Generated 6 entries → docs/index.html
//! Copied 3 assets → docs/assets
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 Odd Entry
//!     unknown tag "cobol"
//!
//! Checked 6 entries, 1 issue
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::generate::GenerateSummary;
use crate::integrate::IntegrationReport;
use crate::taxonomy::EntryIssue;
use crate::types::Entry;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Index + name, with an optional count in parentheses.
///
/// ```text
/// 001 Design (2)
/// 001 ripgrep
/// ```
fn entity_header(index: usize, name: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), name, n),
        None => format!("{} {}", format_index(index), name),
    }
}

/// `path` relative to `root` when it lives under it, as-is otherwise.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Stage
// ============================================================================

/// Confirmation after an entry was staged.
///
/// ```text
/// Staged fd → sources/to_integrate/fd.json
///     A simple, fast alternative to find
///     Tool / CLI
///     Dev: CLI
/// ```
pub fn format_stage_output(entry: &Entry, path: &Path, root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Staged {} \u{2192} {}",
        entry.title,
        display_path(path, root)
    )];
    if !entry.description.is_empty() {
        lines.push(format!("{}{}", indent(1), truncate_desc(&entry.description, 60)));
    }
    let class = &entry.data.classification;
    if class.subtype.is_empty() {
        lines.push(format!("{}{}", indent(1), class.kind));
    } else {
        lines.push(format!("{}{} / {}", indent(1), class.kind, class.subtype));
    }
    for pairing in &entry.data.topics {
        if pairing.subtopics.is_empty() {
            lines.push(format!("{}{}", indent(1), pairing.topic));
        } else {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                pairing.topic,
                pairing.subtopics.join(", ")
            ));
        }
    }
    lines
}

pub fn print_stage_output(entry: &Entry, path: &Path, root: &Path) {
    for line in format_stage_output(entry, path, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Integrate
// ============================================================================

/// Format the integration report.
pub fn format_integration_report(
    report: &IntegrationReport,
    store: &Path,
    root: &Path,
) -> Vec<String> {
    let mut lines = Vec::new();

    if report.integrated.is_empty() {
        lines.push("Nothing staged for integration".to_string());
    } else {
        lines.push("Integrated".to_string());
        for (i, title) in report.integrated.iter().enumerate() {
            let mut line = entity_header(i + 1, title, None);
            if report.replaced.contains(title) {
                line.push_str(" (replaced stored entry)");
            }
            lines.push(line);
        }
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &report.skipped {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                display_path(&skipped.path, root),
                skipped.reason
            ));
        }
    }

    if !report.delete_failures.is_empty() {
        lines.push(String::new());
        lines.push("Could not delete".to_string());
        for (path, error) in &report.delete_failures {
            lines.push(format!("{}{}: {}", indent(1), display_path(path, root), error));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Store now holds {} \u{2192} {}",
        plural(report.total_entries, "entry", "entries"),
        display_path(store, root)
    ));
    lines
}

pub fn print_integration_report(report: &IntegrationReport, store: &Path, root: &Path) {
    for line in format_integration_report(report, store, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format the generation summary: populated topics, skipped pairings, HTML
/// issues, then the output file.
pub fn format_generate_output(summary: &GenerateSummary, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !summary.topics.is_empty() {
        lines.push("Topics".to_string());
        for (i, topic) in summary.topics.iter().enumerate() {
            let total = topic.direct + topic.subtopics.iter().map(|(_, n)| n).sum::<usize>();
            lines.push(entity_header(i + 1, &topic.name, Some(total)));
            for (j, (name, count)) in topic.subtopics.iter().enumerate() {
                lines.push(format!(
                    "{}{}",
                    indent(1),
                    entity_header(j + 1, name, Some(*count))
                ));
            }
        }
        lines.push(String::new());
    }

    if !summary.unresolved.is_empty() {
        lines.push("Unresolved topics".to_string());
        for unresolved in &summary.unresolved {
            lines.push(format!("{}{}", indent(1), unresolved));
        }
        lines.push(String::new());
    }

    if !summary.issues.is_empty() {
        lines.push("HTML issues".to_string());
        for issue in &summary.issues {
            lines.push(format!("{}{}", indent(1), issue));
        }
        lines.push(String::new());
    }

    if !summary.assets.missing.is_empty() {
        lines.push("Missing assets".to_string());
        for missing in &summary.assets.missing {
            lines.push(format!("{}{}", indent(1), display_path(missing, root)));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Generated {} \u{2192} {}",
        plural(summary.entries, "entry", "entries"),
        display_path(&summary.output, root)
    ));
    if !summary.assets.copied.is_empty() {
        lines.push(format!(
            "Copied {} \u{2192} {}",
            plural(summary.assets.copied.len(), "asset", "assets"),
            display_path(&summary.assets.dir, root)
        ));
    }
    lines
}

pub fn print_generate_output(summary: &GenerateSummary, root: &Path) {
    for line in format_generate_output(summary, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format store check results, grouped by entry in store order.
pub fn format_check_output(issues: &[EntryIssue], entries_checked: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<&str> = None;
    let mut position = 0;

    for issue in issues {
        if current != Some(issue.title.as_str()) {
            position += 1;
            current = Some(&issue.title);
            lines.push(entity_header(position, &issue.title, None));
        }
        lines.push(format!("{}{}", indent(1), issue.message));
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Checked {}, {}",
        plural(entries_checked, "entry", "entries"),
        plural(issues.len(), "issue", "issues")
    ));
    lines
}

pub fn print_check_output(issues: &[EntryIssue], entries_checked: usize) {
    for line in format_check_output(issues, entries_checked) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetReport;
    use crate::generate::TopicSummary;
    use crate::html::{Issue, Severity};
    use crate::staging::{SkipReason, SkippedFile};
    use crate::topics::UnresolvedTopic;
    use crate::types::{Classification, TopicAssignment};
    use std::path::PathBuf;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(999), "999");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn entity_header_with_and_without_count() {
        assert_eq!(entity_header(1, "Design", Some(2)), "001 Design (2)");
        assert_eq!(entity_header(12, "ripgrep", None), "012 ripgrep");
    }

    #[test]
    fn truncate_desc_counts_chars() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
        assert_eq!(truncate_desc(&"a".repeat(40), 40), "a".repeat(40));
        assert_eq!(truncate_desc("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn display_path_strips_root() {
        let root = Path::new("/project");
        assert_eq!(
            display_path(Path::new("/project/docs/index.html"), root),
            "docs/index.html"
        );
        assert_eq!(display_path(Path::new("/elsewhere/x"), root), "/elsewhere/x");
    }

    // =========================================================================
    // Command output
    // =========================================================================

    #[test]
    fn stage_output_lists_classification() {
        let mut entry = Entry {
            title: "fd".into(),
            description: "Find things".into(),
            ..Default::default()
        };
        entry.data.classification = Classification {
            kind: "Tool".into(),
            subtype: "CLI".into(),
        };
        entry.data.topics = vec![
            TopicAssignment::new("Dev", &["CLI", "Rust"]),
            TopicAssignment::new("Learning", &[]),
        ];
        let lines = format_stage_output(
            &entry,
            Path::new("/p/sources/to_integrate/fd.json"),
            Path::new("/p"),
        );
        assert_eq!(
            lines,
            vec![
                "Staged fd \u{2192} sources/to_integrate/fd.json",
                "    Find things",
                "    Tool / CLI",
                "    Dev: CLI, Rust",
                "    Learning",
            ]
        );
    }

    #[test]
    fn integration_report_marks_replacements_and_skips() {
        let report = IntegrationReport {
            integrated: vec!["Hugo".into(), "ripgrep".into()],
            replaced: vec!["ripgrep".into()],
            skipped: vec![SkippedFile {
                path: PathBuf::from("/p/sources/to_integrate/draft.json"),
                reason: SkipReason::NotMarked,
            }],
            delete_failures: vec![],
            total_entries: 6,
        };
        let lines =
            format_integration_report(&report, Path::new("/p/sources/treasures.json"), Path::new("/p"));
        assert_eq!(
            lines,
            vec![
                "Integrated",
                "001 Hugo",
                "002 ripgrep (replaced stored entry)",
                "",
                "Skipped",
                "    sources/to_integrate/draft.json: not marked for integration",
                "",
                "Store now holds 6 entries \u{2192} sources/treasures.json",
            ]
        );
    }

    #[test]
    fn empty_integration_says_so() {
        let report = IntegrationReport {
            total_entries: 1,
            ..Default::default()
        };
        let lines = format_integration_report(&report, Path::new("store.json"), Path::new("/p"));
        assert_eq!(lines[0], "Nothing staged for integration");
        assert_eq!(lines.last().unwrap(), "Store now holds 1 entry \u{2192} store.json");
    }

    #[test]
    fn generate_output_shows_topics_and_issues() {
        let summary = GenerateSummary {
            output: PathBuf::from("/p/docs/index.html"),
            entries: 3,
            topics: vec![TopicSummary {
                name: "Dev".into(),
                direct: 1,
                subtopics: vec![("CLI".into(), 2)],
            }],
            unresolved: vec![UnresolvedTopic {
                title: "odd".into(),
                topic: "Cooking".into(),
                subtopic: None,
            }],
            issues: vec![Issue {
                severity: Severity::Error,
                line: 3,
                column: 3,
                message: "<span> is never closed".into(),
            }],
            assets: AssetReport::default(),
        };
        let lines = format_generate_output(&summary, Path::new("/p"));
        assert_eq!(
            lines,
            vec![
                "Topics",
                "001 Dev (3)",
                "    001 CLI (2)",
                "",
                "Unresolved topics",
                "    odd: unknown topic Cooking",
                "",
                "HTML issues",
                "    3:3 error: <span> is never closed",
                "",
                "Generated 3 entries \u{2192} docs/index.html",
            ]
        );
    }

    #[test]
    fn generate_output_reports_assets() {
        let summary = GenerateSummary {
            output: PathBuf::from("/p/docs/index.html"),
            entries: 1,
            topics: Vec::new(),
            unresolved: Vec::new(),
            issues: Vec::new(),
            assets: AssetReport {
                dir: PathBuf::from("/p/docs/assets"),
                copied: vec![
                    PathBuf::from("/p/docs/assets/bootstrap/bootstrap.min.css"),
                    PathBuf::from("/p/docs/assets/bootstrap/bootstrap.bundle.min.js"),
                ],
                missing: vec![PathBuf::from("/p/node_modules/bootstrap-icons/font/fonts")],
            },
        };
        let lines = format_generate_output(&summary, Path::new("/p"));
        assert_eq!(
            lines,
            vec![
                "Missing assets",
                "    node_modules/bootstrap-icons/font/fonts",
                "",
                "Generated 1 entry \u{2192} docs/index.html",
                "Copied 2 assets \u{2192} docs/assets",
            ]
        );
    }

    #[test]
    fn check_output_groups_by_entry() {
        let issue = |title: &str, message: &str| EntryIssue {
            title: title.into(),
            message: message.into(),
        };
        let issues = vec![
            issue("a", "unknown tag \"x\""),
            issue("a", "no resources"),
            issue("b", "unknown topic \"Y\""),
        ];
        let lines = format_check_output(&issues, 5);
        assert_eq!(
            lines,
            vec![
                "001 a",
                "    unknown tag \"x\"",
                "    no resources",
                "002 b",
                "    unknown topic \"Y\"",
                "",
                "Checked 5 entries, 3 issues",
            ]
        );
    }

    #[test]
    fn clean_check_is_one_line() {
        assert_eq!(format_check_output(&[], 1), vec!["Checked 1 entry, 0 issues"]);
    }
}
