//! Line-oriented matching pass.
//!
//! Applies the applicable rule sets to one file's content, line by line,
//! with a comment-suppression heuristic and defensive skipping of very
//! long lines. This module is the sole producer of [`Finding`] records.

use chrono::Local;
use serde::Serialize;
use std::path::Path;

use crate::core::rules::{is_marker_rule, Rule, Severity};
use crate::utils::stats::classify_module;

/// Lines longer than this many characters are treated as minified/data and
/// not scanned.
pub const MAX_LINE_LEN: usize = 500;

/// Maximum number of characters kept in a finding's code snippet.
pub const SNIPPET_LEN: usize = 150;

/// One recorded match of a rule against a specific file and line.
///
/// Findings are append-only: constructed exactly once per (file, line, rule)
/// match and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Absolute path of the scanned file.
    pub file: String,
    /// Path relative to the scan root.
    pub relative_path: String,
    /// Coarse classification by top-level directory segment.
    pub module: String,
    /// Category label of the originating rule.
    pub rule_category: String,
    /// Name of the originating rule.
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    /// 1-based line number; 0 only for synthetic read-error findings.
    pub line: usize,
    /// Reserved for future use; always 0 today.
    pub column: usize,
    pub timestamp: String,
    /// Trimmed source line, truncated to [`SNIPPET_LEN`] characters.
    pub code_snippet: String,
}

impl Finding {
    fn record(
        root: &Path,
        path: &Path,
        rule_category: &str,
        rule: &str,
        severity: Severity,
        message: &str,
        line: usize,
        code_snippet: String,
    ) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| path.to_string_lossy().to_string());

        Self {
            file: path.to_string_lossy().to_string(),
            relative_path: relative_path.clone(),
            module: classify_module(&relative_path).to_string(),
            rule_category: rule_category.to_string(),
            rule: rule.to_string(),
            severity,
            message: message.to_string(),
            line,
            column: 0,
            timestamp: Local::now().to_rfc3339(),
            code_snippet,
        }
    }

    /// Rule identifier used in statistics: category label joined with rule name.
    pub fn identifier(&self) -> String {
        format!("{} - {}", self.rule_category, self.rule)
    }
}

/// Truncate a snippet to [`SNIPPET_LEN`] characters on a char boundary.
fn truncate_snippet(line: &str) -> String {
    line.chars().take(SNIPPET_LEN).collect()
}

/// Whether the trimmed line starts with a comment marker.
///
/// Intentionally a line-prefix check only: multi-line block comments and
/// trailing inline comments are not tracked. Kept for compatibility with
/// the established report output.
fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("//") || trimmed.starts_with('*')
}

/// Apply rule sets to file content, producing findings and the line count.
///
/// Counts lines with `str::lines()`, so a trailing newline does not add an
/// extra counted line. Line numbers in findings are 1-based. A single line
/// may yield one finding per matching rule; matches on comment lines are
/// discarded unless the rule is a marker rule (TODO, FIXME, BUG, HACK, XXX).
pub fn scan_lines(
    root: &Path,
    path: &Path,
    content: &str,
    rule_sets: &[&[Rule]],
) -> (Vec<Finding>, usize) {
    let mut findings = Vec::new();
    let mut line_count = 0;

    for (idx, line) in content.lines().enumerate() {
        line_count += 1;

        // Skip very long lines (likely minified or data). The limit is in
        // characters; the byte-length check just avoids counting chars on
        // lines that cannot exceed it.
        if line.len() > MAX_LINE_LEN && line.chars().count() > MAX_LINE_LEN {
            continue;
        }

        let trimmed = line.trim();
        let in_comment = is_comment_line(trimmed);

        for rules in rule_sets {
            for rule in rules.iter() {
                if !rule.matches(line) {
                    continue;
                }
                if in_comment && !is_marker_rule(rule.name) {
                    continue;
                }
                findings.push(Finding::record(
                    root,
                    path,
                    rule.category.label(),
                    rule.name,
                    rule.severity,
                    rule.message,
                    idx + 1,
                    truncate_snippet(trimmed),
                ));
            }
        }
    }

    (findings, line_count)
}

/// Build the single synthetic finding recorded for an unreadable file.
///
/// The finding sits at line 0 with severity error; scanning of other files
/// is unaffected.
pub fn read_failure_finding(root: &Path, path: &Path, err: &std::io::Error) -> Finding {
    Finding::record(
        root,
        path,
        "Read Error",
        "read_error",
        Severity::Error,
        &format!("Failed to read file: {}", err),
        0,
        String::new(),
    )
}
