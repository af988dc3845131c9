//! Pattern Scanner - pattern-based code quality scanner for TypeScript/React projects.
//!
//! This library walks a source tree, applies per-file-category sets of
//! regex rules line by line, and produces a severity-ranked JSON findings
//! report with aggregate statistics.

pub mod core;
pub mod utils;

// Re-export the main pipeline types for convenience
pub use crate::core::matcher::Finding;
pub use crate::core::rules::{Rule, RuleCategory, RuleRegistry, Severity};
pub use crate::core::walker::{ScanError, ScanOptions, ScanSession};
pub use crate::utils::stats::ScanStatistics;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a complete scan: walk the tree, match, sort and aggregate.
///
/// Returns the finalized session (findings already in reporting order) and
/// the computed statistics. Writing the report and printing the summary are
/// left to the caller.
pub fn run_scan(
    root: &std::path::Path,
    output: &std::path::Path,
    options: &ScanOptions,
) -> Result<(ScanSession, ScanStatistics), ScanError> {
    let registry = RuleRegistry::build();
    let mut session = core::walker::scan_tree(root, output, &registry, options)?;
    utils::report::sort_findings(&mut session.findings);
    let statistics = ScanStatistics::compute(&session.findings);
    Ok((session, statistics))
}
