//! Report emission.
//!
//! Serializes the scan session into a single JSON document with `metadata`,
//! `statistics` and `errors` sections, then prints a condensed colored
//! summary to the console. Field names and nesting are stable across runs so
//! tooling can diff reports over time.

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use log::info;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

use crate::core::matcher::Finding;
use crate::core::walker::ScanSession;
use crate::utils::stats::ScanStatistics;

/// Tool identity recorded in report metadata.
pub const TOOL_NAME: &str = "pattern-scanner";

/// Run information recorded alongside the findings.
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    pub scan_date: String,
    pub root_directory: String,
    pub output_file: String,
    pub total_errors: usize,
    pub files_scanned: usize,
    pub lines_scanned: usize,
    pub tool: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
struct Report<'a> {
    metadata: ReportMetadata,
    statistics: &'a ScanStatistics,
    errors: &'a [Finding],
}

/// Sort findings into the reporting order: severity rank (critical first),
/// then absolute file path, then line number. Deterministic and stable for
/// the same findings set regardless of discovery order.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.severity
            .rank()
            .cmp(&b.severity.rank())
            .then_with(|| a.file.cmp(&b.file))
            .then_with(|| a.line.cmp(&b.line))
    });
}

/// Write the JSON report for a finalized session.
///
/// The document is serialized to a sibling temp file and renamed into place,
/// so a write failure never leaves a partial report behind. Expects the
/// session's findings to be sorted already.
pub fn write_report(session: &ScanSession, statistics: &ScanStatistics) -> Result<()> {
    let metadata = ReportMetadata {
        scan_date: Local::now().to_rfc3339(),
        root_directory: session.root.to_string_lossy().to_string(),
        output_file: session.output.to_string_lossy().to_string(),
        total_errors: session.findings.len(),
        files_scanned: session.files_scanned,
        lines_scanned: session.lines_scanned,
        tool: TOOL_NAME,
        version: env!("CARGO_PKG_VERSION"),
    };

    let report = Report {
        metadata,
        statistics,
        errors: &session.findings,
    };

    let tmp_path = session.output.with_extension("json.tmp");
    let file = File::create(&tmp_path).context(format!(
        "Failed to create report file: {}",
        tmp_path.display()
    ))?;
    serde_json::to_writer_pretty(file, &report).context("Failed to write report data")?;

    fs::rename(&tmp_path, &session.output).context(format!(
        "Failed to move report into place: {}",
        session.output.display()
    ))?;

    info!("Report written to {}", session.output.display());
    Ok(())
}

/// Print the condensed console summary for a completed scan.
pub fn print_summary(statistics: &ScanStatistics, session: &ScanSession, output: &Path) {
    println!("\n{}", "=".repeat(60).bold());
    println!("{}", "PATTERN ANALYSIS COMPLETE".bold());
    println!("{}\n", "=".repeat(60).bold());

    println!("Results saved to: {}", output.display());
    println!(
        "Scanned {} files, {} lines",
        session.files_scanned, session.lines_scanned
    );

    println!("\n{}", "Statistics:".yellow().bold());
    println!("  Total Issues: {}", statistics.total_errors);

    println!("\n{}", "By Severity:".yellow().bold());
    for severity in crate::core::rules::Severity::all() {
        if let Some(count) = statistics.by_severity.get(severity.as_str()) {
            if *count > 0 {
                println!("  {}: {}", title_case(severity.as_str()).cyan(), count);
            }
        }
    }

    if !statistics.by_module.is_empty() {
        println!("\n{}", "By Module:".yellow().bold());
        let mut modules: Vec<(&String, &usize)> = statistics.by_module.iter().collect();
        modules.sort_by(|a, b| b.1.cmp(a.1));
        for (module, count) in modules {
            println!("  - {}: {}", module, count);
        }
    }

    if !statistics.top_errors.is_empty() {
        println!("\n{}", "Top 5 Error Types:".yellow().bold());
        for (i, entry) in statistics.top_errors.iter().take(5).enumerate() {
            println!("  {}. {}: {}", i + 1, entry.rule.cyan(), entry.count);
        }
    }

    if !statistics.critical_files.is_empty() {
        println!("\n{}", "Top 5 Files Needing Attention:".yellow().bold());
        for (i, entry) in statistics.critical_files.iter().take(5).enumerate() {
            println!(
                "  {}. {} ({} issues)",
                i + 1,
                entry.file.cyan(),
                entry.error_count
            );
        }
    }

    println!("\n{}\n", "=".repeat(60).bold());
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
