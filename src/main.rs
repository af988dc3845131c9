//! Pattern Scanner - pattern-based code quality scanner for TypeScript/React projects.
//!
//! The main entry point. Parses command-line arguments, configures logging
//! and runs the scan pipeline, writing the JSON report and a console summary.

use anyhow::Result;
use clap::{ArgAction, Parser};
use colored::Colorize;
use log::LevelFilter;
use std::fs::File;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

mod core;
mod utils;

use crate::core::rules::RuleRegistry;
use crate::core::walker::{scan_tree, ScanOptions};
use crate::utils::report;
use crate::utils::stats::ScanStatistics;

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "pattern_scanner",
    version,
    about = "Pattern-based code quality scanner for TypeScript/React projects",
    long_about = "Walks a project tree and applies lexical rules to TypeScript,
JavaScript and React sources, reporting:
- Type-safety escapes (any usage, suppressions, assertions)
- React pitfalls (missing keys, state mutation, hook dependencies)
- Work-item markers (TODO/FIXME/BUG/HACK/XXX) and debug leftovers
- Import/export hygiene issues"
)]
struct Args {
    /// Root directory of the project to scan
    root: PathBuf,

    /// Output file for the JSON report
    #[arg(default_value = "pattern_errors.json")]
    output: PathBuf,

    /// Suppress progress output and the console summary
    #[arg(long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,

    /// Number of parallel workers (0=auto, default: auto)
    #[arg(long = "parallel", default_value = "0")]
    parallel: usize,

    /// Set logging level (default: WARN)
    #[arg(long = "log-level", default_value = "warn")]
    log_level: LevelFilter,

    /// Log file path (logs go to stderr when omitted)
    #[arg(long = "log-file")]
    log_file: Option<String>,
}

fn main() -> Result<()> {
    let start_time = Instant::now();

    let args = Args::parse();

    setup_logging(&args);

    let options = ScanOptions {
        quiet: args.quiet,
        workers: args.parallel,
    };

    let registry = RuleRegistry::build();
    let mut session = match scan_tree(&args.root, &args.output, &registry, &options) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    report::sort_findings(&mut session.findings);
    let statistics = ScanStatistics::compute(&session.findings);

    if let Err(e) = report::write_report(&session, &statistics) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }

    if !args.quiet {
        println!(
            "\nScan complete: {} files, {} lines in {:.2} seconds",
            session.files_scanned,
            session.lines_scanned,
            start_time.elapsed().as_secs_f64()
        );
        println!("   Found {} issues", session.findings.len());

        report::print_summary(&statistics, &session, &args.output);
    }

    // Findings are data, not failures
    Ok(())
}

/// Set up logging with an optional file target and timestamped format.
fn setup_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(args.log_level);

    builder.format(|buf, record| {
        use chrono::Local;
        use std::io::Write;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(log_file) = &args.log_file {
        if let Ok(file) = File::create(log_file) {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    builder.init();
}
