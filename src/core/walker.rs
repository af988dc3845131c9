//! Tree traversal and dispatch.
//!
//! Walks the source tree, prunes ignorable directories before descending,
//! classifies files by extension and fans the matching pass out across a
//! rayon thread pool. Appends to the shared findings collection are funneled
//! through a mutex and counters are atomic; the report stage re-sorts the
//! findings, so nothing downstream relies on insertion order.

use indicatif::{ProgressBar, ProgressStyle};
use lazy_static::lazy_static;
use log::{info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::matcher::{read_failure_finding, scan_lines, Finding};
use crate::core::rules::{Rule, RuleRegistry};

/// Conventional source locations probed under the root, in preference order.
pub const SCAN_DIR_CANDIDATES: [&str; 4] = ["client/src", "server", "shared", "src"];

lazy_static! {
    /// Directory names pruned before descent: build artifacts, dependency
    /// caches, version-control metadata and generated output.
    static ref SKIP_DIRS: HashSet<&'static str> = [
        "node_modules", ".git", "__pycache__", "venv", "env", ".venv",
        "dist", "build", ".next", "target", "coverage", "test-results",
        "playwright-report", "drizzle", "backup", "tmp", "temp", ".cache",
        "out", "public", "static", ".turbo", ".vercel", ".netlify",
    ]
    .into_iter()
    .collect();
}

/// Fatal scan setup errors. Per-file and per-directory failures are always
/// recovered locally and surfaced as warnings or findings instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("root directory not found or not a directory: {0}")]
    RootNotFound(PathBuf),
    #[error("failed to resolve root directory {path}: {source}")]
    RootResolve {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to build scan thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// File category derived from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Plain script sources: `.ts` and `.js` (js reuses the ts handling).
    Script,
    /// Component sources: `.tsx` and `.jsx`.
    Component,
}

/// Map a path to its file category; `None` for ineligible files.
pub fn classify_extension(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "ts" | "js" => Some(FileKind::Script),
        "tsx" | "jsx" => Some(FileKind::Component),
        _ => None,
    }
}

/// Rule category combination applied to a file of the given kind.
fn rule_sets<'a>(registry: &'a RuleRegistry, kind: FileKind) -> Vec<&'a [Rule]> {
    match kind {
        FileKind::Component => vec![
            registry.react(),
            registry.typescript(),
            registry.common(),
            registry.imports(),
        ],
        FileKind::Script => vec![registry.typescript(), registry.common(), registry.imports()],
    }
}

/// Options controlling a scan run.
pub struct ScanOptions {
    /// Suppress progress output.
    pub quiet: bool,
    /// Worker threads for the matching pass; 0 selects available parallelism.
    pub workers: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            quiet: true,
            workers: 0,
        }
    }
}

/// State of one scan invocation: root, output destination, running counters
/// and the collected findings. Finalized by the report stage.
pub struct ScanSession {
    pub root: PathBuf,
    pub output: PathBuf,
    pub files_scanned: usize,
    pub lines_scanned: usize,
    pub findings: Vec<Finding>,
}

/// Walk the tree under `root` and run the matching pass over every eligible file.
///
/// Probes the conventional source directories first and falls back to the
/// whole root when none exist. Traversal errors are logged and the affected
/// subtree skipped; only a missing root or a thread-pool failure is fatal.
pub fn scan_tree(
    root: &Path,
    output: &Path,
    registry: &RuleRegistry,
    options: &ScanOptions,
) -> Result<ScanSession, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    let root = root
        .canonicalize()
        .map_err(|source| ScanError::RootResolve {
            path: root.to_path_buf(),
            source,
        })?;

    info!("Scanning: {}", root.display());

    let scan_dirs = resolve_scan_dirs(&root);
    let targets = collect_targets(&root, &scan_dirs);

    info!("Found {} eligible files", targets.len());

    let workers = if options.workers == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        options.workers
    };

    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;

    let progress_bar = if !options.quiet {
        let pb = ProgressBar::new(targets.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let findings: Mutex<Vec<Finding>> = Mutex::new(Vec::new());
    let files_scanned = AtomicUsize::new(0);
    let lines_scanned = AtomicUsize::new(0);

    pool.install(|| {
        targets.par_iter().for_each(|(path, kind)| {
            let sets = rule_sets(registry, *kind);
            match fs::read_to_string(path) {
                Ok(content) => {
                    let (file_findings, lines) = scan_lines(&root, path, &content, &sets);
                    lines_scanned.fetch_add(lines, Ordering::Relaxed);
                    if !file_findings.is_empty() {
                        if let Ok(mut all) = findings.lock() {
                            all.extend(file_findings);
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    if let Ok(mut all) = findings.lock() {
                        all.push(read_failure_finding(&root, path, &e));
                    }
                }
            }
            files_scanned.fetch_add(1, Ordering::Relaxed);

            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
        });
    });

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    let findings = findings
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    Ok(ScanSession {
        root,
        output: output.to_path_buf(),
        files_scanned: files_scanned.into_inner(),
        lines_scanned: lines_scanned.into_inner(),
        findings,
    })
}

/// Existing conventional subdirectories, or the root itself as a fallback.
fn resolve_scan_dirs(root: &Path) -> Vec<PathBuf> {
    let mut scan_dirs: Vec<PathBuf> = SCAN_DIR_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .filter(|path| path.is_dir())
        .collect();

    if scan_dirs.is_empty() {
        warn!("No standard directories found, scanning entire root");
        scan_dirs.push(root.to_path_buf());
    }

    scan_dirs
}

/// Enumerate eligible files under the scan directories, pruning skip
/// directories before descending into them.
fn collect_targets(root: &Path, scan_dirs: &[PathBuf]) -> Vec<(PathBuf, FileKind)> {
    let mut targets = Vec::new();

    for scan_dir in scan_dirs {
        info!(
            "  Scanning {}...",
            scan_dir.strip_prefix(root).unwrap_or(scan_dir).display()
        );

        let walker = WalkDir::new(scan_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                // Prune before descending, not after. Only child directories
                // are candidates; the scan root itself is never pruned.
                entry.depth() == 0 || !(entry.file_type().is_dir() && is_skip_dir(entry.path()))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(kind) = classify_extension(entry.path()) {
                targets.push((entry.path().to_path_buf(), kind));
            }
        }
    }

    targets
}

fn is_skip_dir(path: &Path) -> bool {
    path.file_name()
        .map(|name| SKIP_DIRS.contains(name.to_string_lossy().as_ref()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_extension() {
        assert_eq!(
            classify_extension(Path::new("src/app.ts")),
            Some(FileKind::Script)
        );
        assert_eq!(
            classify_extension(Path::new("src/legacy.js")),
            Some(FileKind::Script)
        );
        assert_eq!(
            classify_extension(Path::new("src/App.tsx")),
            Some(FileKind::Component)
        );
        assert_eq!(
            classify_extension(Path::new("src/App.jsx")),
            Some(FileKind::Component)
        );
        assert_eq!(classify_extension(Path::new("README.md")), None);
        assert_eq!(classify_extension(Path::new("Makefile")), None);
    }

    #[test]
    fn test_component_files_get_react_rules() {
        let registry = RuleRegistry::build();
        let component_sets = rule_sets(&registry, FileKind::Component);
        let script_sets = rule_sets(&registry, FileKind::Script);

        assert_eq!(component_sets.len(), 4);
        assert_eq!(script_sets.len(), 3);
        assert!(component_sets
            .iter()
            .any(|set| set.iter().any(|r| r.name == "dangerously_set")));
        assert!(!script_sets
            .iter()
            .any(|set| set.iter().any(|r| r.name == "dangerously_set")));
    }

    #[test]
    fn test_skip_dir_matching() {
        assert!(is_skip_dir(Path::new("/repo/node_modules")));
        assert!(is_skip_dir(Path::new("/repo/client/.next")));
        assert!(!is_skip_dir(Path::new("/repo/client/src")));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let registry = RuleRegistry::build();
        let result = scan_tree(
            Path::new("/definitely/not/a/real/path"),
            Path::new("out.json"),
            &registry,
            &ScanOptions::default(),
        );
        assert!(matches!(result, Err(ScanError::RootNotFound(_))));
    }
}
