//! Aggregation of findings into scan statistics.
//!
//! Statistics are a pure projection of the complete findings list: computing
//! them twice over the same list yields identical output. The caller passes
//! the deterministically sorted findings so that top-N tie-breaking by
//! encounter order is itself deterministic.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path};

use crate::core::matcher::Finding;

/// Top-level path segments recognized as modules; everything else is "unknown".
pub const RECOGNIZED_MODULES: [&str; 4] = ["client", "server", "shared", "src"];

const TOP_RULES: usize = 15;
const TOP_FILES: usize = 10;

/// Classify a root-relative path by its first segment.
///
/// A courtesy classification, not a strict taxonomy: unrecognized segments
/// all land in the "unknown" bucket.
pub fn classify_module(relative_path: &str) -> &'static str {
    let first = Path::new(relative_path)
        .components()
        .find_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            _ => None,
        })
        .unwrap_or_default();

    RECOGNIZED_MODULES
        .iter()
        .find(|m| **m == first)
        .copied()
        .unwrap_or("unknown")
}

/// One entry in the ranked rule-identifier list.
#[derive(Debug, Clone, Serialize)]
pub struct RuleCount {
    #[serde(rename = "type")]
    pub rule: String,
    pub count: usize,
}

/// One entry in the ranked file list.
#[derive(Debug, Clone, Serialize)]
pub struct FileCount {
    pub file: String,
    pub error_count: usize,
}

/// Multi-axis statistics derived from the full findings set.
#[derive(Debug, Serialize)]
pub struct ScanStatistics {
    pub total_errors: usize,
    pub by_severity: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub by_module: BTreeMap<String, usize>,
    pub by_file: BTreeMap<String, usize>,
    pub top_errors: Vec<RuleCount>,
    pub critical_files: Vec<FileCount>,
}

impl ScanStatistics {
    /// Compute statistics from the findings list. Pure, idempotent, no side
    /// effects; repeatable for an unchanged input.
    pub fn compute(findings: &[Finding]) -> Self {
        let mut by_severity = BTreeMap::new();
        let mut by_type = BTreeMap::new();
        let mut by_module = BTreeMap::new();
        let mut by_file = BTreeMap::new();

        for finding in findings {
            *by_severity
                .entry(finding.severity.as_str().to_string())
                .or_insert(0) += 1;
            *by_type.entry(finding.identifier()).or_insert(0) += 1;
            *by_module.entry(finding.module.clone()).or_insert(0) += 1;
            *by_file.entry(finding.relative_path.clone()).or_insert(0) += 1;
        }

        let top_errors = ranked(findings.iter().map(|f| f.identifier()), TOP_RULES)
            .into_iter()
            .map(|(rule, count)| RuleCount { rule, count })
            .collect();

        let critical_files = ranked(findings.iter().map(|f| f.relative_path.clone()), TOP_FILES)
            .into_iter()
            .map(|(file, error_count)| FileCount { file, error_count })
            .collect();

        Self {
            total_errors: findings.len(),
            by_severity,
            by_type,
            by_module,
            by_file,
            top_errors,
            critical_files,
        }
    }
}

/// Count keys in encounter order, then take the top `n` by count with a
/// stable sort so ties keep encounter order.
fn ranked(keys: impl Iterator<Item = String>, n: usize) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for key in keys {
        if !counts.contains_key(&key) {
            order.push(key.clone());
        }
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut entries: Vec<(String, usize)> = order
        .into_iter()
        .map(|key| {
            let count = counts[&key];
            (key, count)
        })
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::RuleRegistry;
    use crate::core::{matcher, walker};
    use std::path::PathBuf;

    fn sample_findings() -> Vec<Finding> {
        let registry = RuleRegistry::build();
        let root = PathBuf::from("/project");
        let content = "const a: any = 1;\nconst b: any = 2;\n// TODO one\nconsole.log(a);\n";

        let mut findings = Vec::new();
        for file in ["client/app.ts", "server/api.ts", "weird/other.ts"] {
            let path = root.join(file);
            let sets = vec![registry.typescript(), registry.common(), registry.imports()];
            let (mut file_findings, _) = matcher::scan_lines(&root, &path, content, &sets);
            findings.append(&mut file_findings);
        }
        findings
    }

    #[test]
    fn test_classify_module() {
        assert_eq!(classify_module("client/src/App.tsx"), "client");
        assert_eq!(classify_module("server/api/users.ts"), "server");
        assert_eq!(classify_module("shared/types.ts"), "shared");
        assert_eq!(classify_module("src/index.ts"), "src");
        assert_eq!(classify_module("scripts/build.ts"), "unknown");
        assert_eq!(classify_module(""), "unknown");
    }

    #[test]
    fn test_counts_by_axis() {
        let findings = sample_findings();
        let stats = ScanStatistics::compute(&findings);

        assert_eq!(stats.total_errors, findings.len());
        assert_eq!(stats.by_module.get("client"), Some(&4));
        assert_eq!(stats.by_module.get("server"), Some(&4));
        assert_eq!(stats.by_module.get("unknown"), Some(&4));
        // Two any_usage per file across three files
        assert_eq!(stats.by_type.get("TypeScript - any_usage"), Some(&6));
        assert_eq!(stats.by_severity.get("warning"), Some(&9));
        assert_eq!(stats.by_severity.get("info"), Some(&3));
        assert_eq!(stats.by_file.get("client/app.ts"), Some(&4));
    }

    #[test]
    fn test_top_lists_ranked_with_stable_ties() {
        let findings = sample_findings();
        let stats = ScanStatistics::compute(&findings);

        assert_eq!(stats.top_errors[0].rule, "TypeScript - any_usage");
        assert_eq!(stats.top_errors[0].count, 6);
        // TODO and console.log tie at 3; TODO was encountered first per file
        assert_eq!(stats.top_errors[1].rule, "Code Quality - TODO");
        assert_eq!(stats.top_errors[2].rule, "Code Quality - console.log");

        // All files tie at 4; encounter order preserved
        let files: Vec<&str> = stats
            .critical_files
            .iter()
            .map(|f| f.file.as_str())
            .collect();
        assert_eq!(files, vec!["client/app.ts", "server/api.ts", "weird/other.ts"]);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let findings = sample_findings();
        let first = serde_json::to_string(&ScanStatistics::compute(&findings)).unwrap();
        let second = serde_json::to_string(&ScanStatistics::compute(&findings)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_findings() {
        let stats = ScanStatistics::compute(&[]);
        assert_eq!(stats.total_errors, 0);
        assert!(stats.by_severity.is_empty());
        assert!(stats.top_errors.is_empty());
        assert!(stats.critical_files.is_empty());
    }

    #[test]
    fn test_recognized_modules_match_walker_conventions() {
        for module in RECOGNIZED_MODULES {
            assert!(
                walker::SCAN_DIR_CANDIDATES
                    .iter()
                    .any(|c| c.starts_with(module)),
                "module {} has no scan-dir counterpart",
                module
            );
        }
    }
}
