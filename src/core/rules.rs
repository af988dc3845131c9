//! Rule definitions for the pattern scanner.
//!
//! This module contains the lexical rule tables applied to scanned source
//! files, grouped into four categories: TypeScript, React, cross-cutting
//! code quality, and import/export hygiene. Every pattern is compiled once
//! at registry build time; a pattern that fails to compile disables only
//! that rule, never the registry.

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Severity of a finding, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Sort rank: critical sorts before error, error before warning, and so on.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// All severities in rank order, for summary printing.
    pub fn all() -> [Severity; 4] {
        [
            Severity::Critical,
            Severity::Error,
            Severity::Warning,
            Severity::Info,
        ]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping of rules by the kind of construct they check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    /// Primary-language rules (type-safety escapes, suppressions).
    Typescript,
    /// UI-component-framework rules (hooks, JSX, state handling).
    React,
    /// Cross-cutting code quality rules (markers, debug output, security).
    CodeQuality,
    /// Module-linkage rules (import/export hygiene).
    Imports,
}

impl RuleCategory {
    /// Human label used to build rule identifiers and report keys.
    pub fn label(self) -> &'static str {
        match self {
            RuleCategory::Typescript => "TypeScript",
            RuleCategory::React => "React",
            RuleCategory::CodeQuality => "Code Quality",
            RuleCategory::Imports => "Import/Export",
        }
    }
}

lazy_static! {
    /// Rules whose entire purpose is to be found inside comments. Matches on
    /// these rules survive the comment-suppression heuristic.
    static ref MARKER_RULES: HashSet<&'static str> =
        ["TODO", "FIXME", "BUG", "HACK", "XXX"].into_iter().collect();
}

/// True for work-item marker rules (TODO, FIXME, BUG, HACK, XXX).
pub fn is_marker_rule(name: &str) -> bool {
    MARKER_RULES.contains(name)
}

/// A named lexical pattern bound to a severity and message.
///
/// The compiled matcher is optional: an invalid pattern is reported with a
/// warning at build time and the rule stays registered but disabled.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    pub category: RuleCategory,
    compiled: Option<Regex>,
}

impl Rule {
    fn new(
        category: RuleCategory,
        name: &'static str,
        pattern: &str,
        severity: Severity,
        message: &'static str,
    ) -> Self {
        let compiled = match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!("Invalid regex for rule {}: {}", name, e);
                None
            }
        };

        Self {
            name,
            severity,
            message,
            category,
            compiled,
        }
    }

    /// Whether the rule's pattern compiled and the rule participates in matching.
    pub fn is_enabled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Test the rule against one line. Disabled rules never match.
    pub fn matches(&self, line: &str) -> bool {
        match &self.compiled {
            Some(regex) => regex.is_match(line),
            None => false,
        }
    }

    /// Rule identifier: category label joined with the rule name.
    pub fn identifier(&self) -> String {
        format!("{} - {}", self.category.label(), self.name)
    }
}

/// Immutable, category-partitioned collection of rules.
///
/// Building the registry always succeeds; individual rules may be disabled
/// when their pattern does not compile. Mapping file extensions to rule
/// category combinations is the walker's responsibility.
pub struct RuleRegistry {
    typescript: Vec<Rule>,
    react: Vec<Rule>,
    common: Vec<Rule>,
    imports: Vec<Rule>,
}

impl RuleRegistry {
    /// Build the registry with the full rule tables, compiling every pattern.
    pub fn build() -> Self {
        Self {
            typescript: typescript_rules(),
            react: react_rules(),
            common: common_rules(),
            imports: import_rules(),
        }
    }

    pub fn typescript(&self) -> &[Rule] {
        &self.typescript
    }

    pub fn react(&self) -> &[Rule] {
        &self.react
    }

    pub fn common(&self) -> &[Rule] {
        &self.common
    }

    pub fn imports(&self) -> &[Rule] {
        &self.imports
    }
}

/// TypeScript-specific rules.
fn typescript_rules() -> Vec<Rule> {
    use RuleCategory::Typescript;
    use Severity::{Error, Info, Warning};

    vec![
        Rule::new(
            Typescript,
            "any_usage",
            r":\s*any\b|<any>|as\s+any\b",
            Warning,
            "Usage of \"any\" type reduces type safety",
        ),
        Rule::new(
            Typescript,
            "ts_ignore",
            r"@ts-ignore",
            Warning,
            "TypeScript error suppression found",
        ),
        Rule::new(
            Typescript,
            "ts_nocheck",
            r"@ts-nocheck",
            Error,
            "Entire file TypeScript checking disabled",
        ),
        Rule::new(
            Typescript,
            "ts_expect_error",
            r"@ts-expect-error",
            Info,
            "Expected TypeScript error (consider adding comment)",
        ),
        Rule::new(
            Typescript,
            "non_null_assertion",
            r"!\s*[;\.\[\(]",
            Warning,
            "Non-null assertion operator (!) used - ensure safety",
        ),
        Rule::new(
            Typescript,
            "unknown_type",
            r":\s*unknown\b",
            Info,
            "Unknown type used (safer than any, but consider specifics)",
        ),
        Rule::new(
            Typescript,
            "type_assertion",
            r"as\s+\w+",
            Info,
            "Type assertion used - verify correctness",
        ),
    ]
}

/// React-specific rules.
fn react_rules() -> Vec<Rule> {
    use RuleCategory::React;
    use Severity::{Error, Info, Warning};

    vec![
        Rule::new(
            React,
            "missing_key_prop",
            r"\.map\([^)]*\)\s*=>\s*<\w+\s*/?>",
            Warning,
            "Missing \"key\" prop in mapped component",
        ),
        Rule::new(
            React,
            "inline_function",
            r"(onClick|onChange|onSubmit|onBlur|onFocus)=\{[^}]*=>",
            Info,
            "Inline function in JSX (may cause unnecessary re-renders)",
        ),
        Rule::new(
            React,
            "direct_state_mutation",
            r"(state|this\.state)\.\w+\s*=[^=]",
            Error,
            "Direct state mutation detected - use setState",
        ),
        Rule::new(
            React,
            "empty_deps",
            r"useEffect\([^)]+,\s*\[\s*\]\s*\)",
            Info,
            "useEffect with empty dependency array (runs once on mount)",
        ),
        Rule::new(
            React,
            "missing_deps",
            r"useEffect\(\s*\(\s*\)\s*=>[^,]*\)\s*(;|$)",
            Warning,
            "useEffect without dependency array (runs on every render)",
        ),
        Rule::new(
            React,
            "useState_initial",
            r"useState\(\s*[\{\[]",
            Info,
            "useState with object/array - ensure intentional",
        ),
        Rule::new(
            React,
            "dangerously_set",
            r"dangerouslySetInnerHTML",
            Warning,
            "dangerouslySetInnerHTML used - XSS risk",
        ),
    ]
}

/// Cross-cutting code quality rules.
fn common_rules() -> Vec<Rule> {
    use RuleCategory::CodeQuality;
    use Severity::{Critical, Error, Info, Warning};

    vec![
        Rule::new(
            CodeQuality,
            "TODO",
            r"//\s*TODO|/\*\s*TODO|#\s*TODO",
            Warning,
            "TODO comment",
        ),
        Rule::new(
            CodeQuality,
            "FIXME",
            r"//\s*FIXME|/\*\s*FIXME|#\s*FIXME",
            Error,
            "FIXME comment",
        ),
        Rule::new(
            CodeQuality,
            "BUG",
            r"//\s*BUG|/\*\s*BUG|#\s*BUG",
            Critical,
            "BUG comment",
        ),
        Rule::new(
            CodeQuality,
            "HACK",
            r"//\s*HACK|/\*\s*HACK|#\s*HACK",
            Warning,
            "HACK comment",
        ),
        Rule::new(
            CodeQuality,
            "XXX",
            r"//\s*XXX|/\*\s*XXX|#\s*XXX",
            Warning,
            "XXX comment",
        ),
        Rule::new(
            CodeQuality,
            "console.log",
            r"console\.log\(",
            Info,
            "Debug console.log",
        ),
        Rule::new(
            CodeQuality,
            "console.error",
            r"console\.error\(",
            Info,
            "Console.error",
        ),
        Rule::new(
            CodeQuality,
            "debugger",
            r"\bdebugger\b",
            Warning,
            "Debugger statement",
        ),
        Rule::new(
            CodeQuality,
            "alert",
            r"\balert\s*\(",
            Warning,
            "Alert statement",
        ),
        Rule::new(
            CodeQuality,
            "confirm",
            r"\bconfirm\s*\(",
            Warning,
            "Confirm dialog",
        ),
        Rule::new(
            CodeQuality,
            "eval",
            r"\beval\s*\(",
            Critical,
            "eval() used - security risk",
        ),
        Rule::new(
            CodeQuality,
            "localStorage",
            r"localStorage\.(getItem|setItem|removeItem|clear)",
            Info,
            "Direct localStorage usage",
        ),
        Rule::new(
            CodeQuality,
            "sessionStorage",
            r"sessionStorage\.(getItem|setItem|removeItem|clear)",
            Info,
            "Direct sessionStorage usage",
        ),
        Rule::new(
            CodeQuality,
            "fetch_no_catch",
            r"fetch\([^)]+\)\s*;",
            Warning,
            "Fetch without error handling",
        ),
        Rule::new(
            CodeQuality,
            "async_no_await",
            r"async\s+function[^{]*\{\s*\}",
            Warning,
            "Async function without await",
        ),
        Rule::new(
            CodeQuality,
            "empty_catch",
            r"catch\s*\([^)]*\)\s*\{\s*\}",
            Warning,
            "Empty catch block - handle errors properly",
        ),
    ]
}

/// Import/export hygiene rules.
fn import_rules() -> Vec<Rule> {
    use RuleCategory::Imports;
    use Severity::{Info, Warning};

    vec![
        Rule::new(
            Imports,
            "wildcard_import",
            r"import\s+\*\s+as\s+\w+\s+from",
            Warning,
            "Wildcard import (affects tree-shaking)",
        ),
        Rule::new(
            Imports,
            "deep_relative",
            r#"from\s+['"](\.\./){4,}"#,
            Warning,
            "Deep relative import (consider path alias)",
        ),
        Rule::new(
            Imports,
            "unused_import_likely",
            r"import\s+\{[^}]{80,}\}\s+from",
            Info,
            "Large import statement - verify all are used",
        ),
        Rule::new(
            Imports,
            "require_usage",
            r"\brequire\s*\(",
            Info,
            "CommonJS require() in modern codebase",
        ),
    ]
}
