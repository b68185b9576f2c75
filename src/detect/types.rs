//! Core types for detection results.

use std::fmt;

use serde::Serialize;

use crate::semantic::CacheStats;
use crate::tree::Span;

/// Identity of a detector, e.g. `S107`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RuleKey(&'static str);

impl RuleKey {
    pub const fn new(key: &'static str) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Accepts the bare key and the repository-prefixed form (`java:S107`).
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        name == self.0 || name.strip_prefix("java:") == Some(self.0)
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// One text replacement of a quick fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub span: Span,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }
}

/// Structured fix attached to a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickFix {
    pub description: String,
    pub edits: Vec<TextEdit>,
}

impl QuickFix {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            edits: Vec::new(),
        }
    }

    pub fn with_edit(mut self, edit: TextEdit) -> Self {
        self.edits.push(edit);
        self
    }
}

/// A candidate issue produced by a detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: RuleKey,
    pub message: String,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<QuickFix>,
}

impl Finding {
    pub fn new(rule: RuleKey, span: Span, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
            span,
            fix: None,
        }
    }

    /// Line the finding is anchored on; filters work at this granularity.
    pub fn line(&self) -> usize {
        self.span.start_line
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.span, self.rule, self.message)
    }
}

/// A finding removed by an issue filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuppressedFinding {
    pub finding: Finding,
    /// Name of the first filter that excluded it.
    pub filter: &'static str,
}

/// Outcome of analyzing one unit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitReport {
    pub path: String,
    pub findings: Vec<Finding>,
    pub suppressed: Vec<SuppressedFinding>,
    /// Detectors that failed on this unit; their findings were dropped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faulted_rules: Vec<RuleKey>,
    pub cache: CacheStats,
}

impl UnitReport {
    pub fn findings_for(&self, rule: RuleKey) -> impl Iterator<Item = &Finding> + '_ {
        self.findings.iter().filter(move |f| f.rule == rule)
    }

    pub fn suppressed_count(&self) -> usize {
        self.suppressed.len()
    }
}

/// A unit whose analysis failed as a whole.
#[derive(Debug, Clone, Serialize)]
pub struct UnitFailure {
    pub path: String,
    pub error: String,
}

/// Results of analyzing many units.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisResult {
    pub reports: Vec<UnitReport>,
    pub failures: Vec<UnitFailure>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: AnalysisResult) {
        self.reports.extend(other.reports);
        self.failures.extend(other.failures);
    }

    pub fn finding_count(&self) -> usize {
        self.reports.iter().map(|r| r.findings.len()).sum()
    }

    pub fn suppressed_count(&self) -> usize {
        self.reports.iter().map(|r| r.suppressed.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
