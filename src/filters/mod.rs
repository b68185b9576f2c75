//! Post-dispatch issue filters.
//!
//! A filter scans the unit (usually only a few node kinds) and produces a set
//! of excluded (rule, line) pairs. It may only suppress findings of the rules
//! in its [`RuleScope`]. Filters compose by union: a finding survives only if
//! no filter excludes it.

mod framework;
mod inline;
mod suppress_warnings;

pub use framework::{
    FrameworkFilter, AUTOWIRED_ANNOTATION, DATA_REPOSITORY, TRANSACTIONAL_ANNOTATION,
};
pub use inline::InlineCommentFilter;
pub use suppress_warnings::SuppressWarningsFilter;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::detect::{Finding, RuleKey, SuppressedFinding, UnitView};
use crate::semantic::SemanticContext;
use crate::tree::{Node, Span};

/// Rules a filter is allowed to suppress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleScope {
    Rules(Vec<RuleKey>),
    AnyRule,
}

impl RuleScope {
    pub fn contains(&self, rule: RuleKey) -> bool {
        match self {
            RuleScope::Rules(rules) => rules.contains(&rule),
            RuleScope::AnyRule => true,
        }
    }
}

/// Rule name as written in suppression directives, without the
/// repository prefix.
pub(crate) fn rule_name(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix("java:").unwrap_or(name)
}

/// Excluded lines per rule, produced by one filter for one unit.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    lines: FxHashMap<String, FxHashSet<usize>>,
    any_rule_lines: FxHashSet<usize>,
    whole_unit: FxHashSet<String>,
    whole_unit_any_rule: bool,
}

impl Exclusions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude_line(&mut self, rule: &str, line: usize) {
        self.lines
            .entry(rule_name(rule).to_string())
            .or_default()
            .insert(line);
    }

    /// Exclude every line `span` covers.
    pub fn exclude_lines(&mut self, rule: &str, span: Span) {
        let lines = self.lines.entry(rule_name(rule).to_string()).or_default();
        lines.extend(span.line_range());
    }

    pub fn exclude_lines_if(&mut self, condition: bool, rule: RuleKey, span: Span) {
        if condition {
            self.exclude_lines(rule.as_str(), span);
        }
    }

    pub fn exclude_lines_for_any_rule(&mut self, span: Span) {
        self.any_rule_lines.extend(span.line_range());
    }

    pub fn exclude_unit(&mut self, rule: &str) {
        self.whole_unit.insert(rule_name(rule).to_string());
    }

    pub fn exclude_unit_for_any_rule(&mut self) {
        self.whole_unit_any_rule = true;
    }

    pub fn is_empty(&self) -> bool {
        self.lines.values().all(|l| l.is_empty())
            && self.any_rule_lines.is_empty()
            && self.whole_unit.is_empty()
            && !self.whole_unit_any_rule
    }

    pub fn excludes(&self, finding: &Finding) -> bool {
        let rule = finding.rule.as_str();
        let line = finding.line();
        self.whole_unit_any_rule
            || self.whole_unit.contains(rule)
            || self.any_rule_lines.contains(&line)
            || self
                .lines
                .get(rule)
                .is_some_and(|lines| lines.contains(&line))
    }

    /// Sorted excluded lines for one rule, whole-unit exclusions aside.
    pub fn lines_for(&self, rule: &str) -> Vec<usize> {
        let mut lines: Vec<usize> = self
            .lines
            .get(rule_name(rule))
            .into_iter()
            .flatten()
            .chain(self.any_rule_lines.iter())
            .copied()
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        lines.sort_unstable();
        lines
    }
}

/// A cross-cutting suppressor of specific detector findings.
///
/// Filters are shared by every worker, so `scan` keeps its state local and
/// returns it.
pub trait IssueFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn filtered_rules(&self) -> RuleScope;

    fn scan(&self, unit: UnitView<'_>) -> Exclusions;
}

/// Findings split by the filter pass.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub kept: Vec<Finding>,
    pub suppressed: Vec<SuppressedFinding>,
}

/// Ordered set of filters applied after dispatch.
#[derive(Default)]
pub struct FilterEngine {
    filters: Vec<Box<dyn IssueFilter>>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, filter: Box<dyn IssueFilter>) {
        self.filters.push(filter);
    }

    pub fn with(mut self, filter: Box<dyn IssueFilter>) -> Self {
        self.register(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run every filter over the unit and split `findings`.
    ///
    /// A filter whose scope covers none of the findings is not scanned.
    pub fn apply(&self, unit: UnitView<'_>, findings: Vec<Finding>) -> FilterOutcome {
        let scans: Vec<(&dyn IssueFilter, RuleScope, Exclusions)> = self
            .filters
            .iter()
            .filter_map(|filter| {
                let scope = filter.filtered_rules();
                if !findings.iter().any(|f| scope.contains(f.rule)) {
                    return None;
                }
                let exclusions = filter.scan(unit);
                Some((filter.as_ref(), scope, exclusions))
            })
            .collect();

        let mut outcome = FilterOutcome::default();
        for finding in findings {
            let suppressor = scans
                .iter()
                .find(|(_, scope, exclusions)| {
                    scope.contains(finding.rule) && exclusions.excludes(&finding)
                })
                .map(|(filter, _, _)| filter.name());
            match suppressor {
                Some(filter) => outcome.suppressed.push(SuppressedFinding { finding, filter }),
                None => outcome.kept.push(finding),
            }
        }
        debug!(
            path = unit.path,
            filters = scans.len(),
            kept = outcome.kept.len(),
            suppressed = outcome.suppressed.len(),
            "filters applied"
        );
        outcome
    }
}

/// Token fallback for annotations the resolver could not bind: true when
/// one of `node`'s unresolved annotations is written with a name ending in
/// `suffix`.
pub(crate) fn has_unknown_annotation_named(
    node: Node<'_>,
    ctx: &SemanticContext,
    suffix: &str,
) -> bool {
    node.annotations().any(|annotation| {
        let unresolved = annotation
            .binding()
            .map(|b| ctx.type_of(b).is_unknown())
            .unwrap_or(true);
        unresolved && annotation.name().is_some_and(|name| name.ends_with(suffix))
    })
}
