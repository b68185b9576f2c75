//! Inline suppression of findings via comments.
//!
//! Supports suppression comments like:
//! - `// semacheck:ignore <rule> - <reason>`
//! - `// semacheck:ignore-next-line <rule> - <reason>`
//! - `// semacheck:ignore-file <rule> - <reason>`
//!
//! `<rule>` is a rule key (`S107` or `java:S107`) or `*` for every rule.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::{Exclusions, IssueFilter, RuleScope};
use crate::detect::UnitView;
use crate::tree::Span;

/// File-level directives are only honored this far into the file, unless
/// the leading comment block runs longer.
const HEADER_LINES: usize = 10;

const ANY_RULE: &str = "*";

/// How a directive applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveScope {
    /// Applies to the same line
    Line,
    /// Applies to the next line
    NextLine,
    /// Applies to the entire unit
    File,
}

/// An inline suppression directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineDirective {
    /// Rule to suppress, or `*` for all
    pub rule: String,
    pub reason: String,
    /// Line of the comment (1-indexed)
    pub line: usize,
    pub scope: DirectiveScope,
}

static DIRECTIVE_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"//\s*semacheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?")
            .expect("line comment directive pattern"),
        Regex::new(r"/\*\s*semacheck:(ignore(?:-file|-next-line)?)\s+(\S+?)\s*(?:-\s*(.*?))?\s*\*/")
            .expect("block comment directive pattern"),
    ]
});

fn is_comment_or_empty(line: &str) -> bool {
    line.is_empty() || line.starts_with("//") || line.starts_with("/*") || line.starts_with('*')
}

/// Parse suppression directives from Java source text.
pub fn parse_directives(source: &str) -> Vec<InlineDirective> {
    let mut directives = Vec::new();
    let mut in_header = true;

    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        if in_header && !is_comment_or_empty(line.trim()) {
            in_header = false;
        }

        let Some(caps) = DIRECTIVE_PATTERNS.iter().find_map(|p| p.captures(line)) else {
            continue;
        };
        let directive = caps.get(1).map_or("", |m| m.as_str());
        let rule = caps.get(2).map_or("", |m| m.as_str());
        let reason = caps.get(3).map_or("", |m| m.as_str().trim());

        let scope = match directive {
            "ignore-file" => {
                if !in_header && line_number > HEADER_LINES {
                    continue;
                }
                DirectiveScope::File
            }
            "ignore-next-line" => DirectiveScope::NextLine,
            "ignore" => {
                // Trailing comment covers its own line; a comment alone on
                // its line covers the next one.
                let start = caps.get(0).map_or(0, |m| m.start());
                if line[..start].trim().is_empty() {
                    DirectiveScope::NextLine
                } else {
                    DirectiveScope::Line
                }
            }
            _ => continue,
        };

        directives.push(InlineDirective {
            rule: rule.to_string(),
            reason: reason.to_string(),
            line: line_number,
            scope,
        });
    }

    directives
}

/// Filter honoring `semacheck:` comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineCommentFilter;

impl InlineCommentFilter {
    pub fn new() -> Self {
        Self
    }
}

impl IssueFilter for InlineCommentFilter {
    fn name(&self) -> &'static str {
        "inline-comment"
    }

    fn filtered_rules(&self) -> RuleScope {
        RuleScope::AnyRule
    }

    fn scan(&self, unit: UnitView<'_>) -> Exclusions {
        let mut out = Exclusions::new();
        for directive in parse_directives(unit.source) {
            let any = directive.rule == ANY_RULE;
            match directive.scope {
                DirectiveScope::File if any => out.exclude_unit_for_any_rule(),
                DirectiveScope::File => out.exclude_unit(&directive.rule),
                DirectiveScope::Line | DirectiveScope::NextLine => {
                    let line = match directive.scope {
                        DirectiveScope::NextLine => directive.line + 1,
                        _ => directive.line,
                    };
                    if any {
                        out.exclude_lines_for_any_rule(Span::lines(line, line));
                    } else {
                        out.exclude_line(&directive.rule, line);
                    }
                }
            }
        }
        out
    }
}
