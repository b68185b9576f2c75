//! `@SuppressWarnings` support.
//!
//! A declaration annotated with `@SuppressWarnings("S107")`, `"java:S107"`
//! or `"all"` has the named rules silenced on every line it covers.

use super::{Exclusions, IssueFilter, RuleScope};
use crate::detect::UnitView;
use crate::semantic::SemanticContext;
use crate::tree::{Node, NodeKind};

pub const SUPPRESS_WARNINGS_ANNOTATION: &str = "java.lang.SuppressWarnings";

const ALL: &str = "all";

#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressWarningsFilter;

impl SuppressWarningsFilter {
    pub fn new() -> Self {
        Self
    }
}

fn is_suppress_warnings(annotation: Node<'_>, ctx: &SemanticContext) -> bool {
    match annotation.binding() {
        Some(b) if !ctx.type_of(b).is_unknown() => {
            ctx.type_of(b).is(SUPPRESS_WARNINGS_ANNOTATION)
        }
        _ => annotation
            .name()
            .is_some_and(|name| name.ends_with("SuppressWarnings")),
    }
}

/// String literal values inside the annotation's arguments, unquoted.
fn suppressed_names<'t>(annotation: Node<'t>) -> impl Iterator<Item = &'t str> + 't {
    annotation
        .descendants()
        .filter(|n| n.kind() == NodeKind::Literal)
        .filter_map(|n| n.text())
        .filter_map(|text| text.strip_prefix('"').and_then(|t| t.strip_suffix('"')))
}

impl IssueFilter for SuppressWarningsFilter {
    fn name(&self) -> &'static str {
        "suppress-warnings"
    }

    fn filtered_rules(&self) -> RuleScope {
        RuleScope::AnyRule
    }

    fn scan(&self, unit: UnitView<'_>) -> Exclusions {
        let ctx = unit.semantic;
        let mut out = Exclusions::new();
        for annotation in unit.tree.nodes().filter(|n| n.kind() == NodeKind::Annotation) {
            if !is_suppress_warnings(annotation, ctx) {
                continue;
            }
            let Some(declaration) = annotation.parent() else {
                continue;
            };
            for name in suppressed_names(annotation) {
                if name == ALL {
                    out.exclude_lines_for_any_rule(declaration.span());
                } else {
                    out.exclude_lines(name, declaration.span());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::detect::{Finding, RuleKey};
    use crate::frontend::MemoryResolver;
    use crate::semantic::{BindingId, TypeKind};
    use crate::tree::{Span, Tree, TreeBuilder};

    fn suppressed_method(
        b: &mut TreeBuilder,
        lines: (usize, usize),
        values: &[&str],
        binding: Option<BindingId>,
    ) {
        let m = b.start(NodeKind::Method, Span::lines(lines.0, lines.1));
        b.set_name(m, "m", Span::at(lines.0 + 1, 8, 9));
        let a = b.start(NodeKind::Annotation, Span::at(lines.0, 1, 40));
        b.set_name(a, "SuppressWarnings", Span::at(lines.0, 2, 18));
        if let Some(binding) = binding {
            b.set_binding(a, binding);
        }
        b.start(NodeKind::Arguments, Span::at(lines.0, 18, 40));
        for value in values {
            let lit = b.leaf(NodeKind::Literal, Span::at(lines.0, 19, 25));
            b.set_text(lit, format!("\"{value}\""));
        }
        b.finish();
        b.finish();
        b.finish();
    }

    fn scan(tree: &Tree, semantic: &SemanticContext) -> Exclusions {
        SuppressWarningsFilter::new().scan(UnitView {
            path: "T.java",
            source: "",
            tree,
            semantic,
        })
    }

    #[test]
    fn test_named_rules_and_prefix() {
        let mut r = MemoryResolver::new();
        let sw = r.declare_type(SUPPRESS_WARNINGS_ANNOTATION, TypeKind::Annotation);
        let semantic = SemanticContext::new(Arc::new(r));

        let mut b = TreeBuilder::new(Span::lines(1, 20));
        suppressed_method(&mut b, (1, 4), &["S107", "java:S100"], Some(sw));
        let tree = b.build();

        let exclusions = scan(&tree, &semantic);
        assert_eq!(exclusions.lines_for("S107"), vec![1, 2, 3, 4]);
        assert_eq!(exclusions.lines_for("S100"), vec![1, 2, 3, 4]);
        assert!(exclusions.lines_for("S1185").is_empty());
    }

    #[test]
    fn test_all_suppresses_every_rule() {
        let semantic = SemanticContext::new(Arc::new(MemoryResolver::new()));
        let mut b = TreeBuilder::new(Span::lines(1, 20));
        suppressed_method(&mut b, (5, 7), &["all"], None);
        let tree = b.build();

        let exclusions = scan(&tree, &semantic);
        assert!(exclusions.excludes(&Finding::new(RuleKey::new("S7158"), Span::at(6, 1, 2), "m")));
        assert!(!exclusions.excludes(&Finding::new(RuleKey::new("S7158"), Span::at(8, 1, 2), "m")));
    }

    #[test]
    fn test_other_annotation_is_ignored() {
        let mut r = MemoryResolver::new();
        let other = r.declare_type("com.acme.SuppressWarnings", TypeKind::Annotation);
        let semantic = SemanticContext::new(Arc::new(r));

        let mut b = TreeBuilder::new(Span::lines(1, 20));
        suppressed_method(&mut b, (1, 2), &["S107"], Some(other));
        let tree = b.build();

        assert!(scan(&tree, &semantic).is_empty());
    }
}
