use super::STRING_BUILDER_IS_EMPTY;
use crate::detect::{Detector, QuickFix, RuleKey, TextEdit, VisitContext};
use crate::matchers::{MatcherSet, MethodMatcher};
use crate::semantic::SemanticContext;
use crate::tree::{Node, NodeKind, Role, Span};

const STRING: &str = "java.lang.String";
const BUILDERS: &[&str] = &["java.lang.StringBuilder", "java.lang.StringBuffer"];
const MESSAGE: &str = "Replace this emptiness check with \"isEmpty()\".";

/// Emptiness checks on a `StringBuilder`/`StringBuffer` that build a
/// `String` first.
pub struct StringBuilderIsEmpty {
    to_string: MatcherSet,
    is_empty: MethodMatcher,
    length: MethodMatcher,
    equals: MethodMatcher,
}

impl StringBuilderIsEmpty {
    pub fn new() -> Self {
        Self {
            to_string: MatcherSet::any_of(
                BUILDERS
                    .iter()
                    .map(|builder| {
                        MethodMatcher::builder()
                            .of_types(&[*builder])
                            .names(&["toString"])
                            .without_parameters()
                            .build()
                    })
                    .collect(),
            ),
            is_empty: MethodMatcher::builder()
                .of_types(&[STRING])
                .names(&["isEmpty"])
                .without_parameters()
                .build(),
            length: MethodMatcher::builder()
                .of_types(&[STRING])
                .names(&["length"])
                .without_parameters()
                .build(),
            equals: MethodMatcher::builder()
                .of_types(&[STRING])
                .names(&["equals"])
                .with_parameters(&["java.lang.Object"])
                .build(),
        }
    }

    fn is_builder_to_string(&self, node: Option<Node<'_>>, ctx: &SemanticContext) -> bool {
        node.is_some_and(|n| self.to_string.matches(&n, ctx))
    }
}

impl Default for StringBuilderIsEmpty {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StringBuilderIsEmpty {
    fn key(&self) -> RuleKey {
        STRING_BUILDER_IS_EMPTY
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::MethodInvocation]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        let ctx = cx.semantic();

        // sb.toString().isEmpty()
        if self.is_empty.matches_invocation(&node, ctx) && self.is_builder_to_string(node.receiver(), ctx) {
            let fix = node
                .receiver()
                .and_then(|to_string| to_string.receiver())
                .map(|builder| {
                    let span = tail(builder.span(), node.span());
                    QuickFix::new("Replace with \"isEmpty()\"")
                        .with_edit(TextEdit::replace(span, ".isEmpty()"))
                });
            cx.report(node.span(), MESSAGE, fix);
            return Ok(());
        }

        // sb.toString().length() == 0
        if self.length.matches_invocation(&node, ctx) && self.is_builder_to_string(node.receiver(), ctx) {
            if let Some(comparison) = node.parent().filter(|p| is_zero_comparison(p, node)) {
                cx.report(comparison.span(), MESSAGE, None);
            }
            return Ok(());
        }

        // sb.toString().equals("") and "".equals(sb.toString())
        if self.equals.matches_invocation(&node, ctx) {
            let receiver = node.receiver();
            let argument = node.arguments().into_iter().next();
            let flagged = (self.is_builder_to_string(receiver, ctx) && is_empty_literal(argument))
                || (is_empty_literal(receiver) && self.is_builder_to_string(argument, ctx));
            if flagged {
                cx.report(node.span(), MESSAGE, None);
            }
        }
        Ok(())
    }
}

fn is_empty_literal(node: Option<Node<'_>>) -> bool {
    node.is_some_and(|n| n.kind() == NodeKind::Literal && n.text() == Some("\"\""))
}

/// `call == 0` or `0 == call`.
fn is_zero_comparison(parent: &Node<'_>, call: Node<'_>) -> bool {
    parent.kind() == NodeKind::Binary
        && parent.text() == Some("==")
        && call.role() == Role::Operand
        && parent
            .operands()
            .iter()
            .any(|o| *o != call && o.kind() == NodeKind::Literal && o.text() == Some("0"))
}

/// From the end of `first` to the end of `last`.
fn tail(first: Span, last: Span) -> Span {
    Span {
        start_line: first.end_line,
        start_col: first.end_col,
        start_byte: first.end_byte,
        ..last
    }
}
