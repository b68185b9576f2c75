use super::{is_override, TOO_MANY_PARAMETERS};
use crate::detect::{Detector, RuleKey, VisitContext};
use crate::tree::{Node, NodeKind};

/// Methods and constructors should not take more than `max` parameters.
pub struct TooManyParameters {
    max: usize,
}

impl TooManyParameters {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Detector for TooManyParameters {
    fn key(&self) -> RuleKey {
        TOO_MANY_PARAMETERS
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::Method, NodeKind::Constructor]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        let count = node.parameters().len();
        if count <= self.max || is_override(node, cx.semantic()) {
            return Ok(());
        }
        let what = if node.kind() == NodeKind::Constructor {
            "Constructor"
        } else {
            "Method"
        };
        cx.report(
            node.name_span(),
            format!(
                "{} has {} parameters, which is greater than {} authorized.",
                what, count, self.max
            ),
            None,
        );
        Ok(())
    }
}

#[cfg(all(test, feature = "tree-sitter"))]
mod tests {
    use super::*;
    use crate::checks::testing::{check, lines};

    #[test]
    fn test_methods_and_constructors_over_the_limit() {
        let findings = check(
            TooManyParameters::new(2),
            r#"
class A extends B {
    A(int a, int b, int c) {}
    void ok(int a, int b) {}
    void tooMany(int a, int b, int c) {}
    @Override
    void inherited(int a, int b, int c) {}
}
class B {
    void inherited(int a, int b, int c) {}
}
"#,
        );
        assert_eq!(lines(&findings), vec![3, 5, 10]);
        assert_eq!(
            findings[0].message,
            "Constructor has 3 parameters, which is greater than 2 authorized."
        );
        assert!(findings[1].message.starts_with("Method has 3"));
    }
}
