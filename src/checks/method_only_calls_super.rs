use super::{METHOD_ONLY_CALLS_SUPER, OVERRIDE_ANNOTATION};
use crate::detect::{Detector, RuleKey, VisitContext};
use crate::semantic::SemanticContext;
use crate::tree::{Node, NodeKind};

/// Overriding methods whose whole body forwards to the same method of the
/// superclass with the same arguments.
pub struct MethodOnlyCallsSuper;

impl Detector for MethodOnlyCallsSuper {
    fn key(&self) -> RuleKey {
        METHOD_ONLY_CALLS_SUPER
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::Method]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        if only_override_annotations(node, cx.semantic()) && only_calls_super(node) {
            cx.report(node.name_span(), "Remove this method to simply inherit it.", None);
        }
        Ok(())
    }
}

fn only_override_annotations(node: Node<'_>, ctx: &SemanticContext) -> bool {
    node.annotations().all(|annotation| {
        match annotation.binding().map(|b| ctx.type_of(b)) {
            Some(ty) if !ty.is_unknown() => ty.is(OVERRIDE_ANNOTATION),
            _ => annotation.name() == Some("Override"),
        }
    })
}

fn only_calls_super(node: Node<'_>) -> bool {
    let Some(body) = node.body() else {
        return false;
    };
    let statements = body.statements();
    let [statement] = statements.as_slice() else {
        return false;
    };
    if !matches!(statement.kind(), NodeKind::ExpressionStatement | NodeKind::Return) {
        return false;
    }
    let Some(call) = statement.expression() else {
        return false;
    };
    if call.kind() != NodeKind::MethodInvocation
        || call.name() != node.name()
        || call.receiver().map(|r| r.kind()) != Some(NodeKind::Super)
    {
        return false;
    }

    let parameters = node.parameters();
    let arguments = call.arguments();
    parameters.len() == arguments.len()
        && parameters.iter().zip(&arguments).all(|(parameter, argument)| {
            argument.kind() == NodeKind::Identifier && argument.name() == parameter.name()
        })
}

#[cfg(all(test, feature = "tree-sitter"))]
mod tests {
    use super::*;
    use crate::checks::testing::{check, lines};

    #[test]
    fn test_forwarding_overrides() {
        let findings = check(
            MethodOnlyCallsSuper,
            r#"
class Child extends Parent {
    @Override
    public void run(int a, int b) { super.run(a, b); }
    @Override
    public int size() { return super.size(); }
    public void swapped(int a, int b) { super.swapped(b, a); }
    public void other(int a) { super.run(a, a); }
    public void more(int a) { super.more(a); log(); }
    @Deprecated
    public void old() { super.old(); }
    void log() {}
}
class Parent {
    public void run(int a, int b) {}
    public int size() { return 0; }
    public void swapped(int a, int b) {}
    public void more(int a) {}
    public void old() {}
}
"#,
        );
        assert_eq!(lines(&findings), vec![4, 6]);
    }

    #[test]
    fn test_empty_and_abstract_methods() {
        let findings = check(
            MethodOnlyCallsSuper,
            r#"
abstract class A {
    abstract void run();
    void empty() {}
}
"#,
        );
        assert!(findings.is_empty());
    }
}
