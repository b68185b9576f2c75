use super::SERVLET_INSTANCE_FIELD;
use crate::detect::{Detector, RuleKey, VisitContext};
use crate::tree::{Modifier, Node, NodeKind, Role};

const SERVLET_TYPES: &[&str] = &["javax.servlet.http.HttpServlet", "javax.servlet.GenericServlet"];

/// Servlets are shared between requests; mutable instance state is a race.
pub struct ServletInstanceField;

impl Detector for ServletInstanceField {
    fn key(&self) -> RuleKey {
        SERVLET_INSTANCE_FIELD
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::Variable]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        if node.role() != Role::Member
            || node.has_modifier(Modifier::Static)
            || node.has_modifier(Modifier::Final)
        {
            return Ok(());
        }
        let in_servlet = node
            .enclosing_type()
            .and_then(|owner| owner.binding())
            .map(|b| cx.semantic().type_symbol(b).as_type())
            .is_some_and(|owner| SERVLET_TYPES.iter().any(|s| owner.is_subtype_of(s)));
        if in_servlet {
            cx.report(
                node.name_span(),
                "Remove this misleading mutable servlet instance field or make it \"static\" and/or \"final\"",
                None,
            );
        }
        Ok(())
    }
}
