use super::AT_LEAST_ONE_CONSTRUCTOR;
use crate::detect::{Detector, RuleKey, VisitContext};
use crate::tree::{Modifier, Node, NodeKind};

/// Classes with uninitialized instance fields should declare a constructor.
pub struct AtLeastOneConstructor;

impl Detector for AtLeastOneConstructor {
    fn key(&self) -> RuleKey {
        AT_LEAST_ONE_CONSTRUCTOR
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::Class, NodeKind::Enum]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        // Anonymous classes cannot declare constructors.
        if node.name().is_none() || node.has_modifier(Modifier::Abstract) {
            return Ok(());
        }
        let has_constructor = node.members().any(|m| m.kind() == NodeKind::Constructor);
        let needs_constructor = node.members().any(|m| {
            m.kind() == NodeKind::Variable
                && !m.has_modifier(Modifier::Static)
                && m.initializer().is_none()
        });
        if needs_constructor && !has_constructor {
            cx.report(
                node.name_span(),
                "Add a constructor to the class, or provide default values.",
                None,
            );
        }
        Ok(())
    }
}
