use super::CONTROLLER_WITH_SESSION_ATTRIBUTES;
use crate::detect::{Detector, RuleKey, VisitContext};
use crate::matchers::MethodMatcher;
use crate::tree::{Node, NodeKind};

const CONTROLLER: &str = "org.springframework.stereotype.Controller";
const SESSION_ATTRIBUTES: &str = "org.springframework.web.bind.annotation.SessionAttributes";
const SESSION_STATUS: &str = "org.springframework.web.bind.support.SessionStatus";

/// A `@SessionAttributes` controller must end the session with
/// `SessionStatus.setComplete()` somewhere.
pub struct ControllerWithSessionAttributes {
    set_complete: MethodMatcher,
}

impl ControllerWithSessionAttributes {
    pub fn new() -> Self {
        Self {
            set_complete: MethodMatcher::builder()
                .of_subtypes(&[SESSION_STATUS])
                .names(&["setComplete"])
                .without_parameters()
                .build(),
        }
    }
}

impl Default for ControllerWithSessionAttributes {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ControllerWithSessionAttributes {
    fn key(&self) -> RuleKey {
        CONTROLLER_WITH_SESSION_ATTRIBUTES
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::Class]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        let ctx = cx.semantic();
        let Some(binding) = node.binding() else {
            return Ok(());
        };
        if !ctx.type_symbol(binding).metadata().is_annotated_with(CONTROLLER) {
            return Ok(());
        }
        let Some(annotation) = node.annotations().find(|a| {
            a.binding()
                .is_some_and(|b| ctx.type_of(b).is(SESSION_ATTRIBUTES))
        }) else {
            return Ok(());
        };
        let completes = node
            .descendants()
            .filter(|n| n.kind() == NodeKind::MethodInvocation)
            .any(|call| self.set_complete.matches_invocation(&call, ctx));
        if !completes {
            cx.report(
                annotation.span(),
                "Add a call to \"setComplete()\" on the SessionStatus object in a \"@RequestMapping\" method.",
                None,
            );
        }
        Ok(())
    }
}
