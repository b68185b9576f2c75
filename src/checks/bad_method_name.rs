use regex::Regex;

use super::{is_override, BAD_METHOD_NAME};
use crate::detect::{Detector, RuleKey, VisitContext};
use crate::tree::{Node, NodeKind};

/// Method names must match a configurable pattern.
pub struct BadMethodName {
    format: Regex,
}

impl BadMethodName {
    pub fn new(format: Regex) -> Self {
        Self { format }
    }
}

impl Detector for BadMethodName {
    fn key(&self) -> RuleKey {
        BAD_METHOD_NAME
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::Method]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        let Some(name) = node.name() else {
            return Ok(());
        };
        if self.format.is_match(name) || is_override(node, cx.semantic()) {
            return Ok(());
        }
        cx.report(
            node.name_span(),
            format!(
                "Rename this method name to match the regular expression '{}'.",
                self.format.as_str()
            ),
            None,
        );
        Ok(())
    }
}
