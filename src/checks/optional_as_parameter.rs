use super::OPTIONAL_AS_PARAMETER;
use crate::detect::{Detector, RuleKey, VisitContext};
use crate::tree::{Node, NodeKind};

/// `Optional` types and the value each one wraps.
const OPTIONAL_TYPES: &[(&str, Option<&str>)] = &[
    ("java.util.Optional", None),
    ("com.google.common.base.Optional", None),
    ("java.util.OptionalInt", Some("int")),
    ("java.util.OptionalLong", Some("long")),
    ("java.util.OptionalDouble", Some("double")),
];

/// `Optional` is meant for return values; as a parameter it adds a third
/// state on top of the null check callers still have to make.
pub struct OptionalAsParameter;

impl Detector for OptionalAsParameter {
    fn key(&self) -> RuleKey {
        OPTIONAL_AS_PARAMETER
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::Method]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        for parameter in node.parameters() {
            let Some(ty) = parameter.type_binding().map(|b| cx.semantic().type_of(b)) else {
                continue;
            };
            let Some(&(_, wrapped)) = OPTIONAL_TYPES.iter().find(|(name, _)| ty.is(name)) else {
                continue;
            };
            let wrapped = match wrapped {
                Some(primitive) => primitive.to_string(),
                None => type_argument(cx.unit().text(parameter.span()))
                    .unwrap_or("Object")
                    .to_string(),
            };
            let article = if wrapped.starts_with(['a', 'e', 'i', 'o', 'u']) {
                "an"
            } else {
                "a"
            };
            cx.report(
                parameter.span(),
                format!("Specify {} \"{}\" parameter instead.", article, wrapped),
                None,
            );
        }
        Ok(())
    }
}

/// `String` out of `Optional<String> name`.
fn type_argument(declaration: &str) -> Option<&str> {
    let start = declaration.find('<')?;
    let end = declaration.rfind('>')?;
    let argument = declaration.get(start + 1..end)?.trim();
    (!argument.is_empty() && argument != "?").then_some(argument)
}

#[cfg(all(test, feature = "tree-sitter"))]
mod tests {
    use super::*;
    use crate::checks::testing::{check, lines};

    #[test]
    fn test_optional_parameters() {
        let findings = check(
            OptionalAsParameter,
            r#"
import java.util.Optional;
import java.util.OptionalInt;

class A {
    void one(Optional<String> name, int count) {}
    void two(OptionalInt limit) {}
    void three(String name) {}
    Optional<String> four() { return Optional.empty(); }
}
"#,
        );
        assert_eq!(lines(&findings), vec![6, 7]);
        assert_eq!(findings[0].message, "Specify a \"String\" parameter instead.");
        assert_eq!(findings[1].message, "Specify an \"int\" parameter instead.");
        assert_eq!(findings[0].span.start_col, 14);
    }

    #[test]
    fn test_type_argument() {
        assert_eq!(type_argument("Optional<List<String>> xs"), Some("List<String>"));
        assert_eq!(type_argument("Optional<?> x"), None);
        assert_eq!(type_argument("OptionalInt x"), None);
    }
}
