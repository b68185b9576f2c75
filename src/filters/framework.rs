//! Spring-awareness filter.
//!
//! Framework conventions make several general-purpose rules noisy: injected
//! fields replace constructors, request handlers legitimately take many
//! parameters, Spring Data derives queries from `find_ByName`-style method
//! names. This filter removes those findings using annotation metadata and,
//! where the resolver failed, annotation name tokens.

use super::{has_unknown_annotation_named, Exclusions, IssueFilter, RuleScope};
use crate::checks::{
    AT_LEAST_ONE_CONSTRUCTOR, BAD_METHOD_NAME, METHOD_ONLY_CALLS_SUPER, OPTIONAL_AS_PARAMETER,
    SERVLET_INSTANCE_FIELD, TOO_MANY_PARAMETERS,
};
use crate::config::FrameworkFilterConfig;
use crate::detect::UnitView;
use crate::semantic::SemanticContext;
use crate::tree::{Node, NodeKind};

pub const AUTOWIRED_ANNOTATION: &str = "org.springframework.beans.factory.annotation.Autowired";
pub const TRANSACTIONAL_ANNOTATION: &str =
    "org.springframework.transaction.annotation.Transactional";
pub const DATA_REPOSITORY: &str = "org.springframework.data.repository.Repository";

const METHOD_ANNOTATION_EXCEPTIONS: &[&str] = &[
    "org.springframework.web.bind.annotation.RequestMapping",
    "org.springframework.web.bind.annotation.GetMapping",
    "org.springframework.web.bind.annotation.PostMapping",
    "org.springframework.web.bind.annotation.PutMapping",
    "org.springframework.web.bind.annotation.DeleteMapping",
    "org.springframework.web.bind.annotation.PatchMapping",
    "org.springframework.context.annotation.Bean",
    AUTOWIRED_ANNOTATION,
];

const CLASS_ANNOTATION_EXCEPTIONS: &[&str] = &[
    "org.springframework.stereotype.Component",
    "org.springframework.context.annotation.Configuration",
    "org.springframework.stereotype.Service",
    "org.springframework.stereotype.Repository",
];

#[derive(Debug, Clone)]
pub struct FrameworkFilter {
    method_exceptions: Vec<String>,
    class_exceptions: Vec<String>,
}

impl Default for FrameworkFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameworkFilter {
    pub fn new() -> Self {
        Self {
            method_exceptions: METHOD_ANNOTATION_EXCEPTIONS.iter().map(|s| s.to_string()).collect(),
            class_exceptions: CLASS_ANNOTATION_EXCEPTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Built-in exception lists extended with configured annotations.
    pub fn from_config(config: &FrameworkFilterConfig) -> Self {
        let mut filter = Self::new();
        filter
            .method_exceptions
            .extend(config.method_annotation_exceptions.iter().cloned());
        filter
            .class_exceptions
            .extend(config.class_annotation_exceptions.iter().cloned());
        filter
    }

    fn visit_type(&self, node: Node<'_>, ctx: &SemanticContext, out: &mut Exclusions) {
        let metadata = node.binding().map(|b| ctx.type_symbol(b).metadata());
        let transactional = metadata
            .as_ref()
            .is_some_and(|m| m.is_annotated_with(TRANSACTIONAL_ANNOTATION))
            || has_unknown_annotation_named(node, ctx, "Transactional");
        out.exclude_lines_if(transactional, METHOD_ONLY_CALLS_SUPER, node.span());

        let autowired_field = node
            .members()
            .filter(|m| m.kind() == NodeKind::Variable)
            .any(|field| is_autowired(field, ctx));
        out.exclude_lines_if(autowired_field, AT_LEAST_ONE_CONSTRUCTOR, node.name_span());
    }

    fn visit_constructor(&self, node: Node<'_>, ctx: &SemanticContext, out: &mut Exclusions) {
        let Some(binding) = node.binding() else {
            return;
        };
        let owner_excepted = ctx
            .method_symbol(binding)
            .owner()
            .is_some_and(|owner| owner.metadata().is_annotated_with_any(&self.class_exceptions));
        out.exclude_lines_if(owner_excepted, TOO_MANY_PARAMETERS, node.name_span());
    }

    fn visit_method(&self, node: Node<'_>, ctx: &SemanticContext, out: &mut Exclusions) {
        let Some(binding) = node.binding() else {
            return;
        };
        let symbol = ctx.method_symbol(binding);
        let metadata = symbol.metadata();
        let name_span = node.name_span();

        out.exclude_lines_if(
            metadata.is_annotated_with_any(&self.method_exceptions),
            TOO_MANY_PARAMETERS,
            name_span,
        );
        out.exclude_lines_if(
            is_repository_property_expression(node, ctx),
            BAD_METHOD_NAME,
            name_span,
        );
        let header = node
            .parameter_list()
            .map(|params| name_span.to(&params.span()))
            .unwrap_or(name_span);
        out.exclude_lines_if(
            metadata.is_annotated_with(AUTOWIRED_ANNOTATION),
            OPTIONAL_AS_PARAMETER,
            header,
        );
    }
}

/// Spring Data property expression: a `_` strictly inside the method name, in
/// a subtype of the data `Repository` interface.
///
/// Needs the type hierarchy, so it has no token fallback. With a degraded
/// class path the naming findings on such methods stay.
fn is_repository_property_expression(node: Node<'_>, ctx: &SemanticContext) -> bool {
    let Some(name) = node.name() else {
        return false;
    };
    let separator_inside = name
        .find('_')
        .is_some_and(|position| position > 0 && position < name.len() - 1);
    separator_inside
        && node
            .binding()
            .and_then(|b| ctx.method_symbol(b).owner())
            .map(|owner| owner.declared_type())
            .is_some_and(|owner_type| owner_type.is_subtype_of(DATA_REPOSITORY))
}

fn is_autowired(variable: Node<'_>, ctx: &SemanticContext) -> bool {
    variable
        .binding()
        .is_some_and(|b| ctx.variable_symbol(b).metadata().is_annotated_with(AUTOWIRED_ANNOTATION))
        || has_unknown_annotation_named(variable, ctx, "Autowired")
}

impl IssueFilter for FrameworkFilter {
    fn name(&self) -> &'static str {
        "framework"
    }

    fn filtered_rules(&self) -> RuleScope {
        RuleScope::Rules(vec![
            BAD_METHOD_NAME,
            TOO_MANY_PARAMETERS,
            METHOD_ONLY_CALLS_SUPER,
            AT_LEAST_ONE_CONSTRUCTOR,
            SERVLET_INSTANCE_FIELD,
            OPTIONAL_AS_PARAMETER,
        ])
    }

    fn scan(&self, unit: UnitView<'_>) -> Exclusions {
        let ctx = unit.semantic;
        let mut out = Exclusions::new();
        for node in unit.tree.nodes() {
            match node.kind() {
                kind if kind.is_type_declaration() => self.visit_type(node, ctx, &mut out),
                NodeKind::Variable => {
                    out.exclude_lines_if(is_autowired(node, ctx), SERVLET_INSTANCE_FIELD, node.span())
                }
                NodeKind::Constructor => self.visit_constructor(node, ctx, &mut out),
                NodeKind::Method => self.visit_method(node, ctx, &mut out),
                _ => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::frontend::MemoryResolver;
    use crate::semantic::{BindingId, TypeKind, ROOT_TYPE_NAME};
    use crate::tree::{NodeId, Role, Span, Tree, TreeBuilder};

    struct Unit {
        tree: Tree,
        semantic: SemanticContext,
    }

    impl Unit {
        fn scan(&self) -> Exclusions {
            FrameworkFilter::new().scan(UnitView {
                path: "T.java",
                source: "",
                tree: &self.tree,
                semantic: &self.semantic,
            })
        }
    }

    fn annotate(b: &mut TreeBuilder, line: usize, name: &str, binding: BindingId) -> NodeId {
        let a = b.leaf(NodeKind::Annotation, Span::at(line, 1, 2 + name.len()));
        b.set_name(a, name, Span::at(line, 2, 2 + name.len())).set_binding(a, binding);
        a
    }

    #[test]
    fn test_transactional_class_and_autowired_field() {
        let mut r = MemoryResolver::new();
        let object = r.declare_type(ROOT_TYPE_NAME, TypeKind::Class);
        let transactional = r.declare_type(TRANSACTIONAL_ANNOTATION, TypeKind::Annotation);
        let autowired = r.unresolved_type("Autowired");
        let class = r.declare_type("p.Service", TypeKind::Class);
        r.set_superclass(class, object);
        r.add_annotation(class, transactional);
        let field = r.declare_field(class, "repo", object);
        r.add_annotation(field, autowired);

        // 1 @Transactional
        // 2 class Service {
        // 3   @Autowired
        // 4   Object repo;
        // 5 }
        let mut b = TreeBuilder::new(Span::lines(1, 5));
        let c = b.start(NodeKind::Class, Span::lines(1, 5));
        b.set_name(c, "Service", Span::at(2, 7, 14)).set_binding(c, class);
        annotate(&mut b, 1, "Transactional", transactional);
        let f = b.start(NodeKind::Variable, Span::lines(3, 4));
        b.set_role(f, Role::Member)
            .set_name(f, "repo", Span::at(4, 10, 14))
            .set_binding(f, field);
        annotate(&mut b, 3, "Autowired", autowired);
        b.finish();
        b.finish();
        let unit = Unit {
            tree: b.build(),
            semantic: SemanticContext::new(Arc::new(r)),
        };

        let exclusions = unit.scan();
        assert_eq!(exclusions.lines_for("S1185"), vec![1, 2, 3, 4, 5]);
        assert_eq!(exclusions.lines_for("S1258"), vec![2]);
        assert_eq!(exclusions.lines_for("S2226"), vec![3, 4]);
    }

    #[test]
    fn test_too_many_parameters_exceptions() {
        let mut r = MemoryResolver::new();
        let object = r.declare_type(ROOT_TYPE_NAME, TypeKind::Class);
        let component = r.declare_type("org.springframework.stereotype.Component", TypeKind::Annotation);
        let get = r.declare_type("org.springframework.web.bind.annotation.GetMapping", TypeKind::Annotation);
        let class = r.declare_type("p.Web", TypeKind::Class);
        r.set_superclass(class, object);
        r.add_annotation(class, component);
        let ctor = r.declare_constructor(class, &[]);
        let handler = r.declare_method(class, "handle", &[], None);
        r.add_annotation(handler, get);
        let plain = r.declare_method(class, "plain", &[], None);

        let mut b = TreeBuilder::new(Span::lines(1, 10));
        let c = b.start(NodeKind::Class, Span::lines(1, 10));
        b.set_name(c, "Web", Span::at(1, 7, 10)).set_binding(c, class);
        let k = b.leaf(NodeKind::Constructor, Span::lines(2, 3));
        b.set_role(k, Role::Member).set_name(k, "Web", Span::at(2, 3, 6)).set_binding(k, ctor);
        let h = b.start(NodeKind::Method, Span::lines(4, 6));
        b.set_role(h, Role::Member).set_name(h, "handle", Span::at(5, 8, 14)).set_binding(h, handler);
        annotate(&mut b, 4, "GetMapping", get);
        b.finish();
        let p = b.leaf(NodeKind::Method, Span::lines(7, 8));
        b.set_role(p, Role::Member).set_name(p, "plain", Span::at(7, 8, 13)).set_binding(p, plain);
        b.finish();
        let unit = Unit {
            tree: b.build(),
            semantic: SemanticContext::new(Arc::new(r)),
        };

        assert_eq!(unit.scan().lines_for("S107"), vec![2, 5]);
    }

    #[test]
    fn test_repository_property_expression_needs_semantics() {
        let mut r = MemoryResolver::new();
        let repository = r.declare_type(DATA_REPOSITORY, TypeKind::Interface);
        let repo = r.declare_type("p.PersonRepository", TypeKind::Interface);
        r.add_interface(repo, repository);
        let find = r.declare_method(repo, "findBy_lastName", &[], None);
        let edge = r.declare_method(repo, "_leading", &[], None);
        let missing = r.unresolved_type("Repository");
        let other = r.declare_type("p.Other", TypeKind::Interface);
        r.add_interface(other, missing);
        let unresolved_find = r.declare_method(other, "findBy_name", &[], None);

        let mut b = TreeBuilder::new(Span::lines(1, 20));
        for (line, name, binding) in [
            (2, "findBy_lastName", find),
            (3, "_leading", edge),
            (12, "findBy_name", unresolved_find),
        ] {
            let m = b.leaf(NodeKind::Method, Span::lines(line, line));
            b.set_name(m, name, Span::at(line, 5, 5 + name.len())).set_binding(m, binding);
        }
        let unit = Unit {
            tree: b.build(),
            semantic: SemanticContext::new(Arc::new(r)),
        };

        assert_eq!(unit.scan().lines_for("S100"), vec![2]);
    }

    #[test]
    fn test_autowired_method_covers_parameter_list() {
        let mut r = MemoryResolver::new();
        let autowired = r.declare_type(AUTOWIRED_ANNOTATION, TypeKind::Annotation);
        let class = r.declare_type("p.C", TypeKind::Class);
        let setter = r.declare_method(class, "setThings", &[], None);
        r.add_annotation(setter, autowired);

        let mut b = TreeBuilder::new(Span::lines(1, 10));
        let m = b.start(NodeKind::Method, Span::lines(2, 6));
        b.set_name(m, "setThings", Span::at(3, 8, 17)).set_binding(m, setter);
        annotate(&mut b, 2, "Autowired", autowired);
        b.start(NodeKind::Parameters, Span {
            start_line: 3,
            start_col: 17,
            end_line: 5,
            end_col: 20,
            ..Span::default()
        });
        b.leaf(NodeKind::Parameter, Span::at(4, 5, 30));
        b.finish();
        b.finish();
        let unit = Unit {
            tree: b.build(),
            semantic: SemanticContext::new(Arc::new(r)),
        };

        let exclusions = unit.scan();
        assert_eq!(exclusions.lines_for("S3553"), vec![3, 4, 5]);
        assert_eq!(exclusions.lines_for("S107"), vec![3]);
    }

    #[test]
    fn test_extra_exceptions_from_config() {
        let config = FrameworkFilterConfig {
            method_annotation_exceptions: vec!["com.acme.Endpoint".to_string()],
            ..Default::default()
        };
        let filter = FrameworkFilter::from_config(&config);
        assert!(filter.method_exceptions.iter().any(|a| a == "com.acme.Endpoint"));
        assert_eq!(filter.class_exceptions.len(), CLASS_ANNOTATION_EXCEPTIONS.len());
    }
}
