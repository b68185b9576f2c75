//! Semantic model: types, symbols and annotation metadata over resolver
//! bindings.
//!
//! # Overview
//!
//! A [`Resolver`] hands out opaque [`BindingId`]s. A [`SemanticContext`] wraps
//! them into [`Type`], [`Symbol`] and [`TypeSymbol`] facades, once per binding,
//! and memoizes every derived query (supertypes, interfaces, members,
//! metadata, outermost class).
//!
//! Unresolved bindings never fail a query. They surface as the `UNKNOWN` type,
//! empty lists or `false`.

mod binding;
mod context;
mod metadata;
mod symbols;
mod types;

pub use binding::{BindingId, BindingKind, Resolver, TypeKind};
pub use context::{CacheStats, SemanticContext, ROOT_TYPE_NAME};
pub use metadata::{Annotation, Metadata};
pub use symbols::{Symbol, SymbolId, SymbolKind, TypeSymbol};
pub use types::{Type, TypeId, TypeList};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::error::SemanticError;
    use crate::frontend::MemoryResolver;

    fn jdk(r: &mut MemoryResolver) -> BindingId {
        r.declare_type(ROOT_TYPE_NAME, TypeKind::Class)
    }

    fn context(r: MemoryResolver) -> SemanticContext {
        SemanticContext::new(Arc::new(r))
    }

    #[test]
    fn test_identity_caching() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let c = r.declare_type("p.C", TypeKind::Class);
        r.set_superclass(c, object);
        let ctx = context(r);

        let first = ctx.type_symbol(c);
        let second = ctx.type_symbol(c);
        assert_eq!(first, second);
        assert_eq!(first.id(), second.id());
        assert_eq!(ctx.type_of(c), ctx.resolve_type("p.C"));
        assert_eq!(first.as_type(), ctx.type_of(c));

        // Facades work as map keys.
        let mut seen = HashMap::new();
        seen.insert(ctx.type_of(c), 1);
        seen.insert(ctx.resolve_type("p.C"), 2);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_linearization_order() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let i = r.declare_type("p.I", TypeKind::Interface);
        let c = r.declare_type("p.C", TypeKind::Class);
        r.set_superclass(c, object);
        r.add_interface(c, i);
        let c2 = r.declare_type("p.C2", TypeKind::Class);
        r.set_superclass(c2, c);
        let ctx = context(r);

        let names: Vec<String> = ctx
            .type_symbol(c2)
            .super_types()
            .iter()
            .map(|t| t.qualified_name().to_string())
            .collect();
        assert_eq!(names, vec!["p.C", "p.I", "java.lang.Object"]);
    }

    #[test]
    fn test_linearization_dedupes_shared_interfaces() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let base = r.declare_type("p.Base", TypeKind::Interface);
        let left = r.declare_type("p.Left", TypeKind::Interface);
        r.add_interface(left, base);
        let right = r.declare_type("p.Right", TypeKind::Interface);
        r.add_interface(right, base);
        let c = r.declare_type("p.C", TypeKind::Class);
        r.set_superclass(c, object);
        r.add_interface(c, left);
        r.add_interface(c, right);
        let ctx = context(r);

        let names: Vec<String> = ctx
            .type_symbol(c)
            .super_types()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["Left", "Base", "Right", "Object"]);
    }

    #[test]
    fn test_super_types_memoized() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let c = r.declare_type("p.C", TypeKind::Class);
        r.set_superclass(c, object);
        let ctx = context(r);

        let symbol = ctx.type_symbol(c);
        let first = symbol.super_types();
        let second = symbol.super_types();
        assert!(first.same_as(&second));
        assert!(symbol.interfaces().same_as(&symbol.interfaces()));
    }

    #[test]
    fn test_root_self_reference() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let i = r.declare_type("p.I", TypeKind::Interface);
        let array = r.array_of(object);
        let ctx = context(r);

        let root = ctx.root_type();
        assert!(root.is_root());
        assert_eq!(ctx.type_symbol(object).super_class(), None);
        assert_eq!(ctx.type_symbol(i).super_class(), Some(root));
        assert_eq!(ctx.type_symbol(array).super_class(), Some(root));
        assert!(ctx.type_symbol(object).super_types().is_empty());
        assert_eq!(ctx.type_symbol(array).super_types().to_vec(), vec![root]);
    }

    #[test]
    fn test_degraded_root() {
        let mut r = MemoryResolver::new();
        jdk(&mut r);
        let i = r.declare_type("p.I", TypeKind::Interface);
        r.hide_type(ROOT_TYPE_NAME);
        let ctx = context(r);

        assert!(ctx.root_type().is_unknown());
        let super_class = ctx.type_symbol(i).super_class();
        assert!(super_class.is_some_and(|t| t.is_unknown()));
    }

    #[test]
    fn test_unresolved_symbol_degrades() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let marker = r.declare_type("p.Marker", TypeKind::Annotation);
        r.mark_recovered(marker);
        let broken = r.declare_type("p.Broken", TypeKind::Class);
        r.set_superclass(broken, object);
        r.mark_recovered(broken);
        let ctx = context(r);

        let symbol = ctx.type_symbol(broken);
        assert!(symbol.is_unknown());
        assert!(symbol.super_types().is_empty());
        assert!(symbol.interfaces().is_empty());
        assert!(symbol.member_symbols().is_empty());
        assert!(symbol.super_class().is_some_and(|t| t.is_unknown()));
        assert!(!ctx.type_symbol(marker).is_annotation());
        assert!(ctx.type_of(broken).is_unknown());
        assert_eq!(&*symbol.name(), "Broken");
        assert!(ctx.fault().is_none());
    }

    #[test]
    fn test_unresolved_superclass() {
        let mut r = MemoryResolver::new();
        jdk(&mut r);
        let missing = r.unresolved_type("org.lib.Missing");
        let c = r.declare_type("p.C", TypeKind::Class);
        r.set_superclass(c, missing);
        let ctx = context(r);

        let symbol = ctx.type_symbol(c);
        assert!(symbol.super_class().is_some_and(|t| t.is_unknown()));
        assert!(symbol.super_types().is_empty());
        assert!(!ctx.type_of(c).is_subtype_of("org.lib.Missing"));
    }

    #[test]
    fn test_member_shallowness() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let base = r.declare_type("p.Base", TypeKind::Class);
        r.set_superclass(base, object);
        let int = r.primitive("int");
        r.declare_field(base, "inherited", int);
        let c = r.declare_type("p.C", TypeKind::Class);
        r.set_superclass(c, base);
        let f = r.declare_field(c, "f", int);
        let ctor = r.declare_constructor(c, &[]);
        let nested = r.declare_nested_type(c, "N", TypeKind::Class);
        let ctx = context(r);

        let members: Vec<BindingId> = ctx
            .type_symbol(c)
            .member_symbols()
            .iter()
            .map(|m| m.binding())
            .collect();
        assert_eq!(members, vec![f, ctor, nested]);
        assert!(ctx.type_symbol(c).lookup_member("inherited").is_empty());
        assert_eq!(ctx.type_symbol(c).lookup_member("f").len(), 1);
    }

    #[test]
    fn test_outermost_class_idempotent() {
        let mut r = MemoryResolver::new();
        let outer = r.declare_type("p.Outer", TypeKind::Class);
        let inner = r.declare_nested_type(outer, "Inner", TypeKind::Class);
        let deepest = r.declare_nested_type(inner, "Deepest", TypeKind::Class);
        let void = r.primitive("void");
        let method = r.declare_method(deepest, "run", &[], Some(void));
        let ctx = context(r);

        let symbol = ctx.method_symbol(method);
        let first = symbol.outermost_class();
        let second = symbol.outermost_class();
        assert_eq!(first, second);
        assert_eq!(first.map(|t| t.binding()), Some(outer));
        assert_eq!(
            symbol.enclosing_class().map(|t| t.binding()),
            Some(deepest)
        );
        assert_eq!(
            ctx.type_symbol(outer).outermost_class().map(|t| t.binding()),
            Some(outer)
        );
    }

    #[test]
    fn test_metadata_resolution() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let deprecated = r.declare_type("java.lang.Deprecated", TypeKind::Annotation);
        let transactional = r.unresolved_type("Transactional");
        let c = r.declare_type("p.C", TypeKind::Class);
        r.set_superclass(c, object);
        r.add_annotation(c, deprecated);
        r.add_annotation(c, transactional);
        let ctx = context(r);

        let metadata = ctx.type_symbol(c).metadata();
        assert_eq!(metadata.len(), 2);
        assert!(metadata.is_annotated_with("java.lang.Deprecated"));
        assert!(!metadata.is_annotated_with("Transactional"));
        assert!(metadata.has_unresolved_ending_with("Transactional"));
        assert!(!metadata.has_unresolved_ending_with("Deprecated"));
        assert_eq!(metadata.unresolved_names().collect::<Vec<_>>(), vec!["Transactional"]);
        assert!(ctx.type_symbol(deprecated).is_annotation());
    }

    #[test]
    fn test_method_symbol_queries() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let string = r.declare_type("java.lang.String", TypeKind::Class);
        r.set_superclass(string, object);
        let c = r.declare_type("p.C", TypeKind::Class);
        let int = r.primitive("int");
        let m = r.declare_method(c, "length", &[string, int], Some(int));
        let p = r.declare_variable(m, "s", string);
        let ctx = context(r);

        let method = ctx.method_symbol(m);
        assert!(method.is_method_symbol());
        assert!(!method.is_constructor());
        assert!(method.return_type().is_primitive());
        let params: Vec<String> = method
            .parameter_types()
            .iter()
            .map(|t| t.qualified_name().to_string())
            .collect();
        assert_eq!(params, vec!["java.lang.String", "int"]);

        let variable = ctx.variable_symbol(p);
        assert!(variable.declared_type().is("java.lang.String"));
        assert_eq!(variable.owner(), Some(method));
        assert_eq!(variable.enclosing_class().map(|t| t.binding()), Some(c));
    }

    #[test]
    fn test_subtype_checks() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let seq = r.declare_type("java.lang.CharSequence", TypeKind::Interface);
        let string = r.declare_type("java.lang.String", TypeKind::Class);
        r.set_superclass(string, object);
        r.add_interface(string, seq);
        let ctx = context(r);

        let ty = ctx.type_of(string);
        assert!(ty.is_subtype_of("java.lang.String"));
        assert!(ty.is_subtype_of("java.lang.CharSequence"));
        assert!(ty.is_subtype_of(ROOT_TYPE_NAME));
        assert!(!ty.is_subtype_of("java.lang.Number"));
        assert!(ty.is_subtype_of_type(&ctx.type_of(seq)));
        assert!(!ctx.unknown_type().is_subtype_of(ROOT_TYPE_NAME));
    }

    #[test]
    fn test_interfaces_are_subtypes_of_root() {
        let mut r = MemoryResolver::new();
        let object = jdk(&mut r);
        let string = r.declare_type("java.lang.String", TypeKind::Class);
        r.set_superclass(string, object);
        let i = r.declare_type("p.I", TypeKind::Interface);
        let describe = r.declare_method(i, "describe", &[], Some(string));
        let int = r.primitive("int");
        let ints = r.array_of(int);
        let ctx = context(r);

        let interface = ctx.type_of(i);
        assert!(ctx.type_symbol(i).super_types().is_empty());
        assert!(interface.is_subtype_of(ROOT_TYPE_NAME));
        assert!(interface.is_subtype_of_type(&ctx.root_type()));
        assert!(ctx.type_of(ints).is_subtype_of(ROOT_TYPE_NAME));
        assert!(!ctx.type_of(int).is_subtype_of(ROOT_TYPE_NAME));

        let matcher = crate::matchers::MethodMatcher::builder()
            .of_subtypes(&[ROOT_TYPE_NAME])
            .names(&["describe"])
            .build();
        assert!(matcher.matches_symbol(&ctx.method_symbol(describe)));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_id_conversion_is_checked() {
        assert_eq!(TypeId::from_index(7).map(|id| id.index()), Some(7));
        let last = u32::MAX as usize;
        assert_eq!(SymbolId::from_index(last).map(|id| id.index()), Some(last));
        assert!(TypeId::from_index(u32::MAX as usize + 1).is_none());
        assert!(SymbolId::from_index(usize::MAX).is_none());
    }

    #[test]
    fn test_supertype_cycle_is_a_fault() {
        let mut r = MemoryResolver::new();
        let a = r.declare_type("p.A", TypeKind::Class);
        let b = r.declare_type("p.B", TypeKind::Class);
        r.set_superclass(a, b);
        r.set_superclass(b, a);
        let ctx = context(r);

        ctx.type_symbol(a).super_types();
        assert!(matches!(
            ctx.fault(),
            Some(SemanticError::SupertypeCycle { .. })
        ));
        assert!(ctx.take_fault().is_some());
        assert!(ctx.fault().is_none());
    }

    #[test]
    fn test_cache_stats_count_hits() {
        let mut r = MemoryResolver::new();
        let c = r.declare_type("p.C", TypeKind::Class);
        let ctx = context(r);

        ctx.type_of(c);
        let after_miss = ctx.cache_stats();
        ctx.type_of(c);
        let after_hit = ctx.cache_stats();
        assert_eq!(after_hit.misses, after_miss.misses);
        assert_eq!(after_hit.hits, after_miss.hits + 1);
        assert_eq!(ctx.type_count(), 2);
    }
}
