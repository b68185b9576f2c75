#![cfg(feature = "tree-sitter")]
//! Semantic model queries over parsed Java sources.

use semacheck::error::SemanticError;
use semacheck::semantic::SymbolKind;
use semacheck::tree::{Node, NodeKind, Tree};
use semacheck::{AnalysisUnit, JavaFrontend};

fn parse(source: &str) -> AnalysisUnit {
    JavaFrontend::new()
        .parse_source("Test.java", source)
        .expect("should parse")
}

fn find<'t>(tree: &'t Tree, kind: NodeKind, name: &str) -> Node<'t> {
    tree.nodes()
        .find(|n| n.kind() == kind && n.name() == Some(name))
        .unwrap_or_else(|| panic!("no {kind} named {name}"))
}

fn names<'a>(types: impl Iterator<Item = semacheck::Type<'a>>) -> Vec<String> {
    types.map(|t| t.qualified_name().to_string()).collect()
}

#[test]
fn test_linearized_super_types() {
    let unit = parse(
        r#"
package shop;

interface Priced {}
interface Discounted extends Priced {}
interface Named {}
abstract class Item implements Priced, Named {}
class Sale extends Item implements Discounted, Named {}
"#,
    );
    let ctx = unit.semantic_context();
    let sale = ctx.resolve_type("shop.Sale").symbol().unwrap();

    assert_eq!(
        names(sale.super_types().iter()),
        vec![
            "shop.Item",
            "shop.Priced",
            "shop.Named",
            "shop.Discounted",
            "java.lang.Object"
        ]
    );
    assert_eq!(names(sale.interfaces().iter()), vec!["shop.Discounted", "shop.Named"]);
    assert!(sale.as_type().is_subtype_of("shop.Priced"));
    assert!(!ctx.resolve_type("shop.Item").is_subtype_of("shop.Discounted"));

    // Second query is served from the memo
    let before = ctx.cache_stats();
    assert!(sale.super_types().same_as(&sale.super_types()));
    assert!(ctx.cache_stats().hits > before.hits);
}

#[test]
fn test_symbols_are_canonical_per_binding() {
    let unit = parse(
        r#"
class Outer {
    class Middle {
        class Inner {
            int depth(String label, int... levels) { return levels.length; }
        }
    }
}
"#,
    );
    let ctx = unit.semantic_context();
    let method = find(&unit.tree, NodeKind::Method, "depth");
    let binding = method.binding().unwrap();

    let first = ctx.method_symbol(binding);
    let second = ctx.symbol(binding);
    assert_eq!(first.id(), second.id());
    assert_eq!(first.kind(), SymbolKind::Method);
    assert!(first.is_varargs());
    assert_eq!(
        names(first.parameter_types().into_iter()),
        vec!["java.lang.String", "int[]"]
    );

    let inner = first.enclosing_class().unwrap();
    assert_eq!(&*inner.name(), "Inner");
    let outermost = first.outermost_class().unwrap();
    assert_eq!(&*outermost.name(), "Outer");
    assert_eq!(outermost.outermost_class().map(|o| o.id()), Some(outermost.id()));
}

#[test]
fn test_annotation_metadata_from_source() {
    let unit = parse(
        r#"
import java.lang.annotation.Retention;

@Deprecated
@Retention
@com.acme.Audited
class Legacy {
    @Deprecated
    @Unknown
    void old() {}
}
"#,
    );
    let ctx = unit.semantic_context();
    let class = find(&unit.tree, NodeKind::Class, "Legacy");
    let metadata = ctx.type_symbol(class.binding().unwrap()).metadata();
    assert!(metadata.is_annotated_with("java.lang.Deprecated"));
    assert!(metadata.is_annotated_with_any(&["com.acme.Other", "java.lang.Deprecated"]));

    let method = find(&unit.tree, NodeKind::Method, "old");
    let metadata = ctx.method_symbol(method.binding().unwrap()).metadata();
    assert_eq!(metadata.len(), 2);
    assert!(metadata.has_unresolved_ending_with("Unknown"));
    assert_eq!(metadata.unresolved_names().collect::<Vec<_>>(), vec!["Unknown"]);
}

#[test]
fn test_unresolved_types_degrade_quietly() {
    let unit = parse(
        r#"
import com.missing.Base;

class Child extends Base {
    Missing field;
}
"#,
    );
    let ctx = unit.semantic_context();
    let child = ctx.resolve_type("Child").symbol().unwrap();
    assert!(child.super_class().is_some_and(|t| t.is_unknown()));
    assert!(child.super_types().is_empty());
    // Still a reference type, whatever its missing ancestors are
    assert!(child.as_type().is_subtype_of("java.lang.Object"));
    assert!(!child.as_type().is_subtype_of("com.missing.Base"));

    let field = find(&unit.tree, NodeKind::Variable, "field");
    assert!(ctx.variable_symbol(field.binding().unwrap()).declared_type().is_unknown());
    assert!(ctx.resolve_type("com.nowhere.Thing").is_unknown());
    assert!(ctx.fault().is_none());
}

#[test]
fn test_cyclic_hierarchy_records_a_fault() {
    let unit = parse(
        r#"
class A extends B {}
class B extends A {}
"#,
    );
    let ctx = unit.semantic_context();
    let a = ctx.resolve_type("A").symbol().unwrap();
    let _ = a.super_types();
    assert!(matches!(ctx.take_fault(), Some(SemanticError::SupertypeCycle { .. })));
    assert!(ctx.fault().is_none());
}
