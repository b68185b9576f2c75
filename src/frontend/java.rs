//! Java front-end using tree-sitter.
//!
//! Lowering runs in three passes over the concrete syntax tree:
//! 1. declare every type of the unit (nested ones included), so references
//!    between them resolve regardless of order;
//! 2. link supertypes, annotations and members;
//! 3. build the [`Tree`], declaring parameters and locals and binding
//!    invocations whose receiver has a declared static type.
//!
//! There is no type inference beyond declared types. Generic type
//! variables are erased to `java.lang.Object`.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use streaming_iterator::StreamingIterator;
use tracing::debug;
use tree_sitter::{Language, Node as TsNode, Parser, Query, QueryCursor};

use super::classpath::{ENUM_BASE, RECORD_BASE};
use super::{AnalysisUnit, ClassPath, Frontend, MemoryResolver};
use crate::semantic::{BindingId, Resolver, TypeKind, ROOT_TYPE_NAME};
use crate::tree::{Modifier, NodeId, NodeKind, Role, Span, TreeBuilder};

const STRING_TYPE: &str = "java.lang.String";
const IMPLICIT_PACKAGE: &str = "java.lang";

/// Tree-sitter query for the package and import declarations.
const HEADER_QUERY: &str = r#"
(package_declaration [(identifier) (scoped_identifier)] @package)

(import_declaration [(identifier) (scoped_identifier)] @import_path) @import
"#;

const TYPE_NODE_KINDS: &[&str] = &[
    "type_identifier",
    "scoped_type_identifier",
    "generic_type",
    "array_type",
    "integral_type",
    "floating_point_type",
    "boolean_type",
    "void_type",
    "type_arguments",
    "type_parameters",
    "dimensions",
    "annotated_type",
];

pub struct JavaFrontend {
    language: Language,
    /// Class path bindings every unit starts from.
    base: MemoryResolver,
}

impl JavaFrontend {
    /// Front-end over the embedded JDK subset.
    pub fn new() -> Self {
        Self::with_class_path(&ClassPath::jdk())
    }

    pub fn with_class_path(class_path: &ClassPath) -> Self {
        let mut base = MemoryResolver::new();
        class_path.load_into(&mut base);
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
            base,
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// Parse and lower source text, without a file on disk.
    pub fn parse_source(&self, path: &str, source: &str) -> anyhow::Result<AnalysisUnit> {
        let mut parser = self.create_parser()?;
        let parsed = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Java source: {}", path))?;
        let root = parsed.root_node();
        if root.has_error() {
            debug!(path, "syntax errors, lowering recovered tree");
        }

        let mut lowering = Lowering::new(source.as_bytes(), self.base.clone(), Span::from_node(root));
        lowering.read_header(&self.language, root)?;
        lowering.declare_types(root, None);
        lowering.link_types(root);
        lowering.lower_unit(root);

        let tree = lowering.builder.build();
        debug!(path, nodes = tree.len(), bindings = lowering.resolver.len(), "lowered");
        Ok(AnalysisUnit::new(
            path,
            source,
            tree,
            Arc::new(lowering.resolver),
        ))
    }
}

impl Default for JavaFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for JavaFrontend {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn parse(&self, path: &Path, source: &str) -> anyhow::Result<AnalysisUnit> {
        self.parse_source(&path.to_string_lossy(), source)
    }
}

fn node_text<'s>(node: TsNode<'_>, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

fn named_children(node: TsNode<'_>) -> Vec<TsNode<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn is_comment(node: TsNode<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

/// Members of a class, interface, enum or annotation body.
fn body_members(body: TsNode<'_>) -> Vec<TsNode<'_>> {
    let mut members = Vec::new();
    for child in named_children(body) {
        if child.kind() == "enum_body_declarations" {
            members.extend(named_children(child));
        } else {
            members.push(child);
        }
    }
    members
}

fn type_kind_of(kind: &str) -> Option<TypeKind> {
    match kind {
        "class_declaration" => Some(TypeKind::Class),
        "interface_declaration" => Some(TypeKind::Interface),
        "enum_declaration" => Some(TypeKind::Enum),
        "record_declaration" => Some(TypeKind::Record),
        "annotation_type_declaration" => Some(TypeKind::Annotation),
        _ => None,
    }
}

fn declaration_node_kind(kind: TypeKind) -> NodeKind {
    match kind {
        TypeKind::Interface => NodeKind::Interface,
        TypeKind::Enum => NodeKind::Enum,
        TypeKind::Record => NodeKind::Record,
        TypeKind::Annotation => NodeKind::AnnotationType,
        _ => NodeKind::Class,
    }
}

fn annotations_of(declaration: TsNode<'_>) -> Vec<TsNode<'_>> {
    named_children(declaration)
        .into_iter()
        .filter(|c| c.kind() == "modifiers")
        .flat_map(named_children)
        .filter(|c| matches!(c.kind(), "marker_annotation" | "annotation"))
        .collect()
}

fn modifiers_of(declaration: TsNode<'_>) -> Vec<Modifier> {
    let Some(modifiers) = named_children(declaration)
        .into_iter()
        .find(|c| c.kind() == "modifiers")
    else {
        return Vec::new();
    };
    let mut cursor = modifiers.walk();
    let keywords: Vec<Modifier> = modifiers
        .children(&mut cursor)
        .filter_map(|c| Modifier::parse(c.kind()))
        .collect();
    keywords
}

/// Source text without whitespace and generic arguments:
/// `Map.Entry<K, V>` becomes `Map.Entry`.
fn erase_generics(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && !c.is_whitespace() => out.push(c),
            _ => {}
        }
    }
    out
}

fn dimension_count(text: &str) -> usize {
    text.matches('[').count()
}

#[derive(Debug)]
struct ClassScope {
    binding: BindingId,
    type_parameters: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct Local {
    binding: BindingId,
    ty: BindingId,
}

struct Lowering<'s> {
    source: &'s [u8],
    resolver: MemoryResolver,
    builder: TreeBuilder,
    package: Option<String>,
    /// Single-type imports, simple name to qualified name.
    imports: FxHashMap<String, String>,
    /// On-demand imports (`import p.*;`), package names.
    wildcard_imports: Vec<String>,
    /// Bindings created in passes 1 and 2, by CST node id.
    declared: FxHashMap<usize, BindingId>,
    /// Local and anonymous type names visible by simple name.
    local_types: FxHashMap<String, BindingId>,
    classes: Vec<ClassScope>,
    method_type_parameters: Vec<Vec<String>>,
    methods: Vec<BindingId>,
    scopes: Vec<FxHashMap<String, Local>>,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s [u8], resolver: MemoryResolver, span: Span) -> Self {
        Self {
            source,
            resolver,
            builder: TreeBuilder::new(span),
            package: None,
            imports: FxHashMap::default(),
            wildcard_imports: Vec::new(),
            declared: FxHashMap::default(),
            local_types: FxHashMap::default(),
            classes: Vec::new(),
            method_type_parameters: Vec::new(),
            methods: Vec::new(),
            scopes: Vec::new(),
        }
    }

    fn text(&self, node: TsNode<'_>) -> &'s str {
        node_text(node, self.source)
    }

    fn read_header(&mut self, language: &Language, root: TsNode<'_>) -> anyhow::Result<()> {
        let query = Query::new(language, HEADER_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, self.source);

        while let Some(m) = matches.next() {
            let mut path = None;
            let mut declaration = None;
            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "package" => self.package = Some(erase_generics(self.text(capture.node))),
                    "import_path" => path = Some(erase_generics(self.text(capture.node))),
                    "import" => declaration = Some(capture.node),
                    _ => {}
                }
            }
            let (Some(path), Some(declaration)) = (path, declaration) else {
                continue;
            };
            let mut cursor = declaration.walk();
            let children: Vec<&str> = declaration.children(&mut cursor).map(|c| c.kind()).collect();
            if children.contains(&"static") {
                continue;
            }
            if children.contains(&"asterisk") {
                self.wildcard_imports.push(path);
            } else if let Some((_, simple)) = path.rsplit_once('.') {
                self.imports.insert(simple.to_string(), path);
            }
        }
        Ok(())
    }

    // ---- Name resolution -------------------------------------------------

    fn is_type_variable(&self, name: &str) -> bool {
        self.method_type_parameters
            .iter()
            .flatten()
            .chain(self.classes.iter().flat_map(|c| c.type_parameters.iter()))
            .any(|p| p == name)
    }

    /// Simple type name to a declared binding, without creating anything.
    fn lookup_simple(&self, name: &str) -> Option<BindingId> {
        if let Some(&local) = self.local_types.get(name) {
            return Some(local);
        }
        for class in self.classes.iter().rev() {
            let nested = format!("{}.{}", self.resolver.qualified_name(class.binding), name);
            if let Some(found) = self.resolver.lookup_type(&nested) {
                return Some(found);
            }
        }
        if let Some(imported) = self.imports.get(name) {
            return self.resolver.lookup_type(imported);
        }
        let same_package = match &self.package {
            Some(package) => format!("{}.{}", package, name),
            None => name.to_string(),
        };
        if let Some(found) = self.resolver.lookup_type(&same_package) {
            return Some(found);
        }
        std::iter::once(IMPLICIT_PACKAGE)
            .chain(self.wildcard_imports.iter().map(String::as_str))
            .find_map(|package| self.resolver.lookup_type(&format!("{}.{}", package, name)))
    }

    fn resolve_simple(&mut self, name: &str) -> BindingId {
        if self.is_type_variable(name) {
            return self.resolver.type_reference(ROOT_TYPE_NAME);
        }
        if let Some(found) = self.lookup_simple(name) {
            return found;
        }
        match self.imports.get(name).cloned() {
            Some(imported) => self.resolver.unresolved_type(&imported),
            None => self.resolver.unresolved_type(name),
        }
    }

    fn resolve_qualified(&mut self, name: &str) -> BindingId {
        if let Some(found) = self.resolver.lookup_type(name) {
            return found;
        }
        if let Some((first, rest)) = name.split_once('.') {
            if let Some(outer) = self.lookup_simple(first) {
                let nested = format!("{}.{}", self.resolver.qualified_name(outer), rest);
                if let Some(found) = self.resolver.lookup_type(&nested) {
                    return found;
                }
            }
        }
        self.resolver.unresolved_type(name)
    }

    fn resolve_type_name(&mut self, name: &str) -> BindingId {
        let name = erase_generics(name);
        if name.contains('.') {
            self.resolve_qualified(&name)
        } else {
            self.resolve_simple(&name)
        }
    }

    fn resolve_type_node(&mut self, node: TsNode<'_>) -> BindingId {
        match node.kind() {
            "integral_type" | "floating_point_type" | "boolean_type" | "void_type" => {
                let name = self.text(node);
                self.resolver.primitive(name)
            }
            "array_type" => {
                let element = match node.child_by_field_name("element") {
                    Some(element) => self.resolve_type_node(element),
                    None => {
                        let text = self.text(node);
                        self.resolver.unresolved_type(text)
                    }
                };
                let depth = node
                    .child_by_field_name("dimensions")
                    .map(|d| dimension_count(self.text(d)))
                    .unwrap_or(1);
                self.array_of_depth(element, depth)
            }
            "generic_type" => match named_children(node)
                .into_iter()
                .find(|c| matches!(c.kind(), "type_identifier" | "scoped_type_identifier"))
            {
                Some(raw) => self.resolve_type_node(raw),
                None => {
                    let text = self.text(node);
                    self.resolve_type_name(text)
                }
            },
            "annotated_type" => match named_children(node)
                .into_iter()
                .rev()
                .find(|c| !matches!(c.kind(), "marker_annotation" | "annotation"))
            {
                Some(inner) => self.resolve_type_node(inner),
                None => self.resolver.type_reference(ROOT_TYPE_NAME),
            },
            _ => {
                let text = self.text(node);
                self.resolve_type_name(text)
            }
        }
    }

    fn array_of_depth(&mut self, mut element: BindingId, depth: usize) -> BindingId {
        for _ in 0..depth {
            element = self.resolver.array_of(element);
        }
        element
    }

    /// Declared type of a variable declarator, honoring `int a[]` dimensions.
    fn declarator_type(&mut self, declarator: TsNode<'_>, base: BindingId) -> BindingId {
        match declarator.child_by_field_name("dimensions") {
            Some(dims) => {
                let depth = dimension_count(self.text(dims));
                self.array_of_depth(base, depth)
            }
            None => base,
        }
    }

    /// Name node, type and varargs flag of a formal parameter.
    fn parameter_parts<'t>(&mut self, parameter: TsNode<'t>) -> Option<(TsNode<'t>, BindingId, bool)> {
        match parameter.kind() {
            "formal_parameter" => {
                let name = parameter.child_by_field_name("name")?;
                let ty = match parameter.child_by_field_name("type") {
                    Some(ty) => self.resolve_type_node(ty),
                    None => self.resolver.type_reference(ROOT_TYPE_NAME),
                };
                let ty = self.declarator_type(parameter, ty);
                Some((name, ty, false))
            }
            "spread_parameter" => {
                let children = named_children(parameter);
                let declarator = children.iter().find(|c| c.kind() == "variable_declarator")?;
                let name = declarator.child_by_field_name("name")?;
                let element = match children
                    .iter()
                    .find(|c| !matches!(c.kind(), "modifiers" | "variable_declarator"))
                {
                    Some(&ty) => self.resolve_type_node(ty),
                    None => self.resolver.type_reference(ROOT_TYPE_NAME),
                };
                let ty = self.resolver.array_of(element);
                Some((name, ty, true))
            }
            _ => None,
        }
    }

    fn parameter_types(&mut self, parameters: Option<TsNode<'_>>) -> (Vec<BindingId>, bool) {
        let mut types = Vec::new();
        let mut varargs = false;
        for parameter in parameters.map(named_children).unwrap_or_default() {
            if let Some((_, ty, spread)) = self.parameter_parts(parameter) {
                types.push(ty);
                varargs |= spread;
            }
        }
        (types, varargs)
    }

    fn type_parameter_names(&self, declaration: TsNode<'_>) -> Vec<String> {
        let Some(parameters) = declaration.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        named_children(parameters)
            .into_iter()
            .filter_map(|p| {
                named_children(p)
                    .into_iter()
                    .find(|c| matches!(c.kind(), "type_identifier" | "identifier"))
            })
            .map(|name| self.text(name).to_string())
            .collect()
    }

    fn current_class(&self) -> Option<BindingId> {
        self.classes.last().map(|c| c.binding)
    }

    /// Owner for locals and local types: the innermost method, else the
    /// innermost class, else the package.
    fn current_owner(&mut self) -> BindingId {
        if let Some(&method) = self.methods.last() {
            return method;
        }
        if let Some(class) = self.current_class() {
            return class;
        }
        let package = self.package.clone().unwrap_or_default();
        self.resolver.package(&package)
    }

    // ---- Pass 1: declare types -------------------------------------------

    fn declare_types(&mut self, container: TsNode<'_>, outer: Option<BindingId>) {
        for child in body_members(container) {
            let Some(kind) = type_kind_of(child.kind()) else {
                continue;
            };
            let Some(name) = child.child_by_field_name("name") else {
                continue;
            };
            let name = self.text(name);
            let binding = match outer {
                Some(outer) => self.resolver.declare_nested_type(outer, name, kind),
                None => {
                    let qualified = match &self.package {
                        Some(package) => format!("{}.{}", package, name),
                        None => name.to_string(),
                    };
                    self.resolver.declare_type(&qualified, kind)
                }
            };
            self.declared.insert(child.id(), binding);
            if let Some(body) = child.child_by_field_name("body") {
                self.declare_types(body, Some(binding));
            }
        }
    }

    // ---- Pass 2: link ------------------------------------------------------

    fn link_types(&mut self, container: TsNode<'_>) {
        for child in body_members(container) {
            if let Some(&binding) = self.declared.get(&child.id()) {
                self.link_type(child, binding);
            }
        }
    }

    fn link_type(&mut self, declaration: TsNode<'_>, binding: BindingId) {
        let kind = type_kind_of(declaration.kind()).unwrap_or(TypeKind::Class);
        let type_parameters = self.type_parameter_names(declaration);
        self.classes.push(ClassScope {
            binding,
            type_parameters,
        });

        let superclass = declaration
            .child_by_field_name("superclass")
            .and_then(|s| named_children(s).into_iter().next());
        match (superclass, kind) {
            (Some(superclass), _) => {
                let superclass = self.resolve_type_node(superclass);
                self.resolver.set_superclass(binding, superclass);
            }
            (None, TypeKind::Class) => {
                if self.resolver.qualified_name(binding) != ROOT_TYPE_NAME {
                    let root = self.resolver.type_reference(ROOT_TYPE_NAME);
                    self.resolver.set_superclass(binding, root);
                }
            }
            (None, TypeKind::Enum) => {
                let base = self.resolver.type_reference(ENUM_BASE);
                self.resolver.set_superclass(binding, base);
            }
            (None, TypeKind::Record) => {
                let base = self.resolver.type_reference(RECORD_BASE);
                self.resolver.set_superclass(binding, base);
            }
            _ => {}
        }

        let interface_lists = named_children(declaration)
            .into_iter()
            .filter(|c| matches!(c.kind(), "super_interfaces" | "extends_interfaces"))
            .flat_map(named_children)
            .filter(|c| c.kind() == "type_list")
            .flat_map(named_children);
        for interface in interface_lists.collect::<Vec<_>>() {
            let interface = self.resolve_type_node(interface);
            self.resolver.add_interface(binding, interface);
        }

        self.link_annotations(declaration, binding);

        let mut components = Vec::new();
        if kind == TypeKind::Record {
            for component in declaration
                .child_by_field_name("parameters")
                .map(named_children)
                .unwrap_or_default()
            {
                if let Some((name, ty, _)) = self.parameter_parts(component) {
                    let name = self.text(name);
                    let field = self.resolver.declare_field(binding, name, ty);
                    self.declared.insert(component.id(), field);
                    self.resolver.declare_method(binding, name, &[], Some(ty));
                    components.push(ty);
                }
            }
        }

        if let Some(body) = declaration.child_by_field_name("body") {
            self.link_members(body, binding, &components);
        }

        if kind == TypeKind::Record && self.resolver.find_constructor(binding, components.len()).is_none() {
            self.resolver.declare_constructor(binding, &components);
        }
        self.classes.pop();
    }

    fn link_annotations(&mut self, declaration: TsNode<'_>, target: BindingId) {
        for annotation in annotations_of(declaration) {
            if let Some(name) = annotation.child_by_field_name("name") {
                let name = self.text(name);
                let ty = self.resolve_type_name(name);
                self.resolver.add_annotation(target, ty);
            }
        }
    }

    fn link_members(&mut self, body: TsNode<'_>, owner: BindingId, components: &[BindingId]) {
        for member in body_members(body) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    let base = match member.child_by_field_name("type") {
                        Some(ty) => self.resolve_type_node(ty),
                        None => self.resolver.type_reference(ROOT_TYPE_NAME),
                    };
                    let mut cursor = member.walk();
                    let declarators: Vec<TsNode<'_>> =
                        member.children_by_field_name("declarator", &mut cursor).collect();
                    for declarator in declarators {
                        let Some(name) = declarator.child_by_field_name("name") else {
                            continue;
                        };
                        let ty = self.declarator_type(declarator, base);
                        let name = self.text(name);
                        let field = self.resolver.declare_field(owner, name, ty);
                        self.link_annotations(member, field);
                        self.declared.insert(declarator.id(), field);
                    }
                }
                "method_declaration" | "annotation_type_element_declaration" => {
                    let Some(name) = member.child_by_field_name("name") else {
                        continue;
                    };
                    self.method_type_parameters.push(self.type_parameter_names(member));
                    let (parameters, varargs) =
                        self.parameter_types(member.child_by_field_name("parameters"));
                    let returns = match member.child_by_field_name("type") {
                        Some(ty) => self.resolve_type_node(ty),
                        None => self.resolver.primitive("void"),
                    };
                    let returns = match member.child_by_field_name("dimensions") {
                        Some(dims) => {
                            let depth = dimension_count(self.text(dims));
                            self.array_of_depth(returns, depth)
                        }
                        None => returns,
                    };
                    let name = self.text(name);
                    let method = self.resolver.declare_method(owner, name, &parameters, Some(returns));
                    self.resolver.set_varargs(method, varargs);
                    self.link_annotations(member, method);
                    self.declared.insert(member.id(), method);
                    self.method_type_parameters.pop();
                }
                "constructor_declaration" => {
                    self.method_type_parameters.push(self.type_parameter_names(member));
                    let (parameters, varargs) =
                        self.parameter_types(member.child_by_field_name("parameters"));
                    let constructor = self.resolver.declare_constructor(owner, &parameters);
                    self.resolver.set_varargs(constructor, varargs);
                    self.link_annotations(member, constructor);
                    self.declared.insert(member.id(), constructor);
                    self.method_type_parameters.pop();
                }
                "compact_constructor_declaration" => {
                    let constructor = self.resolver.declare_constructor(owner, components);
                    self.link_annotations(member, constructor);
                    self.declared.insert(member.id(), constructor);
                }
                "enum_constant" => {
                    let Some(name) = member.child_by_field_name("name") else {
                        continue;
                    };
                    let name = self.text(name);
                    let constant = self.resolver.declare_field(owner, name, owner);
                    self.link_annotations(member, constant);
                    self.declared.insert(member.id(), constant);
                }
                kind if type_kind_of(kind).is_some() => {
                    if let Some(&nested) = self.declared.get(&member.id()) {
                        self.link_type(member, nested);
                    }
                }
                _ => {}
            }
        }
    }

    /// Declare and link a type met inside a method body.
    fn declare_local_type(&mut self, declaration: TsNode<'_>, kind: TypeKind) -> BindingId {
        let name = declaration
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or_default();
        let owner = self.current_owner();
        let binding = self.resolver.declare_local_type(owner, name, kind);
        self.local_types.insert(name.to_string(), binding);
        self.declared.insert(declaration.id(), binding);
        if let Some(body) = declaration.child_by_field_name("body") {
            self.declare_types(body, Some(binding));
        }
        self.link_type(declaration, binding);
        binding
    }

    // ---- Pass 3: lower -----------------------------------------------------

    fn lower_unit(&mut self, root: TsNode<'_>) {
        for child in named_children(root) {
            match child.kind() {
                "package_declaration" | "import_declaration" => {
                    let kind = if child.kind() == "package_declaration" {
                        NodeKind::Package
                    } else {
                        NodeKind::Import
                    };
                    let id = self.builder.leaf(kind, Span::from_node(child));
                    if let Some(name) = named_children(child)
                        .into_iter()
                        .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
                    {
                        let text = self.text(name);
                        self.builder.set_name(id, text, Span::from_node(name));
                    }
                }
                _ => {
                    self.lower(child, Role::Plain);
                }
            }
        }
    }

    fn lower(&mut self, node: TsNode<'_>, role: Role) -> Option<NodeId> {
        if is_comment(node) || !node.is_named() || TYPE_NODE_KINDS.contains(&node.kind()) {
            return None;
        }
        match node.kind() {
            "parenthesized_expression" => {
                let inner = named_children(node).into_iter().find(|c| !is_comment(*c))?;
                self.lower(inner, role)
            }
            kind if type_kind_of(kind).is_some() => self.lower_type_declaration(node, role),
            "field_declaration" | "constant_declaration" | "local_variable_declaration" => {
                self.lower_variables(node, role)
            }
            "method_declaration"
            | "constructor_declaration"
            | "compact_constructor_declaration"
            | "annotation_type_element_declaration" => self.lower_method(node, role),
            "enum_constant" => self.lower_enum_constant(node, role),
            "block" | "constructor_body" => {
                self.scopes.push(FxHashMap::default());
                let id = self.lower_children(NodeKind::Block, node, role);
                self.scopes.pop();
                Some(id)
            }
            "expression_statement" | "return_statement" => {
                let kind = if node.kind() == "return_statement" {
                    NodeKind::Return
                } else {
                    NodeKind::ExpressionStatement
                };
                let id = self.start(kind, node, role);
                if let Some(expression) = named_children(node).into_iter().find(|c| !is_comment(*c)) {
                    self.lower(expression, Role::Expression);
                }
                self.builder.finish();
                Some(id)
            }
            "method_invocation" => Some(self.lower_invocation(node, role)),
            "object_creation_expression" => Some(self.lower_new(node, role)),
            "explicit_constructor_invocation" => Some(self.lower_constructor_call(node, role)),
            "field_access" => Some(self.lower_field_access(node, role)),
            "identifier" => Some(self.lower_identifier(node, role)),
            "this" => {
                let id = self.builder.leaf(NodeKind::This, Span::from_node(node));
                self.builder.set_role(id, role);
                if let Some(class) = self.current_class() {
                    self.builder.set_type_binding(id, class);
                }
                Some(id)
            }
            "super" => {
                let id = self.builder.leaf(NodeKind::Super, Span::from_node(node));
                self.builder.set_role(id, role);
                if let Some(superclass) = self.current_class().and_then(|c| self.resolver.superclass(c)) {
                    self.builder.set_type_binding(id, superclass);
                }
                Some(id)
            }
            "string_literal" | "text_block" | "character_literal" | "decimal_integer_literal"
            | "hex_integer_literal" | "octal_integer_literal" | "binary_integer_literal"
            | "decimal_floating_point_literal" | "hex_floating_point_literal" | "true"
            | "false" | "null_literal" => Some(self.lower_literal(node, role)),
            "binary_expression" => {
                let id = self.start(NodeKind::Binary, node, role);
                if let Some(operator) = node.child_by_field_name("operator") {
                    let operator = self.text(operator);
                    self.builder.set_text(id, operator);
                    if matches!(operator, "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||") {
                        let boolean = self.resolver.primitive("boolean");
                        self.builder.set_type_binding(id, boolean);
                    }
                }
                for field in ["left", "right"] {
                    if let Some(operand) = node.child_by_field_name(field) {
                        self.lower(operand, Role::Operand);
                    }
                }
                self.builder.finish();
                Some(id)
            }
            "unary_expression" => {
                let id = self.start(NodeKind::Unary, node, role);
                if let Some(operator) = node.child_by_field_name("operator") {
                    let operator = self.text(operator);
                    self.builder.set_text(id, operator);
                }
                if let Some(operand) = node.child_by_field_name("operand") {
                    self.lower(operand, Role::Operand);
                }
                self.builder.finish();
                Some(id)
            }
            "cast_expression" => {
                let id = self.lower_children(NodeKind::Other, node, role);
                if let Some(ty) = node.child_by_field_name("type") {
                    let ty = self.resolve_type_node(ty);
                    self.builder.set_type_binding(id, ty);
                }
                Some(id)
            }
            "marker_annotation" | "annotation" => Some(self.lower_annotation(node)),
            "enhanced_for_statement" => {
                self.scopes.push(FxHashMap::default());
                let id = self.start(NodeKind::Other, node, role);
                if let (Some(ty), Some(name)) = (
                    node.child_by_field_name("type"),
                    node.child_by_field_name("name"),
                ) {
                    let ty = self.resolve_type_node(ty);
                    self.declare_local(NodeKind::Variable, node, name, ty, Role::Plain);
                }
                for field in ["value", "body"] {
                    if let Some(child) = node.child_by_field_name(field) {
                        self.lower(child, Role::Plain);
                    }
                }
                self.builder.finish();
                self.scopes.pop();
                Some(id)
            }
            "catch_formal_parameter" => {
                let name = node.child_by_field_name("name")?;
                let ty = named_children(node)
                    .into_iter()
                    .find(|c| c.kind() == "catch_type")
                    .and_then(|c| named_children(c).into_iter().next());
                let ty = match ty {
                    Some(ty) => self.resolve_type_node(ty),
                    None => self.resolver.type_reference(ROOT_TYPE_NAME),
                };
                Some(self.declare_local(NodeKind::Variable, node, name, ty, role))
            }
            "catch_clause" | "for_statement" | "try_with_resources_statement" | "lambda_expression"
            | "switch_block_statement_group" => {
                self.scopes.push(FxHashMap::default());
                let id = self.lower_children(NodeKind::Other, node, role);
                self.scopes.pop();
                Some(id)
            }
            "modifiers" => None,
            _ => Some(self.lower_children(NodeKind::Other, node, role)),
        }
    }

    fn start(&mut self, kind: NodeKind, node: TsNode<'_>, role: Role) -> NodeId {
        let id = self.builder.start(kind, Span::from_node(node));
        self.builder.set_role(id, role);
        id
    }

    fn lower_children(&mut self, kind: NodeKind, node: TsNode<'_>, role: Role) -> NodeId {
        let id = self.start(kind, node, role);
        for child in named_children(node) {
            self.lower(child, Role::Plain);
        }
        self.builder.finish();
        id
    }

    fn set_name(&mut self, id: NodeId, name: TsNode<'_>) {
        let text = self.text(name);
        self.builder.set_name(id, text, Span::from_node(name));
    }

    /// Modifier keywords and annotations of `declaration`, attached to the
    /// open node `id`.
    fn lower_modifiers(&mut self, id: NodeId, declaration: TsNode<'_>) {
        for modifier in modifiers_of(declaration) {
            self.builder.add_modifier(id, modifier);
        }
        for annotation in annotations_of(declaration) {
            self.lower_annotation(annotation);
        }
    }

    fn lower_annotation(&mut self, node: TsNode<'_>) -> NodeId {
        let id = self.start(NodeKind::Annotation, node, Role::Plain);
        if let Some(name) = node.child_by_field_name("name") {
            let text = erase_generics(self.text(name));
            let ty = self.resolve_type_name(&text);
            self.builder
                .set_name(id, text, Span::from_node(name))
                .set_binding(id, ty)
                .set_type_binding(id, ty);
        }
        if let Some(arguments) = node.child_by_field_name("arguments") {
            self.lower_children(NodeKind::Arguments, arguments, Role::Plain);
        }
        self.builder.finish();
        id
    }

    fn lower_type_declaration(&mut self, node: TsNode<'_>, role: Role) -> Option<NodeId> {
        let kind = type_kind_of(node.kind())?;
        let binding = match self.declared.get(&node.id()) {
            Some(&binding) => binding,
            None => self.declare_local_type(node, kind),
        };
        let id = self.start(declaration_node_kind(kind), node, role);
        self.builder.set_binding(id, binding).set_type_binding(id, binding);
        if let Some(name) = node.child_by_field_name("name") {
            self.set_name(id, name);
        }
        self.lower_modifiers(id, node);
        let type_parameters = self.type_parameter_names(node);
        self.classes.push(ClassScope {
            binding,
            type_parameters,
        });
        self.scopes.push(FxHashMap::default());

        if let Some(components) = node.child_by_field_name("parameters") {
            self.start(NodeKind::Parameters, components, Role::Plain);
            for component in named_children(components) {
                if let Some((name, ty, _)) = self.parameter_parts(component) {
                    let parameter = self.start(NodeKind::Parameter, component, Role::Plain);
                    self.set_name(parameter, name);
                    self.builder.set_type_binding(parameter, ty);
                    if let Some(&field) = self.declared.get(&component.id()) {
                        self.builder.set_binding(parameter, field);
                    }
                    self.lower_modifiers(parameter, component);
                    self.builder.finish();
                }
            }
            self.builder.finish();
        }
        if let Some(body) = node.child_by_field_name("body") {
            for member in body_members(body) {
                self.lower(member, Role::Member);
            }
        }

        self.scopes.pop();
        self.classes.pop();
        self.builder.finish();
        Some(id)
    }

    /// Class body of an anonymous class or enum constant, lowered as an
    /// unnamed class declaration.
    fn lower_anonymous_class(&mut self, body: TsNode<'_>, supertype: Option<BindingId>) -> NodeId {
        let owner = self.current_owner();
        let binding = self.resolver.declare_local_type(owner, "", TypeKind::Class);
        let interface_like = supertype
            .and_then(|s| self.resolver.type_kind(s))
            .is_some_and(|k| k.is_interface_like());
        match supertype {
            Some(interface) if interface_like => {
                let root = self.resolver.type_reference(ROOT_TYPE_NAME);
                self.resolver.set_superclass(binding, root);
                self.resolver.add_interface(binding, interface);
            }
            Some(superclass) => self.resolver.set_superclass(binding, superclass),
            None => {}
        }
        self.declare_types(body, Some(binding));
        self.classes.push(ClassScope {
            binding,
            type_parameters: Vec::new(),
        });
        self.link_members(body, binding, &[]);

        let id = self.start(NodeKind::Class, body, Role::Plain);
        self.builder.set_binding(id, binding).set_type_binding(id, binding);
        self.scopes.push(FxHashMap::default());
        for member in body_members(body) {
            self.lower(member, Role::Member);
        }
        self.scopes.pop();
        self.classes.pop();
        self.builder.finish();
        id
    }

    fn lower_variables(&mut self, node: TsNode<'_>, role: Role) -> Option<NodeId> {
        let is_field = node.kind() != "local_variable_declaration";
        let base = match node.child_by_field_name("type") {
            Some(ty) => self.resolve_type_node(ty),
            None => self.resolver.type_reference(ROOT_TYPE_NAME),
        };
        let mut cursor = node.walk();
        let declarators: Vec<TsNode<'_>> = node.children_by_field_name("declarator", &mut cursor).collect();

        let mut last = None;
        for declarator in declarators {
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };
            let ty = self.declarator_type(declarator, base);
            let binding = match self.declared.get(&declarator.id()) {
                Some(&field) if is_field => field,
                _ => {
                    let owner = self.current_owner();
                    let name = self.text(name);
                    self.resolver.declare_variable(owner, name, ty)
                }
            };
            let id = self.start(NodeKind::Variable, node, role);
            self.set_name(id, name);
            self.builder.set_binding(id, binding).set_type_binding(id, ty);
            self.lower_modifiers(id, node);
            if let Some(value) = declarator.child_by_field_name("value") {
                self.lower(value, Role::Initializer);
            }
            self.builder.finish();
            if !is_field {
                let name = self.text(name);
                self.add_local(name, binding, ty);
            }
            last = Some(id);
        }
        last
    }

    fn add_local(&mut self, name: &str, binding: BindingId, ty: BindingId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), Local { binding, ty });
        }
    }

    /// Variable node for a parameter-like declaration with a known type.
    fn declare_local(
        &mut self,
        kind: NodeKind,
        node: TsNode<'_>,
        name: TsNode<'_>,
        ty: BindingId,
        role: Role,
    ) -> NodeId {
        let owner = self.current_owner();
        let text = self.text(name);
        let binding = self.resolver.declare_variable(owner, text, ty);
        let id = self.start(kind, node, role);
        self.set_name(id, name);
        self.builder.set_binding(id, binding).set_type_binding(id, ty);
        self.lower_modifiers(id, node);
        self.builder.finish();
        self.add_local(text, binding, ty);
        id
    }

    fn lower_enum_constant(&mut self, node: TsNode<'_>, role: Role) -> Option<NodeId> {
        let id = self.start(NodeKind::Variable, node, role);
        if let Some(name) = node.child_by_field_name("name") {
            self.set_name(id, name);
        }
        if let Some(&constant) = self.declared.get(&node.id()) {
            self.builder.set_binding(id, constant);
        }
        let enum_type = self.current_class();
        if let Some(enum_type) = enum_type {
            self.builder.set_type_binding(id, enum_type);
            self.builder.add_modifier(id, Modifier::Static);
            self.builder.add_modifier(id, Modifier::Final);
        }
        self.lower_modifiers(id, node);
        if let Some(arguments) = node.child_by_field_name("arguments") {
            self.lower_children(NodeKind::Arguments, arguments, Role::Plain);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.lower_anonymous_class(body, enum_type);
        }
        self.builder.finish();
        Some(id)
    }

    fn lower_method(&mut self, node: TsNode<'_>, role: Role) -> Option<NodeId> {
        let kind = match node.kind() {
            "constructor_declaration" | "compact_constructor_declaration" => NodeKind::Constructor,
            _ => NodeKind::Method,
        };
        let id = self.start(kind, node, role);
        if let Some(name) = node.child_by_field_name("name") {
            self.set_name(id, name);
        }
        let binding = self.declared.get(&node.id()).copied();
        if let Some(binding) = binding {
            self.builder.set_binding(id, binding);
            if let Some(returns) = self.resolver.declared_type(binding) {
                self.builder.set_type_binding(id, returns);
            }
        }
        self.lower_modifiers(id, node);

        self.method_type_parameters.push(self.type_parameter_names(node));
        if let Some(binding) = binding {
            self.methods.push(binding);
        }
        self.scopes.push(FxHashMap::default());

        if let Some(parameters) = node.child_by_field_name("parameters") {
            self.start(NodeKind::Parameters, parameters, Role::Plain);
            for parameter in named_children(parameters) {
                if let Some((name, ty, _)) = self.parameter_parts(parameter) {
                    self.declare_local(NodeKind::Parameter, parameter, name, ty, Role::Plain);
                }
            }
            self.builder.finish();
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.lower(body, Role::Body);
        }

        self.scopes.pop();
        if binding.is_some() {
            self.methods.pop();
        }
        self.method_type_parameters.pop();
        self.builder.finish();
        Some(id)
    }

    fn argument_count(arguments: Option<TsNode<'_>>) -> usize {
        arguments
            .map(|a| named_children(a).into_iter().filter(|c| !is_comment(*c)).count())
            .unwrap_or(0)
    }

    fn lower_arguments(&mut self, arguments: Option<TsNode<'_>>) {
        if let Some(arguments) = arguments {
            self.lower_children(NodeKind::Arguments, arguments, Role::Plain);
        }
    }

    fn lower_invocation(&mut self, node: TsNode<'_>, role: Role) -> NodeId {
        let id = self.start(NodeKind::MethodInvocation, node, role);
        let name = node.child_by_field_name("name");
        if let Some(name) = name {
            self.set_name(id, name);
        }
        let object = node.child_by_field_name("object");
        let receiver_type = object
            .and_then(|object| self.lower(object, Role::Receiver))
            .and_then(|receiver| self.builder.type_binding(receiver));
        let arguments = node.child_by_field_name("arguments");
        let arity = Self::argument_count(arguments);
        self.lower_arguments(arguments);

        let name = name.map(|n| self.text(n)).unwrap_or_default();
        let method = match (object, receiver_type) {
            (Some(_), Some(receiver)) => self.resolver.find_method(receiver, name, arity),
            (Some(_), None) => None,
            (None, _) => self
                .classes
                .iter()
                .rev()
                .find_map(|c| self.resolver.find_method(c.binding, name, arity)),
        };
        if let Some(method) = method {
            self.builder.set_binding(id, method);
            if let Some(returns) = self.resolver.declared_type(method) {
                self.builder.set_type_binding(id, returns);
            }
        }
        self.builder.finish();
        id
    }

    fn lower_new(&mut self, node: TsNode<'_>, role: Role) -> NodeId {
        let id = self.start(NodeKind::NewClass, node, role);
        let ty = node.child_by_field_name("type").map(|ty| {
            let text = erase_generics(self.text(ty));
            self.builder.set_name(id, text, Span::from_node(ty));
            self.resolve_type_node(ty)
        });
        let arguments = node.child_by_field_name("arguments");
        let arity = Self::argument_count(arguments);
        self.lower_arguments(arguments);
        if let Some(ty) = ty {
            self.builder.set_type_binding(id, ty);
            if let Some(constructor) = self.resolver.find_constructor(ty, arity) {
                self.builder.set_binding(id, constructor);
            }
        }
        if let Some(body) = named_children(node).into_iter().find(|c| c.kind() == "class_body") {
            self.lower_anonymous_class(body, ty);
        }
        self.builder.finish();
        id
    }

    fn lower_constructor_call(&mut self, node: TsNode<'_>, role: Role) -> NodeId {
        let id = self.start(NodeKind::ConstructorCall, node, role);
        let target = node.child_by_field_name("constructor").and_then(|keyword| {
            let text = self.text(keyword);
            self.builder.set_name(id, text, Span::from_node(keyword));
            let class = self.current_class()?;
            if text == "super" {
                self.resolver.superclass(class)
            } else {
                Some(class)
            }
        });
        let arguments = node.child_by_field_name("arguments");
        let arity = Self::argument_count(arguments);
        self.lower_arguments(arguments);
        if let Some(constructor) = target.and_then(|t| self.resolver.find_constructor(t, arity)) {
            self.builder.set_binding(id, constructor);
        }
        self.builder.finish();
        id
    }

    fn lower_field_access(&mut self, node: TsNode<'_>, role: Role) -> NodeId {
        let id = self.start(NodeKind::MemberSelect, node, role);
        let field = node.child_by_field_name("field");
        if let Some(field) = field {
            self.set_name(id, field);
        }
        let receiver_type = node
            .child_by_field_name("object")
            .and_then(|object| self.lower(object, Role::Receiver))
            .and_then(|receiver| self.builder.type_binding(receiver));
        if let (Some(receiver), Some(field)) = (receiver_type, field) {
            if let Some(found) = self.resolver.find_field(receiver, self.text(field)) {
                self.builder.set_binding(id, found);
                if let Some(ty) = self.resolver.declared_type(found) {
                    self.builder.set_type_binding(id, ty);
                }
            }
        }
        self.builder.finish();
        id
    }

    fn lower_identifier(&mut self, node: TsNode<'_>, role: Role) -> NodeId {
        let id = self.builder.leaf(NodeKind::Identifier, Span::from_node(node));
        let name = self.text(node);
        self.builder
            .set_role(id, role)
            .set_name(id, name, Span::from_node(node))
            .set_text(id, name);

        let local = self.scopes.iter().rev().find_map(|s| s.get(name)).copied();
        if let Some(local) = local {
            self.builder.set_binding(id, local.binding).set_type_binding(id, local.ty);
            return id;
        }
        let field = self
            .classes
            .iter()
            .rev()
            .find_map(|c| self.resolver.find_field(c.binding, name));
        if let Some(field) = field {
            self.builder.set_binding(id, field);
            if let Some(ty) = self.resolver.declared_type(field) {
                self.builder.set_type_binding(id, ty);
            }
            return id;
        }
        // `Objects.equals(..)`: a type name used as receiver.
        if role == Role::Receiver {
            if let Some(ty) = self.lookup_simple(name) {
                self.builder.set_binding(id, ty).set_type_binding(id, ty);
            }
        }
        id
    }

    fn lower_literal(&mut self, node: TsNode<'_>, role: Role) -> NodeId {
        let id = self.builder.leaf(NodeKind::Literal, Span::from_node(node));
        let text = self.text(node);
        self.builder.set_role(id, role).set_text(id, text);
        let ty = match node.kind() {
            "string_literal" | "text_block" => Some(self.resolver.type_reference(STRING_TYPE)),
            "character_literal" => Some(self.resolver.primitive("char")),
            "true" | "false" => Some(self.resolver.primitive("boolean")),
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                let name = if text.ends_with(['f', 'F']) { "float" } else { "double" };
                Some(self.resolver.primitive(name))
            }
            "null_literal" => None,
            _ => {
                let name = if text.ends_with(['l', 'L']) { "long" } else { "int" };
                Some(self.resolver.primitive(name))
            }
        };
        if let Some(ty) = ty {
            self.builder.set_type_binding(id, ty);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::SemanticContext;
    use crate::tree::{Node, Tree};

    fn parse(source: &str) -> AnalysisUnit {
        JavaFrontend::new().parse_source("Test.java", source).unwrap()
    }

    fn find<'t>(tree: &'t Tree, kind: NodeKind, name: &str) -> Node<'t> {
        tree.nodes()
            .find(|n| n.kind() == kind && n.name() == Some(name))
            .unwrap_or_else(|| panic!("no {kind} named {name}"))
    }

    #[test]
    fn test_declarations_and_hierarchy() {
        let unit = parse(
            r#"
package com.example;

import java.io.Serializable;

public class Service extends Base implements Serializable {
    private int count;
    public Service(int count) { this.count = count; }
    static class Inner {}
}

abstract class Base {}
"#,
        );
        let ctx = unit.semantic_context();
        let service = ctx.resolve_type("com.example.Service");
        assert!(!service.is_unknown());
        let names: Vec<String> = service
            .symbol()
            .unwrap()
            .super_types()
            .iter()
            .map(|t| t.qualified_name().to_string())
            .collect();
        assert_eq!(names, vec!["com.example.Base", "java.io.Serializable", "java.lang.Object"]);

        let class = find(&unit.tree, NodeKind::Class, "Service");
        let members: Vec<NodeKind> = class.members().map(|m| m.kind()).collect();
        assert_eq!(members, vec![NodeKind::Variable, NodeKind::Constructor, NodeKind::Class]);
        assert!(ctx.resolve_type("com.example.Service.Inner").symbol().is_some());
        assert_eq!(
            ctx.resolve_type("com.example.Service.Inner")
                .symbol()
                .and_then(|s| s.owner())
                .map(|o| o.name().to_string()),
            Some("Service".to_string())
        );
    }

    #[test]
    fn test_parameters_and_varargs() {
        let unit = parse(
            r#"
class A {
    void m(int a, String b, Object... rest) {}
}
"#,
        );
        let ctx = unit.semantic_context();
        let method = find(&unit.tree, NodeKind::Method, "m");
        let parameters = method.parameters();
        assert_eq!(parameters.len(), 3);
        assert_eq!(parameters[1].name(), Some("b"));

        let symbol = ctx.method_symbol(method.binding().unwrap());
        assert!(symbol.is_varargs());
        let types: Vec<String> = symbol
            .parameter_types()
            .iter()
            .map(|t| t.qualified_name().to_string())
            .collect();
        assert_eq!(types, vec!["int", "java.lang.String", "java.lang.Object[]"]);
        assert!(symbol.return_type().is_primitive());
    }

    #[test]
    fn test_invocations_bound_through_receiver_type() {
        let unit = parse(
            r#"
class A {
    private StringBuilder sb = new StringBuilder();
    boolean m() {
        StringBuilder local = new StringBuilder("x");
        return local.toString().isEmpty() && sb.length() == 0;
    }
}
"#,
        );
        let ctx = unit.semantic_context();
        let is_empty = find(&unit.tree, NodeKind::MethodInvocation, "isEmpty");
        let symbol = ctx.method_symbol(is_empty.binding().unwrap());
        assert_eq!(
            symbol.owner().map(|o| o.name().to_string()),
            Some("String".to_string())
        );
        let to_string = is_empty.receiver().unwrap();
        assert_eq!(to_string.name(), Some("toString"));
        let owner = ctx.method_symbol(to_string.binding().unwrap()).owner().unwrap();
        assert_eq!(&*owner.name(), "StringBuilder");

        let length = find(&unit.tree, NodeKind::MethodInvocation, "length");
        assert!(length.binding().is_some());
        let new_class = unit.tree.nodes().find(|n| n.kind() == NodeKind::NewClass).unwrap();
        assert!(new_class.binding().is_some());
    }

    #[test]
    fn test_unresolved_annotation_is_recovered() {
        let unit = parse(
            r#"
import org.springframework.beans.factory.annotation.Autowired;

class A {
    @Autowired
    private Object repo;
    @Override
    public String toString() { return ""; }
}
"#,
        );
        let ctx = unit.semantic_context();
        let field = find(&unit.tree, NodeKind::Variable, "repo");
        let annotation = field.annotations().next().unwrap();
        assert_eq!(annotation.name(), Some("Autowired"));
        assert!(ctx.type_of(annotation.binding().unwrap()).is_unknown());
        let metadata = ctx.variable_symbol(field.binding().unwrap()).metadata();
        assert_eq!(
            metadata.unresolved_names().collect::<Vec<_>>(),
            vec!["org.springframework.beans.factory.annotation.Autowired"]
        );

        let method = find(&unit.tree, NodeKind::Method, "toString");
        assert!(ctx
            .method_symbol(method.binding().unwrap())
            .metadata()
            .is_annotated_with("java.lang.Override"));
    }

    #[test]
    fn test_super_invocation_and_modifiers() {
        let unit = parse(
            r#"
class A extends B {
    @Override
    public final void run(int x) { super.run(x); }
}
class B {
    public void run(int x) {}
}
"#,
        );
        let ctx = unit.semantic_context();
        let run = find(&unit.tree, NodeKind::Method, "run");
        assert!(run.has_modifier(Modifier::Final));
        let statements = run.statements();
        assert_eq!(statements.len(), 1);
        let call = statements[0].expression().unwrap();
        assert_eq!(call.kind(), NodeKind::MethodInvocation);
        assert_eq!(call.receiver().map(|r| r.kind()), Some(NodeKind::Super));
        let target = ctx.method_symbol(call.binding().unwrap());
        assert_eq!(target.owner().map(|o| o.name().to_string()), Some("B".to_string()));
        let argument = &call.arguments()[0];
        assert_eq!(argument.kind(), NodeKind::Identifier);
        assert!(argument.binding().is_some());
    }

    #[test]
    fn test_enum_and_record() {
        let unit = parse(
            r#"
package p;
enum Color { RED, GREEN { void f() {} } }
record Point(int x, int y) {}
"#,
        );
        let ctx = unit.semantic_context();
        let color = ctx.resolve_type("p.Color");
        assert!(color.is_subtype_of("java.lang.Enum"));
        let point = ctx.resolve_type("p.Point").symbol().unwrap();
        assert_eq!(point.lookup_member("x").len(), 2);
        assert!(point
            .member_symbols()
            .iter()
            .any(|m| m.is_constructor() && m.parameter_types().len() == 2));
        let record = find(&unit.tree, NodeKind::Record, "Point");
        assert_eq!(record.parameters().len(), 2);
    }

    #[test]
    fn test_degraded_class_path() {
        let frontend = JavaFrontend::with_class_path(&ClassPath::jdk().without(ROOT_TYPE_NAME));
        let unit = frontend.parse_source("A.java", "class A {}").unwrap();
        let ctx = SemanticContext::new(unit.resolver.clone());
        assert!(ctx.root_type().is_unknown());
        let a = ctx.resolve_type("A").symbol().unwrap();
        assert!(a.super_class().unwrap().is_unknown());
        assert!(a.super_types().is_empty());
    }
}
