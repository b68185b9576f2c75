//! In-memory binding store.
//!
//! `MemoryResolver` is the [`Resolver`] the Java front-end fills while it
//! lowers a compilation unit, and the one tests build by hand. Resolution
//! happens entirely in the builder methods; once handed to a
//! [`SemanticContext`](crate::semantic::SemanticContext) the store is
//! read-only.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::semantic::{BindingId, BindingKind, Resolver, TypeKind};

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

pub fn is_primitive_name(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

#[derive(Debug, Clone)]
struct Entry {
    kind: BindingKind,
    name: String,
    qualified_name: String,
    type_kind: Option<TypeKind>,
    recovered: bool,
    owner: Option<BindingId>,
    superclass: Option<BindingId>,
    interfaces: Vec<BindingId>,
    element: Option<BindingId>,
    annotations: Vec<BindingId>,
    members: Vec<BindingId>,
    declared_type: Option<BindingId>,
    parameters: Vec<BindingId>,
    varargs: bool,
    constructor: bool,
}

impl Entry {
    fn new(kind: BindingKind, name: &str, qualified_name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            qualified_name: qualified_name.to_string(),
            type_kind: None,
            recovered: false,
            owner: None,
            superclass: None,
            interfaces: Vec::new(),
            element: None,
            annotations: Vec::new(),
            members: Vec::new(),
            declared_type: None,
            parameters: Vec::new(),
            varargs: false,
            constructor: false,
        }
    }
}

/// Builder-style binding store implementing [`Resolver`].
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    entries: Vec<Entry>,
    types: FxHashMap<String, BindingId>,
    hidden: FxHashSet<String>,
    packages: FxHashMap<String, BindingId>,
    primitives: FxHashMap<String, BindingId>,
    arrays: FxHashMap<BindingId, BindingId>,
    unresolved: FxHashMap<String, BindingId>,
}

fn simple_name(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map(|(_, name)| name)
        .unwrap_or(qualified_name)
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: Entry) -> BindingId {
        let id = BindingId::new(self.entries.len() as u32);
        self.entries.push(entry);
        id
    }

    fn entry(&self, binding: BindingId) -> &Entry {
        &self.entries[binding.index()]
    }

    fn entry_mut(&mut self, binding: BindingId) -> &mut Entry {
        &mut self.entries[binding.index()]
    }

    pub fn package(&mut self, name: &str) -> BindingId {
        if let Some(&id) = self.packages.get(name) {
            return id;
        }
        let id = self.push(Entry::new(BindingKind::Package, name, name));
        self.packages.insert(name.to_string(), id);
        id
    }

    /// Declare a top-level type. Declaring an existing name returns the
    /// existing binding.
    pub fn declare_type(&mut self, qualified_name: &str, kind: TypeKind) -> BindingId {
        if let Some(&id) = self.types.get(qualified_name) {
            return id;
        }
        let owner = qualified_name
            .rsplit_once('.')
            .map(|(package, _)| self.package(package));
        let mut entry = Entry::new(BindingKind::Type, simple_name(qualified_name), qualified_name);
        entry.type_kind = Some(kind);
        entry.owner = owner;
        let id = self.push(entry);
        self.types.insert(qualified_name.to_string(), id);
        id
    }

    /// Declare a member type of `outer`.
    pub fn declare_nested_type(&mut self, outer: BindingId, name: &str, kind: TypeKind) -> BindingId {
        let qualified_name = format!("{}.{}", self.entry(outer).qualified_name, name);
        if let Some(&id) = self.types.get(&qualified_name) {
            return id;
        }
        let mut entry = Entry::new(BindingKind::Type, name, &qualified_name);
        entry.type_kind = Some(kind);
        entry.owner = Some(outer);
        let id = self.push(entry);
        self.entry_mut(outer).members.push(id);
        self.types.insert(qualified_name, id);
        id
    }

    /// Declare a type owned by a method body (local class).
    pub fn declare_local_type(&mut self, method: BindingId, name: &str, kind: TypeKind) -> BindingId {
        let mut entry = Entry::new(BindingKind::Type, name, name);
        entry.type_kind = Some(kind);
        entry.owner = Some(method);
        self.push(entry)
    }

    /// A type the environment could not resolve, named by its source token.
    pub fn unresolved_type(&mut self, token: &str) -> BindingId {
        if let Some(&id) = self.unresolved.get(token) {
            return id;
        }
        let mut entry = Entry::new(BindingKind::Type, simple_name(token), token);
        entry.type_kind = Some(TypeKind::Unknown);
        entry.recovered = true;
        let id = self.push(entry);
        self.unresolved.insert(token.to_string(), id);
        id
    }

    pub fn primitive(&mut self, name: &str) -> BindingId {
        if let Some(&id) = self.primitives.get(name) {
            return id;
        }
        let mut entry = Entry::new(BindingKind::Type, name, name);
        entry.type_kind = Some(TypeKind::Primitive);
        let id = self.push(entry);
        self.primitives.insert(name.to_string(), id);
        id
    }

    pub fn array_of(&mut self, element: BindingId) -> BindingId {
        if let Some(&id) = self.arrays.get(&element) {
            return id;
        }
        let (name, qualified_name) = {
            let e = self.entry(element);
            (format!("{}[]", e.name), format!("{}[]", e.qualified_name))
        };
        let mut entry = Entry::new(BindingKind::Type, &name, &qualified_name);
        entry.type_kind = Some(TypeKind::Array);
        entry.element = Some(element);
        let id = self.push(entry);
        self.arrays.insert(element, id);
        id
    }

    pub fn set_superclass(&mut self, ty: BindingId, superclass: BindingId) {
        self.entry_mut(ty).superclass = Some(superclass);
    }

    pub fn add_interface(&mut self, ty: BindingId, interface: BindingId) {
        self.entry_mut(ty).interfaces.push(interface);
    }

    pub fn add_annotation(&mut self, target: BindingId, annotation: BindingId) {
        self.entry_mut(target).annotations.push(annotation);
    }

    /// Declare a method member of `owner`. `returns` is `None` only when the
    /// return type is not known at all; `void` is a primitive.
    pub fn declare_method(
        &mut self,
        owner: BindingId,
        name: &str,
        parameters: &[BindingId],
        returns: Option<BindingId>,
    ) -> BindingId {
        let mut entry = Entry::new(BindingKind::Method, name, name);
        entry.owner = Some(owner);
        entry.parameters = parameters.to_vec();
        entry.declared_type = returns;
        let id = self.push(entry);
        self.entry_mut(owner).members.push(id);
        id
    }

    pub fn declare_constructor(&mut self, owner: BindingId, parameters: &[BindingId]) -> BindingId {
        let name = self.entry(owner).name.clone();
        let mut entry = Entry::new(BindingKind::Method, &name, &name);
        entry.owner = Some(owner);
        entry.parameters = parameters.to_vec();
        entry.constructor = true;
        let id = self.push(entry);
        self.entry_mut(owner).members.push(id);
        id
    }

    pub fn set_varargs(&mut self, method: BindingId, varargs: bool) {
        self.entry_mut(method).varargs = varargs;
    }

    pub fn declare_field(&mut self, owner: BindingId, name: &str, ty: BindingId) -> BindingId {
        let id = self.declare_variable(owner, name, ty);
        self.entry_mut(owner).members.push(id);
        id
    }

    /// Declare a parameter or local variable owned by a method.
    pub fn declare_variable(&mut self, owner: BindingId, name: &str, ty: BindingId) -> BindingId {
        let mut entry = Entry::new(BindingKind::Variable, name, name);
        entry.owner = Some(owner);
        entry.declared_type = Some(ty);
        self.push(entry)
    }

    /// Flag a binding as recovered, as a resolver does for broken
    /// declarations.
    pub fn mark_recovered(&mut self, binding: BindingId) {
        self.entry_mut(binding).recovered = true;
    }

    /// Make `resolve_type` fail for a name while keeping its binding, the way
    /// an incomplete class path behaves.
    pub fn hide_type(&mut self, qualified_name: &str) {
        self.hidden.insert(qualified_name.to_string());
    }

    /// Builder-side lookup, unaffected by [`hide_type`](Self::hide_type).
    pub fn lookup_type(&self, qualified_name: &str) -> Option<BindingId> {
        self.types.get(qualified_name).copied()
    }

    /// Type binding for a class-path style type reference: primitives,
    /// `T[]` arrays, declared types, or an unresolved placeholder.
    pub fn type_reference(&mut self, name: &str) -> BindingId {
        if let Some(element) = name.strip_suffix("[]") {
            let element = self.type_reference(element);
            return self.array_of(element);
        }
        if is_primitive_name(name) {
            return self.primitive(name);
        }
        match self.lookup_type(name) {
            Some(id) => id,
            None => self.unresolved_type(name),
        }
    }

    pub fn method_owner_kind(&self, binding: BindingId) -> Option<TypeKind> {
        self.entry(binding)
            .owner
            .and_then(|owner| self.entry(owner).type_kind)
    }

    /// Ancestors of `ty` breadth-first, `ty` itself first.
    fn hierarchy(&self, ty: BindingId) -> Vec<BindingId> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([ty]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            let entry = self.entry(current);
            queue.extend(entry.superclass);
            queue.extend(entry.interfaces.iter().copied());
        }
        order
    }

    /// First method named `name` accepting `arity` arguments, searching `ty`
    /// and then its ancestors.
    pub fn find_method(&self, ty: BindingId, name: &str, arity: usize) -> Option<BindingId> {
        self.hierarchy(ty).into_iter().find_map(|t| {
            self.entry(t).members.iter().copied().find(|&m| {
                let e = self.entry(m);
                e.kind == BindingKind::Method
                    && !e.constructor
                    && e.name == name
                    && accepts_arity(e, arity)
            })
        })
    }

    pub fn find_constructor(&self, ty: BindingId, arity: usize) -> Option<BindingId> {
        self.entry(ty).members.iter().copied().find(|&m| {
            let e = self.entry(m);
            e.constructor && accepts_arity(e, arity)
        })
    }

    pub fn find_field(&self, ty: BindingId, name: &str) -> Option<BindingId> {
        self.hierarchy(ty).into_iter().find_map(|t| {
            self.entry(t).members.iter().copied().find(|&m| {
                let e = self.entry(m);
                e.kind == BindingKind::Variable && e.name == name
            })
        })
    }
}

fn accepts_arity(entry: &Entry, arity: usize) -> bool {
    let declared = entry.parameters.len();
    declared == arity || (entry.varargs && declared > 0 && arity + 1 >= declared)
}

impl Resolver for MemoryResolver {
    fn resolve_type(&self, qualified_name: &str) -> Option<BindingId> {
        if self.hidden.contains(qualified_name) {
            return None;
        }
        self.lookup_type(qualified_name)
    }

    fn kind(&self, binding: BindingId) -> BindingKind {
        self.entry(binding).kind
    }

    fn name(&self, binding: BindingId) -> &str {
        &self.entry(binding).name
    }

    fn qualified_name(&self, binding: BindingId) -> &str {
        &self.entry(binding).qualified_name
    }

    fn type_kind(&self, binding: BindingId) -> Option<TypeKind> {
        self.entry(binding).type_kind
    }

    fn is_recovered(&self, binding: BindingId) -> bool {
        self.entry(binding).recovered
    }

    fn superclass(&self, binding: BindingId) -> Option<BindingId> {
        self.entry(binding).superclass
    }

    fn interfaces(&self, binding: BindingId) -> &[BindingId] {
        &self.entry(binding).interfaces
    }

    fn element_type(&self, binding: BindingId) -> Option<BindingId> {
        self.entry(binding).element
    }

    fn owner(&self, binding: BindingId) -> Option<BindingId> {
        self.entry(binding).owner
    }

    fn declared_type(&self, binding: BindingId) -> Option<BindingId> {
        self.entry(binding).declared_type
    }

    fn annotations(&self, binding: BindingId) -> &[BindingId] {
        &self.entry(binding).annotations
    }

    fn members(&self, binding: BindingId) -> &[BindingId] {
        &self.entry(binding).members
    }

    fn parameter_types(&self, binding: BindingId) -> &[BindingId] {
        &self.entry(binding).parameters
    }

    fn is_varargs(&self, binding: BindingId) -> bool {
        self.entry(binding).varargs
    }

    fn is_constructor(&self, binding: BindingId) -> bool {
        self.entry(binding).constructor
    }
}
