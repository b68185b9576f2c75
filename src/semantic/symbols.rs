//! Symbol facades: declarations as seen through the resolver.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashSet};

use super::context::ROOT_TYPE_NAME;
use super::metadata::{AnnotationEntry, Metadata};
use super::{BindingId, SemanticContext, Type, TypeId, TypeKind, TypeList};
use crate::error::SemanticError;

/// Handle of a symbol facade inside one [`SemanticContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    pub(crate) const FIRST: SymbolId = SymbolId(0);

    /// `None` once a context holds more than `u32::MAX` symbols.
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Package,
    Type,
    Method,
    Variable,
}

/// A declaration: package, type, method or variable.
///
/// Equality and hashing are by identity, like [`Type`].
#[derive(Clone, Copy)]
pub struct Symbol<'a> {
    ctx: &'a SemanticContext,
    id: SymbolId,
}

impl<'a> Symbol<'a> {
    pub(crate) fn new(ctx: &'a SemanticContext, id: SymbolId) -> Self {
        Self { ctx, id }
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn context(&self) -> &'a SemanticContext {
        self.ctx
    }

    pub fn binding(&self) -> BindingId {
        self.ctx.with_symbol(self.id, |d| d.binding)
    }

    pub fn kind(&self) -> SymbolKind {
        self.ctx.with_symbol(self.id, |d| d.kind)
    }

    pub fn name(&self) -> Rc<str> {
        self.ctx.with_symbol(self.id, |d| d.name.clone())
    }

    /// Whether the underlying binding is recovered (unresolved).
    pub fn is_unknown(&self) -> bool {
        self.ctx.with_symbol(self.id, |d| d.recovered)
    }

    pub fn is_package_symbol(&self) -> bool {
        self.kind() == SymbolKind::Package
    }

    pub fn is_type_symbol(&self) -> bool {
        self.kind() == SymbolKind::Type
    }

    pub fn is_method_symbol(&self) -> bool {
        self.kind() == SymbolKind::Method
    }

    pub fn is_variable_symbol(&self) -> bool {
        self.kind() == SymbolKind::Variable
    }

    pub fn as_type_symbol(&self) -> Option<TypeSymbol<'a>> {
        self.is_type_symbol().then_some(TypeSymbol(*self))
    }

    /// Enclosing declaration. This is a lookup, not ownership.
    pub fn owner(&self) -> Option<Symbol<'a>> {
        self.ctx
            .resolver()
            .owner(self.binding())
            .map(|b| self.ctx.symbol(b))
    }

    /// Own type for type symbols, variable type for variables, return type for
    /// methods. `UNKNOWN` when absent.
    pub fn declared_type(&self) -> Type<'a> {
        let binding = self.binding();
        match self.kind() {
            SymbolKind::Type => self.ctx.type_of(binding),
            SymbolKind::Method | SymbolKind::Variable => self
                .ctx
                .resolver()
                .declared_type(binding)
                .map(|t| self.ctx.type_of(t))
                .unwrap_or_else(|| self.ctx.unknown_type()),
            SymbolKind::Package => self.ctx.unknown_type(),
        }
    }

    pub fn return_type(&self) -> Type<'a> {
        if self.is_method_symbol() {
            self.declared_type()
        } else {
            self.ctx.unknown_type()
        }
    }

    /// Parameter types of a method, in order. Empty for anything else.
    pub fn parameter_types(&self) -> Vec<Type<'a>> {
        if !self.is_method_symbol() {
            return Vec::new();
        }
        let ctx = self.ctx;
        ctx.resolver()
            .parameter_types(self.binding())
            .iter()
            .map(|&b| ctx.type_of(b))
            .collect()
    }

    pub fn is_varargs(&self) -> bool {
        self.is_method_symbol() && self.ctx.resolver().is_varargs(self.binding())
    }

    pub fn is_constructor(&self) -> bool {
        self.is_method_symbol() && self.ctx.resolver().is_constructor(self.binding())
    }

    /// Annotations declared on this symbol. Empty for unresolved symbols.
    pub fn metadata(&self) -> Metadata<'a> {
        let ctx = self.ctx;
        if let Some(entries) = ctx.with_symbol(self.id, |d| d.memo.metadata.clone()) {
            ctx.note_hit();
            return Metadata::new(ctx, entries);
        }

        let entries: Rc<[AnnotationEntry]> = if self.is_unknown() {
            Rc::from(Vec::new())
        } else {
            let resolver = ctx.resolver();
            resolver
                .annotations(self.binding())
                .iter()
                .map(|&a| {
                    let ty = ctx.type_of(a);
                    if ty.is_unknown() {
                        AnnotationEntry::Unresolved(Rc::from(resolver.qualified_name(a)))
                    } else {
                        AnnotationEntry::Resolved(ty.id())
                    }
                })
                .collect()
        };
        ctx.with_symbol_mut(self.id, |d| d.memo.metadata = Some(entries.clone()));
        Metadata::new(ctx, entries)
    }

    /// Nearest type symbol, starting with this symbol itself.
    pub fn enclosing_class(&self) -> Option<TypeSymbol<'a>> {
        let mut seen = FxHashSet::default();
        let mut current = Some(*self);
        while let Some(symbol) = current {
            if !seen.insert(symbol.id) {
                self.report_owner_cycle();
                return None;
            }
            if let Some(ty) = symbol.as_type_symbol() {
                return Some(ty);
            }
            current = symbol.owner();
        }
        None
    }

    /// Highest type symbol on the owner chain below the package.
    ///
    /// Memoized: repeated calls return the identical symbol.
    pub fn outermost_class(&self) -> Option<TypeSymbol<'a>> {
        let ctx = self.ctx;
        if let Some(cached) = ctx.with_symbol(self.id, |d| d.memo.outermost) {
            ctx.note_hit();
            return cached.map(|id| TypeSymbol(Symbol::new(ctx, id)));
        }

        let mut seen = FxHashSet::default();
        let mut result = None;
        let mut current = Some(*self);
        while let Some(symbol) = current {
            if symbol.is_package_symbol() {
                break;
            }
            if !seen.insert(symbol.id) {
                self.report_owner_cycle();
                return None;
            }
            if symbol.is_type_symbol() {
                result = Some(symbol.id);
            }
            current = symbol.owner();
        }

        ctx.with_symbol_mut(self.id, |d| d.memo.outermost = Some(result));
        result.map(|id| TypeSymbol(Symbol::new(ctx, id)))
    }

    fn report_owner_cycle(&self) {
        self.ctx.record_fault(SemanticError::OwnerCycle {
            binding: self.binding(),
            name: self.name().to_string(),
        });
    }
}

impl PartialEq for Symbol<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.ctx, other.ctx)
    }
}

impl Eq for Symbol<'_> {}

impl Hash for Symbol<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?} {})", self.kind(), self.name())
    }
}

/// Symbol of a class, interface, enum, record, annotation type or array.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeSymbol<'a>(Symbol<'a>);

impl<'a> TypeSymbol<'a> {
    pub(crate) fn from_symbol_unchecked(symbol: Symbol<'a>) -> Self {
        Self(symbol)
    }

    pub fn symbol(&self) -> Symbol<'a> {
        self.0
    }

    pub fn id(&self) -> SymbolId {
        self.0.id()
    }

    pub fn binding(&self) -> BindingId {
        self.0.binding()
    }

    pub fn name(&self) -> Rc<str> {
        self.0.name()
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_unknown()
    }

    pub fn owner(&self) -> Option<Symbol<'a>> {
        self.0.owner()
    }

    pub fn metadata(&self) -> Metadata<'a> {
        self.0.metadata()
    }

    pub fn outermost_class(&self) -> Option<TypeSymbol<'a>> {
        self.0.outermost_class()
    }

    pub fn type_kind(&self) -> TypeKind {
        self.0
            .ctx
            .resolver()
            .type_kind(self.binding())
            .unwrap_or(TypeKind::Unknown)
    }

    /// The type this symbol declares. `UNKNOWN` for unresolved symbols.
    pub fn as_type(&self) -> Type<'a> {
        self.0.ctx.type_of(self.binding())
    }

    pub fn is_annotation(&self) -> bool {
        !self.is_unknown() && self.type_kind() == TypeKind::Annotation
    }

    pub fn is_interface(&self) -> bool {
        !self.is_unknown() && self.type_kind().is_interface_like()
    }

    pub fn is_enum(&self) -> bool {
        !self.is_unknown() && self.type_kind() == TypeKind::Enum
    }

    /// Class supertype.
    ///
    /// - `None` for the root object type.
    /// - The root object type for interfaces and arrays (`UNKNOWN` if the
    ///   environment cannot resolve it).
    /// - The resolved superclass for classes, `UNKNOWN` if that is unresolved.
    /// - `UNKNOWN` for unresolved symbols.
    pub fn super_class(&self) -> Option<Type<'a>> {
        let ctx = self.0.ctx;
        if self.is_unknown() {
            return Some(ctx.unknown_type());
        }
        match self.type_kind() {
            TypeKind::Interface | TypeKind::Annotation | TypeKind::Array => Some(ctx.root_type()),
            TypeKind::Class | TypeKind::Enum | TypeKind::Record => ctx
                .resolver()
                .superclass(self.binding())
                .map(|b| ctx.type_of(b)),
            TypeKind::Primitive | TypeKind::TypeVariable | TypeKind::Unknown => {
                Some(ctx.unknown_type())
            }
        }
    }

    /// Directly declared interfaces in declaration order.
    pub fn interfaces(&self) -> TypeList<'a> {
        let ctx = self.0.ctx;
        if let Some(ids) = ctx.with_symbol(self.id(), |d| d.memo.interfaces.clone()) {
            ctx.note_hit();
            return TypeList::new(ctx, ids);
        }
        let ids: Rc<[TypeId]> = if self.is_unknown() {
            Rc::from(Vec::new())
        } else {
            ctx.resolver()
                .interfaces(self.binding())
                .iter()
                .map(|&b| ctx.type_id(b))
                .collect()
        };
        ctx.with_symbol_mut(self.id(), |d| d.memo.interfaces = Some(ids.clone()));
        TypeList::new(ctx, ids)
    }

    /// Linearized ancestors: the superclass chain, then implemented interfaces
    /// with their own ancestors, without duplicates, ending with the root
    /// object type exactly once when it is reachable.
    ///
    /// Computed once; later calls return the same cached sequence.
    pub fn super_types(&self) -> TypeList<'a> {
        let ctx = self.0.ctx;
        let id = self.id();
        if let Some(ids) = ctx.with_symbol(id, |d| d.memo.super_types.clone()) {
            ctx.note_hit();
            return TypeList::new(ctx, ids);
        }

        let entered = ctx.with_symbol_mut(id, |d| !std::mem::replace(&mut d.memo.linearizing, true));
        if !entered {
            ctx.record_fault(SemanticError::SupertypeCycle {
                binding: self.binding(),
                name: self.name().to_string(),
            });
            return TypeList::empty(ctx);
        }

        let ids = self.linearize();
        ctx.with_symbol_mut(id, |d| {
            d.memo.linearizing = false;
            d.memo.super_types = Some(ids.clone());
        });
        TypeList::new(ctx, ids)
    }

    fn linearize(&self) -> Rc<[TypeId]> {
        if self.is_unknown() {
            return Rc::from(Vec::new());
        }
        let ctx = self.0.ctx;
        let resolver = ctx.resolver();
        let binding = self.binding();

        let mut acc = Linearization::default();
        match self.type_kind() {
            TypeKind::Class | TypeKind::Enum | TypeKind::Record => {
                if let Some(superclass) = resolver.superclass(binding) {
                    acc.add_with_ancestors(ctx, superclass);
                }
            }
            TypeKind::Array => {
                let root = ctx.root_type();
                acc.add(ctx, root.id());
            }
            _ => {}
        }
        for &interface in resolver.interfaces(binding) {
            acc.add_with_ancestors(ctx, interface);
        }
        acc.finish()
    }

    /// Directly declared members: fields, methods, constructors and nested
    /// types. Inherited members are not included.
    pub fn member_symbols(&self) -> Vec<Symbol<'a>> {
        let ctx = self.0.ctx;
        self.member_ids()
            .iter()
            .map(|&id| Symbol::new(ctx, id))
            .collect()
    }

    /// Direct members with the given simple name.
    pub fn lookup_member(&self, name: &str) -> Vec<Symbol<'a>> {
        self.member_symbols()
            .into_iter()
            .filter(|m| &*m.name() == name)
            .collect()
    }

    fn member_ids(&self) -> Rc<[SymbolId]> {
        let ctx = self.0.ctx;
        if let Some(ids) = ctx.with_symbol(self.id(), |d| d.memo.members.clone()) {
            ctx.note_hit();
            return ids;
        }
        let ids: Rc<[SymbolId]> = if self.is_unknown() {
            Rc::from(Vec::new())
        } else {
            let unique: IndexSet<SymbolId, FxBuildHasher> = ctx
                .resolver()
                .members(self.binding())
                .iter()
                .map(|&b| ctx.symbol_id(b))
                .collect();
            unique.into_iter().collect()
        };
        ctx.with_symbol_mut(self.id(), |d| d.memo.members = Some(ids.clone()));
        ids
    }
}

impl fmt::Debug for TypeSymbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeSymbol({})", self.name())
    }
}

/// Accumulator for [`TypeSymbol::super_types`]: ordered, deduplicated, with
/// the root object type held back until the end.
#[derive(Default)]
struct Linearization {
    types: IndexSet<TypeId, FxBuildHasher>,
    root: Option<TypeId>,
}

impl Linearization {
    fn add(&mut self, ctx: &SemanticContext, id: TypeId) {
        if id.is_unknown() {
            return;
        }
        if ctx.with_type(id, |d| &*d.qualified_name == ROOT_TYPE_NAME) {
            self.root = Some(id);
        } else {
            self.types.insert(id);
        }
    }

    /// Add a supertype and its own (memoized) linearization.
    fn add_with_ancestors(&mut self, ctx: &SemanticContext, binding: BindingId) {
        let ty = ctx.type_of(binding);
        if ty.is_unknown() {
            return;
        }
        self.add(ctx, ty.id());
        for &ancestor in ctx.type_symbol(binding).super_types().ids() {
            self.add(ctx, ancestor);
        }
    }

    fn finish(self) -> Rc<[TypeId]> {
        let mut ids: Vec<TypeId> = self.types.into_iter().collect();
        ids.extend(self.root);
        Rc::from(ids)
    }
}
