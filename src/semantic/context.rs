//! Per-unit semantic cache.
//!
//! `SemanticContext` is the single entry point that turns resolver bindings
//! into [`Type`] and [`Symbol`] facades. Each binding is wrapped once; every
//! later request for the same binding returns a facade with the same id, so
//! facades can be compared and hashed by identity.
//!
//! The context uses interior mutability without locks and is therefore
//! neither `Send` nor `Sync`: one context per analysis unit, created on the
//! thread that analyzes the unit and dropped with it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{trace, warn};

use super::metadata::AnnotationEntry;
use super::{
    BindingId, BindingKind, Resolver, Symbol, SymbolId, SymbolKind, Type, TypeId, TypeKind,
    TypeSymbol,
};
use crate::error::SemanticError;

/// Fully-qualified name of the root object type.
pub const ROOT_TYPE_NAME: &str = "java.lang.Object";

pub(crate) const UNKNOWN_TYPE_NAME: &str = "!unknown!";

/// Facade cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

pub(crate) struct TypeData {
    pub binding: Option<BindingId>,
    pub name: Rc<str>,
    pub qualified_name: Rc<str>,
    pub kind: TypeKind,
    pub element: Option<TypeId>,
}

/// Derived data computed at most once per symbol.
#[derive(Default)]
pub(crate) struct SymbolMemo {
    pub super_types: Option<Rc<[TypeId]>>,
    pub interfaces: Option<Rc<[TypeId]>>,
    pub members: Option<Rc<[SymbolId]>>,
    pub metadata: Option<Rc<[AnnotationEntry]>>,
    pub outermost: Option<Option<SymbolId>>,
    /// Set while `super_types` is being computed; re-entry means a cycle.
    pub linearizing: bool,
}

pub(crate) struct SymbolData {
    pub binding: BindingId,
    pub kind: SymbolKind,
    pub name: Rc<str>,
    pub recovered: bool,
    pub memo: SymbolMemo,
}

/// Identity-preserving facade cache over one resolver.
pub struct SemanticContext {
    resolver: Arc<dyn Resolver>,
    types: RefCell<Vec<TypeData>>,
    type_index: RefCell<FxHashMap<BindingId, TypeId>>,
    symbols: RefCell<Vec<SymbolData>>,
    symbol_index: RefCell<FxHashMap<BindingId, SymbolId>>,
    fault: RefCell<Option<SemanticError>>,
    stats: Cell<CacheStats>,
}

impl SemanticContext {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        let unknown = TypeData {
            binding: None,
            name: Rc::from(UNKNOWN_TYPE_NAME),
            qualified_name: Rc::from(UNKNOWN_TYPE_NAME),
            kind: TypeKind::Unknown,
            element: None,
        };
        Self {
            resolver,
            types: RefCell::new(vec![unknown]),
            type_index: RefCell::new(FxHashMap::default()),
            symbols: RefCell::new(Vec::new()),
            symbol_index: RefCell::new(FxHashMap::default()),
            fault: RefCell::new(None),
            stats: Cell::new(CacheStats::default()),
        }
    }

    pub fn resolver(&self) -> &dyn Resolver {
        self.resolver.as_ref()
    }

    /// Resolve a type by fully-qualified name, `UNKNOWN` if the environment
    /// cannot supply it.
    pub fn resolve_type(&self, qualified_name: &str) -> Type<'_> {
        match self.resolver.resolve_type(qualified_name) {
            Some(binding) => self.type_of(binding),
            None => self.unknown_type(),
        }
    }

    /// The root object type, or `UNKNOWN` in a degraded environment.
    pub fn root_type(&self) -> Type<'_> {
        self.resolve_type(ROOT_TYPE_NAME)
    }

    pub fn unknown_type(&self) -> Type<'_> {
        Type::new(self, TypeId::UNKNOWN)
    }

    /// Type facade for a binding. Recovered bindings and bindings that are not
    /// types all map to the `UNKNOWN` singleton.
    pub fn type_of(&self, binding: BindingId) -> Type<'_> {
        Type::new(self, self.type_id(binding))
    }

    /// Symbol facade for any binding.
    pub fn symbol(&self, binding: BindingId) -> Symbol<'_> {
        Symbol::new(self, self.symbol_id(binding))
    }

    /// Symbol facade for a type binding (class, interface, enum, record,
    /// annotation or array).
    pub fn type_symbol(&self, binding: BindingId) -> TypeSymbol<'_> {
        TypeSymbol::from_symbol_unchecked(self.symbol(binding))
    }

    /// Symbol facade for a method or constructor binding.
    pub fn method_symbol(&self, binding: BindingId) -> Symbol<'_> {
        self.symbol(binding)
    }

    /// Symbol facade for a field, parameter or local variable binding.
    pub fn variable_symbol(&self, binding: BindingId) -> Symbol<'_> {
        self.symbol(binding)
    }

    /// First structural inconsistency recorded, if any.
    pub fn fault(&self) -> Option<SemanticError> {
        self.fault.borrow().clone()
    }

    pub fn take_fault(&self) -> Option<SemanticError> {
        self.fault.borrow_mut().take()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.stats.get()
    }

    /// Number of distinct type facades created so far, `UNKNOWN` included.
    pub fn type_count(&self) -> usize {
        self.types.borrow().len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.borrow().len()
    }

    pub(crate) fn type_id(&self, binding: BindingId) -> TypeId {
        if let Some(&id) = self.type_index.borrow().get(&binding) {
            self.note_hit();
            return id;
        }
        self.note_miss();

        let resolver = self.resolver.as_ref();
        let kind = match resolver.type_kind(binding) {
            Some(kind) if !resolver.is_recovered(binding) && kind != TypeKind::Unknown => kind,
            _ => {
                trace!(%binding, "binding maps to the unknown type");
                self.type_index
                    .borrow_mut()
                    .insert(binding, TypeId::UNKNOWN);
                return TypeId::UNKNOWN;
            }
        };

        let element = if kind == TypeKind::Array {
            resolver.element_type(binding).map(|e| self.type_id(e))
        } else {
            None
        };

        let data = TypeData {
            binding: Some(binding),
            name: Rc::from(resolver.name(binding)),
            qualified_name: Rc::from(resolver.qualified_name(binding)),
            kind,
            element,
        };
        let id = {
            let mut types = self.types.borrow_mut();
            let Some(id) = TypeId::from_index(types.len()) else {
                drop(types);
                self.record_fault(SemanticError::CapacityExceeded { what: "types" });
                return TypeId::UNKNOWN;
            };
            types.push(data);
            id
        };
        trace!(%binding, id = id.index(), "new type facade");

        if let Some(previous) = self.type_index.borrow_mut().insert(binding, id) {
            self.record_fault(SemanticError::IdentityViolation {
                binding,
                first: previous.index() as u32,
                second: id.index() as u32,
            });
        }
        id
    }

    pub(crate) fn symbol_id(&self, binding: BindingId) -> SymbolId {
        if let Some(&id) = self.symbol_index.borrow().get(&binding) {
            self.note_hit();
            return id;
        }
        self.note_miss();

        let resolver = self.resolver.as_ref();
        let kind = match resolver.kind(binding) {
            BindingKind::Package => SymbolKind::Package,
            BindingKind::Type => SymbolKind::Type,
            BindingKind::Method => SymbolKind::Method,
            BindingKind::Variable => SymbolKind::Variable,
        };
        let data = SymbolData {
            binding,
            kind,
            name: Rc::from(resolver.name(binding)),
            recovered: resolver.is_recovered(binding),
            memo: SymbolMemo::default(),
        };
        let id = {
            let mut symbols = self.symbols.borrow_mut();
            let Some(id) = SymbolId::from_index(symbols.len()) else {
                drop(symbols);
                self.record_fault(SemanticError::CapacityExceeded { what: "symbols" });
                // The unit fails on the fault; the first symbol only stands in.
                return SymbolId::FIRST;
            };
            symbols.push(data);
            id
        };
        trace!(%binding, id = id.index(), ?kind, "new symbol facade");

        if let Some(previous) = self.symbol_index.borrow_mut().insert(binding, id) {
            self.record_fault(SemanticError::IdentityViolation {
                binding,
                first: previous.index() as u32,
                second: id.index() as u32,
            });
        }
        id
    }

    /// Read type data. The closure must not call back into the context.
    pub(crate) fn with_type<R>(&self, id: TypeId, f: impl FnOnce(&TypeData) -> R) -> R {
        f(&self.types.borrow()[id.index()])
    }

    /// Read symbol data. The closure must not call back into the context.
    pub(crate) fn with_symbol<R>(&self, id: SymbolId, f: impl FnOnce(&SymbolData) -> R) -> R {
        f(&self.symbols.borrow()[id.index()])
    }

    pub(crate) fn with_symbol_mut<R>(
        &self,
        id: SymbolId,
        f: impl FnOnce(&mut SymbolData) -> R,
    ) -> R {
        f(&mut self.symbols.borrow_mut()[id.index()])
    }

    pub(crate) fn record_fault(&self, error: SemanticError) {
        warn!(%error, "semantic model inconsistency");
        let mut slot = self.fault.borrow_mut();
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    pub(crate) fn note_hit(&self) {
        let mut stats = self.stats.get();
        stats.hits += 1;
        self.stats.set(stats);
    }

    fn note_miss(&self) {
        let mut stats = self.stats.get();
        stats.misses += 1;
        self.stats.set(stats);
    }
}

impl std::fmt::Debug for SemanticContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticContext")
            .field("types", &self.type_count())
            .field("symbols", &self.symbol_count())
            .field("stats", &self.stats.get())
            .finish()
    }
}
