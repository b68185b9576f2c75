//! Type facade.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::context::ROOT_TYPE_NAME;
use super::{BindingId, SemanticContext, TypeKind, TypeSymbol};

/// Handle of a type facade inside one [`SemanticContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// The unknown type. There is exactly one per context.
    pub const UNKNOWN: TypeId = TypeId(0);

    /// `None` once a context holds more than `u32::MAX` types.
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

/// A resolved type, or `UNKNOWN`.
///
/// Equality and hashing are by identity: two `Type`s are equal when they were
/// produced by the same context for the same binding.
#[derive(Clone, Copy)]
pub struct Type<'a> {
    ctx: &'a SemanticContext,
    id: TypeId,
}

impl<'a> Type<'a> {
    pub(crate) fn new(ctx: &'a SemanticContext, id: TypeId) -> Self {
        Self { ctx, id }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn context(&self) -> &'a SemanticContext {
        self.ctx
    }

    pub fn binding(&self) -> Option<BindingId> {
        self.ctx.with_type(self.id, |d| d.binding)
    }

    pub fn is_unknown(&self) -> bool {
        self.id.is_unknown()
    }

    pub fn kind(&self) -> TypeKind {
        self.ctx.with_type(self.id, |d| d.kind)
    }

    pub fn name(&self) -> Rc<str> {
        self.ctx.with_type(self.id, |d| d.name.clone())
    }

    pub fn qualified_name(&self) -> Rc<str> {
        self.ctx.with_type(self.id, |d| d.qualified_name.clone())
    }

    /// Exact match on the fully-qualified name. Always false for `UNKNOWN`.
    pub fn is(&self, qualified_name: &str) -> bool {
        !self.is_unknown() && self.ctx.with_type(self.id, |d| &*d.qualified_name == qualified_name)
    }

    pub fn is_class(&self) -> bool {
        matches!(
            self.kind(),
            TypeKind::Class | TypeKind::Enum | TypeKind::Record
        )
    }

    pub fn is_interface(&self) -> bool {
        self.kind().is_interface_like()
    }

    pub fn is_array(&self) -> bool {
        self.kind() == TypeKind::Array
    }

    pub fn is_primitive(&self) -> bool {
        self.kind() == TypeKind::Primitive
    }

    pub fn is_root(&self) -> bool {
        self.is(ROOT_TYPE_NAME)
    }

    /// Component type of an array.
    pub fn element_type(&self) -> Option<Type<'a>> {
        self.ctx
            .with_type(self.id, |d| d.element)
            .map(|id| Type::new(self.ctx, id))
    }

    /// Declaration symbol for declared types and arrays.
    pub fn symbol(&self) -> Option<TypeSymbol<'a>> {
        let (binding, kind) = self.ctx.with_type(self.id, |d| (d.binding, d.kind));
        match binding {
            Some(b) if kind.is_declared() || kind == TypeKind::Array => {
                Some(self.ctx.type_symbol(b))
            }
            _ => None,
        }
    }

    /// `true` when this type is `qualified_name` or has it among its
    /// linearized supertypes. Every resolved reference type, interfaces
    /// included, is a subtype of the root object type. `UNKNOWN` is a subtype
    /// of nothing.
    pub fn is_subtype_of(&self, qualified_name: &str) -> bool {
        if self.is_unknown() {
            return false;
        }
        if self.is(qualified_name) {
            return true;
        }
        if !self.is_reference() {
            return false;
        }
        qualified_name == ROOT_TYPE_NAME
            || self
                .symbol()
                .is_some_and(|s| s.super_types().contains_named(qualified_name))
    }

    /// Identity-based variant of [`is_subtype_of`](Self::is_subtype_of).
    pub fn is_subtype_of_type(&self, other: &Type<'a>) -> bool {
        if self.is_unknown() || other.is_unknown() {
            return false;
        }
        if self == other {
            return true;
        }
        if !self.is_reference() {
            return false;
        }
        other.is_root()
            || self
                .symbol()
                .is_some_and(|s| s.super_types().contains(other))
    }

    /// Declared or array type.
    fn is_reference(&self) -> bool {
        !matches!(
            self.kind(),
            TypeKind::Primitive | TypeKind::TypeVariable | TypeKind::Unknown
        )
    }
}

impl PartialEq for Type<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.ctx, other.ctx)
    }
}

impl Eq for Type<'_> {}

impl Hash for Type<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.qualified_name())
    }
}

impl fmt::Display for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// Immutable, cached sequence of types.
///
/// Lists handed out for the same memoized query share storage;
/// [`same_as`](Self::same_as) tells whether two lists are the very same
/// cached sequence.
#[derive(Clone)]
pub struct TypeList<'a> {
    ctx: &'a SemanticContext,
    ids: Rc<[TypeId]>,
}

impl<'a> TypeList<'a> {
    pub(crate) fn new(ctx: &'a SemanticContext, ids: Rc<[TypeId]>) -> Self {
        Self { ctx, ids }
    }

    pub(crate) fn empty(ctx: &'a SemanticContext) -> Self {
        Self::new(ctx, Rc::from(Vec::new()))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[TypeId] {
        &self.ids
    }

    pub fn get(&self, index: usize) -> Option<Type<'a>> {
        self.ids.get(index).map(|&id| Type::new(self.ctx, id))
    }

    pub fn iter(&self) -> impl Iterator<Item = Type<'a>> + '_ {
        let ctx = self.ctx;
        self.ids.iter().map(move |&id| Type::new(ctx, id))
    }

    pub fn contains(&self, ty: &Type<'_>) -> bool {
        std::ptr::eq(self.ctx, ty.context()) && self.ids.contains(&ty.id())
    }

    pub fn contains_named(&self, qualified_name: &str) -> bool {
        self.iter().any(|t| t.is(qualified_name))
    }

    pub fn same_as(&self, other: &TypeList<'_>) -> bool {
        Rc::ptr_eq(&self.ids, &other.ids)
    }

    pub fn to_vec(&self) -> Vec<Type<'a>> {
        self.iter().collect()
    }
}

impl fmt::Debug for TypeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
