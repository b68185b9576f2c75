//! Capability interface over an external resolver's bindings.
//!
//! The semantic model never derives inheritance or declaration facts on its
//! own. Everything it knows comes through [`Resolver`], which any
//! parser/compiler front-end can implement.

use std::fmt;

/// Opaque handle to one externally-resolved declaration or type.
///
/// Two handles are the same declaration if and only if they compare equal;
/// resolvers must hand out canonical ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u32);

impl BindingId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of declaration a binding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Package,
    Type,
    Method,
    Variable,
}

/// Shape of a type binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
    Array,
    Primitive,
    TypeVariable,
    Unknown,
}

impl TypeKind {
    /// Interfaces and annotation types have no class supertype.
    pub fn is_interface_like(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Annotation)
    }

    /// Declared reference types: the kinds that own members and supertypes.
    pub fn is_declared(self) -> bool {
        matches!(
            self,
            TypeKind::Class
                | TypeKind::Interface
                | TypeKind::Enum
                | TypeKind::Record
                | TypeKind::Annotation
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "annotation",
            TypeKind::Array => "array",
            TypeKind::Primitive => "primitive",
            TypeKind::TypeVariable => "type-variable",
            TypeKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binding-level queries the semantic model relies on.
///
/// Implementations are plain data once resolution has completed, so they are
/// required to be shareable across worker threads. The per-unit
/// [`SemanticContext`](super::SemanticContext) that wraps them is not.
///
/// Every query must answer for every binding the resolver handed out. Bindings
/// flagged with [`is_recovered`](Resolver::is_recovered) may answer with empty
/// data; the semantic model never looks past that flag for derived queries.
pub trait Resolver: Send + Sync {
    /// Look up a type by fully-qualified name. `None` when the environment
    /// cannot supply it.
    fn resolve_type(&self, qualified_name: &str) -> Option<BindingId>;

    fn kind(&self, binding: BindingId) -> BindingKind;

    /// Simple name of the declaration (`String`, `length`, `sb`).
    fn name(&self, binding: BindingId) -> &str;

    /// Fully-qualified name. For methods and variables, the simple name.
    fn qualified_name(&self, binding: BindingId) -> &str;

    /// `None` for anything that is not a type binding.
    fn type_kind(&self, binding: BindingId) -> Option<TypeKind>;

    /// Whether resolution failed and this binding was recovered from syntax.
    fn is_recovered(&self, binding: BindingId) -> bool;

    /// Declared superclass. Absent for the root object type and interfaces.
    fn superclass(&self, binding: BindingId) -> Option<BindingId>;

    /// Directly declared interfaces, in declaration order.
    fn interfaces(&self, binding: BindingId) -> &[BindingId];

    /// Component type of an array binding.
    fn element_type(&self, binding: BindingId) -> Option<BindingId>;

    /// Enclosing declaration: package for top-level types, type for members,
    /// method for locals and parameters.
    fn owner(&self, binding: BindingId) -> Option<BindingId>;

    /// Variable type, method return type. `None` for `void` and for types.
    fn declared_type(&self, binding: BindingId) -> Option<BindingId>;

    /// Annotation type bindings declared on this declaration, in source order.
    fn annotations(&self, binding: BindingId) -> &[BindingId];

    /// Directly declared members (fields, methods, constructors, nested types).
    fn members(&self, binding: BindingId) -> &[BindingId];

    /// Parameter types of a method binding, in order.
    fn parameter_types(&self, binding: BindingId) -> &[BindingId];

    fn is_varargs(&self, _binding: BindingId) -> bool {
        false
    }

    fn is_constructor(&self, _binding: BindingId) -> bool {
        false
    }
}
