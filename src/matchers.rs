//! Declarative method signature matchers.
//!
//! A [`MethodMatcher`] describes an API shape (owner types, member names,
//! parameter shape) and answers whether a resolved method symbol, invocation
//! or declaration has that shape. Building a matcher resolves nothing;
//! evaluation goes through the unit's [`SemanticContext`]. Anything that
//! resolved to `UNKNOWN` never matches.

use crate::semantic::{SemanticContext, Symbol, Type};
use crate::tree::{Node, NodeKind};

/// Parameter type name that matches every resolved type.
pub const ANY_TYPE: &str = "*";

/// How owner type names are compared with the method's declaring type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OwnerMatch {
    /// Declaring type is exactly one of the names.
    #[default]
    Strict,
    /// Declaring type is one of the names or a subtype of one.
    Inherited,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParameterShape {
    #[default]
    Any,
    /// Exactly these declared parameter types, in order. A varargs method
    /// matches with its last type written as the array type.
    Exact(Vec<String>),
    /// A varargs method declaring exactly these parameter types, the last one
    /// being the array type.
    Variadic(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameMatch {
    Any,
    Names(Vec<String>),
    Constructor,
}

/// Immutable predicate over method symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMatcher {
    owners: Vec<String>,
    owner_match: OwnerMatch,
    names: NameMatch,
    parameters: ParameterShape,
}

impl MethodMatcher {
    pub fn builder() -> MethodMatcherBuilder {
        MethodMatcherBuilder::default()
    }

    pub fn matches_symbol(&self, symbol: &Symbol<'_>) -> bool {
        if !symbol.is_method_symbol() || symbol.is_unknown() {
            return false;
        }
        let Some(owner) = symbol.owner().and_then(|o| o.as_type_symbol()) else {
            return false;
        };
        let owner = owner.as_type();
        if owner.is_unknown() {
            return false;
        }
        self.matches_owner(&owner) && self.matches_name(symbol) && self.matches_parameters(symbol)
    }

    /// Match a method invocation or instance creation by the method it was
    /// bound to. Unbound calls never match, whatever their name.
    pub fn matches_invocation(&self, node: &Node<'_>, ctx: &SemanticContext) -> bool {
        match node.kind() {
            NodeKind::MethodInvocation | NodeKind::NewClass | NodeKind::ConstructorCall => node
                .binding()
                .map(|b| self.matches_symbol(&ctx.method_symbol(b)))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Match a method or constructor declaration.
    pub fn matches_declaration(&self, node: &Node<'_>, ctx: &SemanticContext) -> bool {
        node.kind().is_method_like()
            && node
                .binding()
                .map(|b| self.matches_symbol(&ctx.method_symbol(b)))
                .unwrap_or(false)
    }

    /// Invocation or declaration, whichever `node` is.
    pub fn matches(&self, node: &Node<'_>, ctx: &SemanticContext) -> bool {
        if node.kind().is_method_like() {
            self.matches_declaration(node, ctx)
        } else {
            self.matches_invocation(node, ctx)
        }
    }

    fn matches_owner(&self, owner: &Type<'_>) -> bool {
        if self.owners.is_empty() {
            return true;
        }
        match self.owner_match {
            OwnerMatch::Strict => self.owners.iter().any(|name| owner.is(name)),
            OwnerMatch::Inherited => self.owners.iter().any(|name| owner.is_subtype_of(name)),
        }
    }

    fn matches_name(&self, symbol: &Symbol<'_>) -> bool {
        match &self.names {
            NameMatch::Constructor => symbol.is_constructor(),
            NameMatch::Any => !symbol.is_constructor(),
            NameMatch::Names(names) => {
                !symbol.is_constructor() && names.iter().any(|n| **n == *symbol.name())
            }
        }
    }

    fn matches_parameters(&self, symbol: &Symbol<'_>) -> bool {
        match &self.parameters {
            ParameterShape::Any => true,
            ParameterShape::Exact(types) => parameter_types_match(types, &symbol.parameter_types()),
            ParameterShape::Variadic(types) => {
                symbol.is_varargs() && parameter_types_match(types, &symbol.parameter_types())
            }
        }
    }
}

fn parameter_types_match(expected: &[String], actual: &[Type<'_>]) -> bool {
    expected.len() == actual.len()
        && expected.iter().zip(actual).all(|(name, ty)| {
            if name == ANY_TYPE {
                !ty.is_unknown()
            } else {
                ty.is(name)
            }
        })
}

/// Builder for [`MethodMatcher`]. Unset parts match anything: any owner, any
/// non-constructor name, any parameters.
#[derive(Debug, Clone, Default)]
pub struct MethodMatcherBuilder {
    owners: Vec<String>,
    owner_match: OwnerMatch,
    names: Option<NameMatch>,
    parameters: ParameterShape,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl MethodMatcherBuilder {
    /// Methods declared by exactly one of these types.
    pub fn of_types(mut self, types: &[&str]) -> Self {
        self.owners = to_strings(types);
        self.owner_match = OwnerMatch::Strict;
        self
    }

    /// Methods declared by one of these types or any subtype.
    pub fn of_subtypes(mut self, types: &[&str]) -> Self {
        self.owners = to_strings(types);
        self.owner_match = OwnerMatch::Inherited;
        self
    }

    pub fn names(mut self, names: &[&str]) -> Self {
        self.names = Some(NameMatch::Names(to_strings(names)));
        self
    }

    pub fn any_name(mut self) -> Self {
        self.names = Some(NameMatch::Any);
        self
    }

    pub fn constructor(mut self) -> Self {
        self.names = Some(NameMatch::Constructor);
        self
    }

    pub fn with_any_parameters(mut self) -> Self {
        self.parameters = ParameterShape::Any;
        self
    }

    pub fn without_parameters(mut self) -> Self {
        self.parameters = ParameterShape::Exact(Vec::new());
        self
    }

    /// Exact declared parameter types; [`ANY_TYPE`] accepts any resolved type.
    /// Varargs methods are included, see [`Self::with_varargs_parameters`] to
    /// require them.
    pub fn with_parameters(mut self, types: &[&str]) -> Self {
        self.parameters = ParameterShape::Exact(to_strings(types));
        self
    }

    pub fn with_varargs_parameters(mut self, types: &[&str]) -> Self {
        self.parameters = ParameterShape::Variadic(to_strings(types));
        self
    }

    pub fn build(self) -> MethodMatcher {
        MethodMatcher {
            owners: self.owners,
            owner_match: self.owner_match,
            names: self.names.unwrap_or(NameMatch::Any),
            parameters: self.parameters,
        }
    }
}

/// Union of matchers: matches when any member does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatcherSet {
    matchers: Vec<MethodMatcher>,
}

impl MatcherSet {
    pub fn any_of(matchers: Vec<MethodMatcher>) -> Self {
        Self { matchers }
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn matches_symbol(&self, symbol: &Symbol<'_>) -> bool {
        self.matchers.iter().any(|m| m.matches_symbol(symbol))
    }

    pub fn matches(&self, node: &Node<'_>, ctx: &SemanticContext) -> bool {
        self.matchers.iter().any(|m| m.matches(node, ctx))
    }
}
