//! Annotation metadata attached to symbols.

use std::fmt;
use std::rc::Rc;

use super::{SemanticContext, Type, TypeId};

/// Stored form of one annotation on a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AnnotationEntry {
    Resolved(TypeId),
    /// Annotation type the resolver could not bind; only its name token
    /// survives.
    Unresolved(Rc<str>),
}

/// One annotation as seen by consumers.
#[derive(Clone)]
pub enum Annotation<'a> {
    Resolved(Type<'a>),
    /// Name token of an unbound annotation. Usable for name matching only.
    Unresolved(Rc<str>),
}

impl Annotation<'_> {
    /// Semantic check. Never true for unresolved annotations.
    pub fn is(&self, qualified_name: &str) -> bool {
        match self {
            Annotation::Resolved(ty) => ty.is(qualified_name),
            Annotation::Unresolved(_) => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Annotation::Resolved(_))
    }

    /// Name as written: fully-qualified for resolved annotations, the raw
    /// token for unresolved ones.
    pub fn name(&self) -> Rc<str> {
        match self {
            Annotation::Resolved(ty) => ty.qualified_name(),
            Annotation::Unresolved(token) => token.clone(),
        }
    }
}

impl fmt::Debug for Annotation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Resolved(ty) => write!(f, "@{}", ty),
            Annotation::Unresolved(token) => write!(f, "@{}?", token),
        }
    }
}

/// Ordered annotations of one symbol.
#[derive(Clone)]
pub struct Metadata<'a> {
    ctx: &'a SemanticContext,
    entries: Rc<[AnnotationEntry]>,
}

impl<'a> Metadata<'a> {
    pub(crate) fn new(ctx: &'a SemanticContext, entries: Rc<[AnnotationEntry]>) -> Self {
        Self { ctx, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn annotations(&self) -> impl Iterator<Item = Annotation<'a>> + '_ {
        let ctx = self.ctx;
        self.entries.iter().map(move |entry| match entry {
            AnnotationEntry::Resolved(id) => Annotation::Resolved(Type::new(ctx, *id)),
            AnnotationEntry::Unresolved(token) => Annotation::Unresolved(token.clone()),
        })
    }

    /// Semantic match against resolved annotations only.
    pub fn is_annotated_with(&self, qualified_name: &str) -> bool {
        self.annotations().any(|a| a.is(qualified_name))
    }

    pub fn is_annotated_with_any<S: AsRef<str>>(&self, qualified_names: &[S]) -> bool {
        self.annotations()
            .any(|a| qualified_names.iter().any(|n| a.is(n.as_ref())))
    }

    /// Name tokens of annotations the resolver could not bind.
    pub fn unresolved_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            AnnotationEntry::Unresolved(token) => Some(&**token),
            AnnotationEntry::Resolved(_) => None,
        })
    }

    /// Syntactic fallback: an unresolved annotation whose token ends with
    /// `suffix`. Resolved annotations never match here.
    pub fn has_unresolved_ending_with(&self, suffix: &str) -> bool {
        self.unresolved_names().any(|name| name.ends_with(suffix))
    }
}

impl fmt::Debug for Metadata<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.annotations()).finish()
    }
}
