//! Error types for the semantic model and the analysis engine.
//!
//! Unresolved semantics have no variant here: a binding
//! that cannot be resolved is surfaced as `UNKNOWN` or an empty result, never
//! as an error.

use thiserror::Error;

use crate::semantic::BindingId;

/// An invariant violation inside the semantic model.
///
/// Any of these makes every finding derived from the unit unreliable, so the
/// runner fails the whole unit when one is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("owner chain of {name} ({binding}) does not terminate")]
    OwnerCycle { binding: BindingId, name: String },

    #[error("supertype hierarchy of {name} ({binding}) is cyclic")]
    SupertypeCycle { binding: BindingId, name: String },

    #[error("binding {binding} maps to two facades ({first} and {second})")]
    IdentityViolation {
        binding: BindingId,
        first: u32,
        second: u32,
    },

    #[error("semantic context holds more {what} than it can index")]
    CapacityExceeded { what: &'static str },
}

/// Failure of a whole analysis unit.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("dispatcher is {found}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        found: &'static str,
    },

    #[error("analysis of {path} was cancelled")]
    Cancelled { path: String },

    #[error("semantic model of {path} is unsound: {source}")]
    Semantic {
        path: String,
        #[source]
        source: SemanticError,
    },
}
