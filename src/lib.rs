//! Semacheck - semantic core of a Java static analyzer.
//!
//! Semacheck answers semantic questions about Java code (what type is this,
//! what does it extend, which annotations does it carry, which method does
//! this call resolve to) and runs many independent rules over a syntax tree
//! in one pass, then filters their findings with framework knowledge.
//!
//! # Architecture
//!
//! - `semantic`: type, symbol and annotation facades over resolver bindings
//! - `tree`: the syntax tree a front-end hands over
//! - `frontend`: tree-sitter Java front-end, class path, in-memory resolver
//! - `matchers`: declarative method signature predicates
//! - `detect`: single-pass rule dispatch and the analysis runner
//! - `filters`: post-dispatch issue filters (Spring, `@SuppressWarnings`,
//!   inline comments)
//! - `checks`: the built-in rules
//! - `config`: YAML configuration
//!
//! # Adding a Rule
//!
//! Implement [`detect::Detector`] and register a factory with a
//! [`detect::DetectorRegistry`]. See `src/checks/` for examples.

pub mod checks;
pub mod config;
pub mod detect;
pub mod error;
pub mod filters;
pub mod frontend;
pub mod matchers;
pub mod semantic;
pub mod tree;

pub use config::AnalysisConfig;
pub use detect::{AnalysisResult, Detector, Finding, RuleKey, Runner, UnitReport};
pub use error::{EngineError, SemanticError};
#[cfg(feature = "tree-sitter")]
pub use frontend::JavaFrontend;
pub use frontend::{AnalysisUnit, ClassPath, Frontend, MemoryResolver};
pub use semantic::{SemanticContext, Symbol, Type, TypeSymbol};
