//! Front-ends: turn source text into a [`Tree`] plus the bindings behind it.

mod classpath;
#[cfg(feature = "tree-sitter")]
mod java;
mod resolver;

pub use classpath::{
    ClassPath, LibraryConstructor, LibraryField, LibraryMethod, LibraryType, LibraryTypeKind,
};
#[cfg(feature = "tree-sitter")]
pub use java::JavaFrontend;
pub use resolver::{is_primitive_name, MemoryResolver};

use std::path::Path;
use std::sync::Arc;

use crate::detect::UnitView;
use crate::semantic::{Resolver, SemanticContext};
use crate::tree::Tree;

/// One compilation unit ready for analysis.
///
/// The resolver is shared and immutable; each analysis builds its own
/// [`SemanticContext`] over it.
pub struct AnalysisUnit {
    pub path: String,
    pub source: String,
    pub tree: Tree,
    pub resolver: Arc<dyn Resolver>,
}

impl AnalysisUnit {
    pub fn new(
        path: impl Into<String>,
        source: impl Into<String>,
        tree: Tree,
        resolver: Arc<dyn Resolver>,
    ) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            tree,
            resolver,
        }
    }

    pub fn semantic_context(&self) -> SemanticContext {
        SemanticContext::new(Arc::clone(&self.resolver))
    }

    /// Borrowed view for detectors and filters.
    pub fn view<'u>(&'u self, semantic: &'u SemanticContext) -> UnitView<'u> {
        UnitView {
            path: &self.path,
            source: &self.source,
            tree: &self.tree,
            semantic,
        }
    }
}

impl std::fmt::Debug for AnalysisUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisUnit")
            .field("path", &self.path)
            .field("nodes", &self.tree.len())
            .finish()
    }
}

/// Language front-end.
///
/// Implementations must be shareable across worker threads; per-parse state
/// such as a tree-sitter parser is created inside `parse`.
pub trait Frontend: Send + Sync {
    /// Returns the language identifier (e.g., "java").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this front-end handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse and lower one source file.
    ///
    /// Syntax errors do not fail the parse; whatever the parser recovered is
    /// lowered.
    fn parse(&self, path: &Path, source: &str) -> anyhow::Result<AnalysisUnit>;

    /// Check if this front-end handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
