//! Detection runner: the per-unit pipeline and multi-unit execution.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::dispatch::{CancellationToken, Detector, Dispatcher};
use super::types::{AnalysisResult, RuleKey, UnitFailure, UnitReport};
use crate::checks;
use crate::config::AnalysisConfig;
use crate::error::EngineError;
use crate::filters::{FilterEngine, FrameworkFilter, InlineCommentFilter, SuppressWarningsFilter};
use crate::frontend::{AnalysisUnit, Frontend};
use crate::semantic::SemanticContext;

/// Creates a fresh detector for one unit.
pub type DetectorFactory = Box<dyn Fn() -> Box<dyn Detector> + Send + Sync>;

/// Detector factories in registration order.
#[derive(Default)]
pub struct DetectorRegistry {
    factories: Vec<(RuleKey, DetectorFactory)>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, key: RuleKey, factory: F)
    where
        F: Fn() -> Box<dyn Detector> + Send + Sync + 'static,
    {
        self.factories.push((key, Box::new(factory)));
    }

    /// Drop every factory registered under `key`.
    pub fn remove(&mut self, key: RuleKey) {
        self.factories.retain(|(k, _)| *k != key);
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn keys(&self) -> Vec<RuleKey> {
        self.factories.iter().map(|(key, _)| *key).collect()
    }

    /// One new detector per factory.
    pub fn instantiate(&self) -> Vec<Box<dyn Detector>> {
        self.factories.iter().map(|(_, factory)| factory()).collect()
    }
}

/// Runs detectors and issue filters over analysis units.
pub struct Runner {
    registry: DetectorRegistry,
    filters: FilterEngine,
    parallel: bool,
    cancel: CancellationToken,
}

impl Runner {
    /// Create a runner with the built-in rules and filters the configuration
    /// enables.
    pub fn new(config: &AnalysisConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let registry = checks::default_registry(config)?;

        let mut filters = FilterEngine::new();
        if config.filters.framework.is_enabled() {
            filters.register(Box::new(FrameworkFilter::from_config(&config.filters.framework)));
        }
        if config.filters.suppress_warnings_enabled() {
            filters.register(Box::new(SuppressWarningsFilter::new()));
        }
        if config.filters.inline_comments_enabled() {
            filters.register(Box::new(InlineCommentFilter::new()));
        }

        Ok(Self::with_parts(registry, filters).parallel(config.is_parallel()))
    }

    /// Create a runner from an explicit registry and filter set.
    pub fn with_parts(registry: DetectorRegistry, filters: FilterEngine) -> Self {
        Self {
            registry,
            filters,
            parallel: true,
            cancel: CancellationToken::new(),
        }
    }

    /// Set whether units are analyzed on the rayon thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Token that cancels every analysis this runner performs.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn rules(&self) -> Vec<RuleKey> {
        self.registry.keys()
    }

    pub fn filter_names(&self) -> Vec<&'static str> {
        self.filters.names()
    }

    /// Analyze one unit: dispatch, filter, then check the semantic model for
    /// structural faults.
    pub fn analyze(&self, unit: &AnalysisUnit) -> Result<UnitReport, EngineError> {
        let semantic = unit.semantic_context();
        let view = unit.view(&semantic);

        let mut dispatcher = Dispatcher::new().with_cancellation(self.cancel.clone());
        for detector in self.registry.instantiate() {
            dispatcher.register(detector)?;
        }
        dispatcher.run(view)?;
        let faulted_rules = dispatcher.faulted_rules();
        let findings = dispatcher.into_findings()?;
        check_fault(unit, &semantic)?;

        let outcome = self.filters.apply(view, findings);
        check_fault(unit, &semantic)?;

        let cache = semantic.cache_stats();
        debug!(
            path = %unit.path,
            kept = outcome.kept.len(),
            suppressed = outcome.suppressed.len(),
            faulted = faulted_rules.len(),
            "Semantic cache: {} hits, {} misses",
            cache.hits,
            cache.misses
        );
        Ok(UnitReport {
            path: unit.path.clone(),
            findings: outcome.kept,
            suppressed: outcome.suppressed,
            faulted_rules,
            cache,
        })
    }

    /// Analyze independent units, in parallel unless disabled. Reports keep
    /// the input order.
    pub fn analyze_all(&self, units: &[AnalysisUnit]) -> AnalysisResult {
        let outcomes: Vec<Result<UnitReport, EngineError>> = if self.parallel {
            units.par_iter().map(|unit| self.analyze(unit)).collect()
        } else {
            units.iter().map(|unit| self.analyze(unit)).collect()
        };

        let mut result = AnalysisResult::new();
        for (unit, outcome) in units.iter().zip(outcomes) {
            match outcome {
                Ok(report) => result.reports.push(report),
                Err(error) => {
                    warn!(path = %unit.path, %error, "unit failed");
                    result.failures.push(UnitFailure {
                        path: unit.path.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }
        result
    }

    /// Read, parse and analyze files. Files the front-end cannot read or
    /// parse are reported as failures.
    pub fn analyze_files(&self, frontend: &dyn Frontend, files: &[PathBuf]) -> AnalysisResult {
        let parse = |path: &PathBuf| -> Result<AnalysisUnit, UnitFailure> {
            read_and_parse(frontend, path).map_err(|e| UnitFailure {
                path: path.display().to_string(),
                error: e.to_string(),
            })
        };
        let parsed: Vec<Result<AnalysisUnit, UnitFailure>> = if self.parallel {
            files.par_iter().map(parse).collect()
        } else {
            files.iter().map(parse).collect()
        };

        let mut units = Vec::with_capacity(parsed.len());
        let mut failures = Vec::new();
        for outcome in parsed {
            match outcome {
                Ok(unit) => units.push(unit),
                Err(failure) => {
                    warn!(path = %failure.path, error = %failure.error, "failed to parse");
                    failures.push(failure);
                }
            }
        }

        let mut result = self.analyze_all(&units);
        result.failures.extend(failures);
        result
    }
}

/// A structural fault recorded by the semantic model fails the whole unit.
fn check_fault(unit: &AnalysisUnit, semantic: &SemanticContext) -> Result<(), EngineError> {
    match semantic.take_fault() {
        Some(source) => Err(EngineError::Semantic {
            path: unit.path.clone(),
            source,
        }),
        None => Ok(()),
    }
}

fn read_and_parse(frontend: &dyn Frontend, path: &Path) -> anyhow::Result<AnalysisUnit> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !frontend.handles_extension(extension) {
        anyhow::bail!("no {} front-end for {}", frontend.language_id(), path.display());
    }
    let source = fs::read_to_string(path)?;
    frontend.parse(path, &source)
}
