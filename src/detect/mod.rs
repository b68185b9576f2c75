//! Rule dispatch: detectors, the single-pass dispatcher and the runner.

mod dispatch;
mod runner;
mod types;

pub use dispatch::{
    CancellationToken, DispatchState, Detector, Dispatcher, NodeCallback, UnitView, VisitContext,
};
pub use runner::{DetectorFactory, DetectorRegistry, Runner};
pub use types::{
    AnalysisResult, Finding, QuickFix, RuleKey, SuppressedFinding, TextEdit, UnitFailure,
    UnitReport,
};
