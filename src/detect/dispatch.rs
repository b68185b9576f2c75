//! Single-pass rule dispatch over a syntax tree.
//!
//! Detectors subscribe to node kinds. The [`Dispatcher`] walks the tree once
//! and, for every node, calls each subscriber in registration order: on entry
//! before the children, on exit after them.
//!
//! A detector that returns an error or panics is marked faulted for the unit.
//! It gets no further callbacks and its findings are dropped; every other
//! detector carries on unaffected.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::types::{Finding, QuickFix, RuleKey};
use crate::error::EngineError;
use crate::semantic::SemanticContext;
use crate::tree::{Node, NodeKind, Span, Tree, WalkEvent};

/// Everything a detector or filter may look at for one unit.
#[derive(Clone, Copy)]
pub struct UnitView<'u> {
    pub path: &'u str,
    pub source: &'u str,
    pub tree: &'u Tree,
    pub semantic: &'u SemanticContext,
}

impl<'u> UnitView<'u> {
    /// Source text under `span`, empty when the span has no byte range.
    pub fn text(&self, span: Span) -> &'u str {
        self.source.get(span.start_byte..span.end_byte).unwrap_or("")
    }

    /// Full text of one 1-indexed source line.
    pub fn line(&self, line: usize) -> &'u str {
        line.checked_sub(1)
            .and_then(|index| self.source.lines().nth(index))
            .unwrap_or("")
    }
}

/// Per-callback handle used by detectors to read the unit and report.
pub struct VisitContext<'u> {
    unit: UnitView<'u>,
    rule: RuleKey,
    findings: Vec<Finding>,
}

impl<'u> VisitContext<'u> {
    fn new(unit: UnitView<'u>, rule: RuleKey) -> Self {
        Self {
            unit,
            rule,
            findings: Vec::new(),
        }
    }

    pub fn unit(&self) -> UnitView<'u> {
        self.unit
    }

    pub fn semantic(&self) -> &'u SemanticContext {
        self.unit.semantic
    }

    pub fn rule(&self) -> RuleKey {
        self.rule
    }

    /// Emit a finding for the detector being called.
    pub fn report(&mut self, span: Span, message: impl Into<String>, fix: Option<QuickFix>) {
        let mut finding = Finding::new(self.rule, span, message);
        finding.fix = fix;
        self.findings.push(finding);
    }
}

/// A pluggable unit of analysis logic.
///
/// Detectors are created per unit, so they may keep per-unit state (for
/// instance their own stack of enclosing declarations) in `self`.
pub trait Detector {
    fn key(&self) -> RuleKey;

    /// Node kinds this detector wants to be called for.
    fn nodes_to_visit(&self) -> &'static [NodeKind];

    fn scan_start(&mut self, _cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called when a subscribed node is entered, before its children.
    fn visit_node(&mut self, _node: Node<'_>, _cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called when a subscribed node is left, after its children.
    fn leave_node(&mut self, _node: Node<'_>, _cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn scan_end(&mut self, _cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Callback registered with [`Dispatcher::on_enter`] or
/// [`Dispatcher::on_exit`].
pub type NodeCallback<'d> =
    Box<dyn FnMut(Node<'_>, &mut VisitContext<'_>) -> anyhow::Result<()> + 'd>;

/// Shared cancellation flag, checked once per visited node.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Traversing,
    Done,
}

impl DispatchState {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchState::Idle => "idle",
            DispatchState::Traversing => "traversing",
            DispatchState::Done => "done",
        }
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Start,
    Enter,
    Exit,
    End,
}

enum Handler<'d> {
    Detector(Box<dyn Detector + 'd>),
    Callback(NodeCallback<'d>),
}

struct Slot<'d> {
    key: RuleKey,
    handler: Handler<'d>,
    /// Findings tagged with their emission sequence number.
    findings: Vec<(u64, Finding)>,
    faulted: bool,
}

/// Per-unit rule dispatch engine.
pub struct Dispatcher<'d> {
    state: DispatchState,
    slots: Vec<Slot<'d>>,
    enter: FxHashMap<NodeKind, Vec<usize>>,
    exit: FxHashMap<NodeKind, Vec<usize>>,
    cancel: Option<CancellationToken>,
    next_seq: u64,
    nodes_visited: usize,
    findings: Vec<Finding>,
}

impl Default for Dispatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d> Dispatcher<'d> {
    pub fn new() -> Self {
        Self {
            state: DispatchState::Idle,
            slots: Vec::new(),
            enter: FxHashMap::default(),
            exit: FxHashMap::default(),
            cancel: None,
            next_seq: 0,
            nodes_visited: 0,
            findings: Vec::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    fn expect_state(&self, expected: DispatchState) -> Result<(), EngineError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                expected: expected.as_str(),
                found: self.state.as_str(),
            })
        }
    }

    fn push_slot(&mut self, key: RuleKey, handler: Handler<'d>) -> usize {
        self.slots.push(Slot {
            key,
            handler,
            findings: Vec::new(),
            faulted: false,
        });
        self.slots.len() - 1
    }

    /// Subscribe a detector to its node kinds, on both entry and exit.
    pub fn register(&mut self, detector: Box<dyn Detector + 'd>) -> Result<(), EngineError> {
        self.expect_state(DispatchState::Idle)?;
        let key = detector.key();
        let kinds = detector.nodes_to_visit();
        let slot = self.push_slot(key, Handler::Detector(detector));
        for &kind in kinds {
            self.enter.entry(kind).or_default().push(slot);
            self.exit.entry(kind).or_default().push(slot);
        }
        Ok(())
    }

    /// Subscribe a callback to entry of `kind` nodes, reporting as `key`.
    pub fn on_enter(
        &mut self,
        key: RuleKey,
        kind: NodeKind,
        callback: NodeCallback<'d>,
    ) -> Result<(), EngineError> {
        self.expect_state(DispatchState::Idle)?;
        let slot = self.push_slot(key, Handler::Callback(callback));
        self.enter.entry(kind).or_default().push(slot);
        Ok(())
    }

    /// Subscribe a callback to exit of `kind` nodes, reporting as `key`.
    pub fn on_exit(
        &mut self,
        key: RuleKey,
        kind: NodeKind,
        callback: NodeCallback<'d>,
    ) -> Result<(), EngineError> {
        self.expect_state(DispatchState::Idle)?;
        let slot = self.push_slot(key, Handler::Callback(callback));
        self.exit.entry(kind).or_default().push(slot);
        Ok(())
    }

    pub fn rule_count(&self) -> usize {
        self.slots.len()
    }

    /// Walk `unit.tree` once, invoking subscribers.
    ///
    /// On cancellation every finding is discarded and the dispatcher ends in
    /// `Done` with an empty finding list.
    pub fn run(&mut self, unit: UnitView<'_>) -> Result<(), EngineError> {
        self.expect_state(DispatchState::Idle)?;
        self.state = DispatchState::Traversing;

        let root = unit.tree.root();
        for slot in &mut self.slots {
            invoke(slot, Phase::Start, root, unit, &mut self.next_seq);
        }

        for event in unit.tree.walk() {
            let (node, phase, table) = match event {
                WalkEvent::Enter(node) => {
                    if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                        return Err(self.abort(unit.path));
                    }
                    self.nodes_visited += 1;
                    (node, Phase::Enter, &self.enter)
                }
                WalkEvent::Exit(node) => (node, Phase::Exit, &self.exit),
            };
            if let Some(subscribers) = table.get(&node.kind()) {
                for &index in subscribers {
                    invoke(&mut self.slots[index], phase, node, unit, &mut self.next_seq);
                }
            }
        }

        for slot in &mut self.slots {
            invoke(slot, Phase::End, root, unit, &mut self.next_seq);
        }

        let mut collected: Vec<(u64, Finding)> = self
            .slots
            .iter_mut()
            .filter(|slot| !slot.faulted)
            .flat_map(|slot| slot.findings.drain(..))
            .collect();
        collected.sort_by_key(|(seq, _)| *seq);
        self.findings = collected.into_iter().map(|(_, f)| f).collect();
        self.state = DispatchState::Done;
        debug!(
            path = unit.path,
            rules = self.slots.len(),
            nodes = self.nodes_visited,
            findings = self.findings.len(),
            "dispatch finished"
        );
        Ok(())
    }

    fn abort(&mut self, path: &str) -> EngineError {
        for slot in &mut self.slots {
            slot.findings.clear();
        }
        self.findings.clear();
        self.state = DispatchState::Done;
        debug!(path, nodes = self.nodes_visited, "dispatch cancelled");
        EngineError::Cancelled {
            path: path.to_string(),
        }
    }

    /// Accumulated findings, available once traversal is done.
    pub fn findings(&self) -> Result<&[Finding], EngineError> {
        self.expect_state(DispatchState::Done)?;
        Ok(&self.findings)
    }

    pub fn into_findings(self) -> Result<Vec<Finding>, EngineError> {
        self.expect_state(DispatchState::Done)?;
        Ok(self.findings)
    }

    /// Rules whose detector faulted during the run, in registration order.
    pub fn faulted_rules(&self) -> Vec<RuleKey> {
        let mut keys: Vec<RuleKey> = Vec::new();
        for slot in self.slots.iter().filter(|s| s.faulted) {
            if !keys.contains(&slot.key) {
                keys.push(slot.key);
            }
        }
        keys
    }

    pub fn nodes_visited(&self) -> usize {
        self.nodes_visited
    }
}

fn invoke(slot: &mut Slot<'_>, phase: Phase, node: Node<'_>, unit: UnitView<'_>, seq: &mut u64) {
    if slot.faulted {
        return;
    }
    let mut cx = VisitContext::new(unit, slot.key);
    let handler = &mut slot.handler;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match (handler, phase) {
        (Handler::Detector(d), Phase::Start) => d.scan_start(&mut cx),
        (Handler::Detector(d), Phase::Enter) => d.visit_node(node, &mut cx),
        (Handler::Detector(d), Phase::Exit) => d.leave_node(node, &mut cx),
        (Handler::Detector(d), Phase::End) => d.scan_end(&mut cx),
        (Handler::Callback(f), Phase::Enter | Phase::Exit) => f(node, &mut cx),
        (Handler::Callback(_), Phase::Start | Phase::End) => Ok(()),
    }));

    let error = match outcome {
        Ok(Ok(())) => {
            for finding in cx.findings {
                slot.findings.push((*seq, finding));
                *seq += 1;
            }
            return;
        }
        Ok(Err(error)) => error.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };
    warn!(
        rule = %slot.key,
        path = unit.path,
        node = %node.kind(),
        line = node.span().start_line,
        %error,
        "detector failed, dropping its findings for this unit"
    );
    slot.faulted = true;
    slot.findings.clear();
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
