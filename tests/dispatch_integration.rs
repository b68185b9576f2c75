#![cfg(feature = "tree-sitter")]
//! Integration tests for rule dispatch through the runner.

use std::path::PathBuf;

use semacheck::checks::STRING_BUILDER_IS_EMPTY;
use semacheck::detect::{DetectorRegistry, VisitContext};
use semacheck::filters::FilterEngine;
use semacheck::tree::{Node, NodeKind};
use semacheck::{AnalysisConfig, AnalysisUnit, Detector, JavaFrontend, RuleKey, Runner};

const CLASSES: RuleKey = RuleKey::new("CLASSES");
const BROKEN: RuleKey = RuleKey::new("BROKEN");
const HIERARCHY: RuleKey = RuleKey::new("HIERARCHY");

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn parse(path: &str, source: &str) -> AnalysisUnit {
    JavaFrontend::new().parse_source(path, source).expect("should parse")
}

/// Reports every named class.
struct ReportClasses;

impl Detector for ReportClasses {
    fn key(&self) -> RuleKey {
        CLASSES
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::Class]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        if let Some(name) = node.name() {
            cx.report(node.name_span(), format!("class {}", name), None);
        }
        Ok(())
    }
}

/// Panics on the first method.
struct Broken;

impl Detector for Broken {
    fn key(&self) -> RuleKey {
        BROKEN
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::Class, NodeKind::Method]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        if node.kind() == NodeKind::Method {
            panic!("unexpected method");
        }
        cx.report(node.name_span(), "seen before failing", None);
        Ok(())
    }
}

/// Walks the supertype hierarchy of every class.
struct Hierarchy;

impl Detector for Hierarchy {
    fn key(&self) -> RuleKey {
        HIERARCHY
    }

    fn nodes_to_visit(&self) -> &'static [NodeKind] {
        &[NodeKind::Class]
    }

    fn visit_node(&mut self, node: Node<'_>, cx: &mut VisitContext<'_>) -> anyhow::Result<()> {
        if let Some(binding) = node.binding() {
            let depth = cx.semantic().type_symbol(binding).super_types().len();
            cx.report(node.name_span(), format!("{} supertypes", depth), None);
        }
        Ok(())
    }
}

fn runner(register: impl FnOnce(&mut DetectorRegistry)) -> Runner {
    let mut registry = DetectorRegistry::new();
    register(&mut registry);
    Runner::with_parts(registry, FilterEngine::new()).parallel(false)
}

#[test]
fn test_builder_fixture_with_default_rules() {
    let runner = Runner::new(&AnalysisConfig::default()).unwrap();
    let result = runner.analyze_files(&JavaFrontend::new(), &[testdata_path().join("Builders.java")]);
    assert!(!result.has_failures());

    let report = &result.reports[0];
    let lines: Vec<usize> = report.findings_for(STRING_BUILDER_IS_EMPTY).map(|f| f.line()).collect();
    assert_eq!(lines, vec![7, 11, 15]);
    assert_eq!(report.findings.len(), 3);

    let fix = report.findings[0].fix.as_ref().expect("isEmpty case has a fix");
    assert_eq!(fix.edits.len(), 1);
    assert_eq!(fix.edits[0].replacement, ".isEmpty()");

    assert_eq!(report.suppressed.len(), 1);
    assert_eq!(report.suppressed[0].finding.line(), 20);
    assert_eq!(report.suppressed[0].filter, "suppress-warnings");
}

#[test]
fn test_faulted_detector_loses_only_its_findings() {
    let runner = runner(|registry| {
        registry.register(BROKEN, || Box::new(Broken));
        registry.register(CLASSES, || Box::new(ReportClasses));
    });
    let unit = parse("A.java", "class A {\n    void m() {}\n}\nclass B {}\n");

    let report = runner.analyze(&unit).expect("unit should still succeed");
    assert_eq!(report.faulted_rules, vec![BROKEN]);
    assert!(report.findings.iter().all(|f| f.rule == CLASSES));
    assert_eq!(report.findings.len(), 2);
}

#[test]
fn test_cyclic_unit_fails_without_affecting_others() {
    let runner = runner(|registry| registry.register(HIERARCHY, || Box::new(Hierarchy)));
    let units = vec![
        parse("Cycle.java", "class A extends B {}\nclass B extends A {}\n"),
        parse("Fine.java", "class C {}\n"),
    ];

    let result = runner.analyze_all(&units);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].path, "Cycle.java");
    assert!(result.failures[0].error.contains("cyclic"));
    assert_eq!(result.reports.len(), 1);
    assert_eq!(result.reports[0].findings[0].message, "1 supertypes");
}

#[test]
fn test_cancelled_runner_fails_every_unit() {
    let runner = runner(|registry| registry.register(CLASSES, || Box::new(ReportClasses)));
    runner.cancellation_token().cancel();

    let result = runner.analyze_all(&[parse("A.java", "class A {}\n")]);
    assert!(result.reports.is_empty());
    assert_eq!(result.failures.len(), 1);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let config = AnalysisConfig {
        class_path: vec![testdata_path().join("spring-classpath.yaml")],
        ..Default::default()
    };
    let frontend = JavaFrontend::with_class_path(&config.load_class_path().unwrap());
    let files: Vec<PathBuf> = [
        "Builders.java",
        "spring/OrderService.java",
        "spring/OrderRepository.java",
        "spring/OrderController.java",
        "servlet/OrderServlet.java",
    ]
    .iter()
    .map(|f| testdata_path().join(f))
    .collect();

    let summarize = |parallel: bool| -> Vec<(String, Vec<String>)> {
        let runner = Runner::new(&config).unwrap().parallel(parallel);
        let result = runner.analyze_files(&frontend, &files);
        assert!(!result.has_failures());
        result
            .reports
            .iter()
            .map(|r| (r.path.clone(), r.findings.iter().map(|f| f.to_string()).collect()))
            .collect()
    };
    let sequential = summarize(false);
    assert_eq!(sequential.len(), files.len());
    assert_eq!(summarize(true), sequential);
}
