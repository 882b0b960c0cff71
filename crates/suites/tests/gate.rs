//! End-to-end runs of the default suites.

use std::path::Path;
use vigilance_core::QualityError;
use vigilance_quality::{BasicQualityEngine, EngineConfig, QualityEngine, VigilanceConfig};
use vigilance_suites::default_catalog;

const COVERAGE: &str = r#"<?xml version="1.0" ?>
<coverage line-rate="0.7" branch-rate="0.5" version="1.9">
  <packages>
    <package name="pkg" line-rate="0.75" branch-rate="0.5" complexity="3">
      <classes>
        <class name="A" filename="pkg/A.ext" line-rate="0.9" branch-rate="0.8" complexity="1"/>
        <class name="B" filename="pkg/B.ext" line-rate="0.6" branch-rate="0.2" complexity="5"/>
        <class name="G" filename="generated/G.ext" line-rate="0" branch-rate="0" complexity="40"/>
      </classes>
    </package>
  </packages>
</coverage>
"#;

const DOXYGEN: &str = "\
include/api.h:12: warning: Member run(int) (function) of class Api is not documented.
src/impl.c:4: warning: return type of member helper is not documented
";

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.display().to_string()
}

fn config(coverage: &str, doxygen: &str, threshold: u32) -> VigilanceConfig {
    let text = format!(
        r#"
suites:
  cobertura:
    report: "{coverage}"
    constraints:
      - type: ignore
        paths: ["generated/**"]
      - type: line-coverage
        pattern: "**"
        threshold: {threshold}
      - type: complexity
        pattern: "**"
        threshold: 10
  doxygen:
    report: "{doxygen}"
    constraints:
      - type: documentation
        pattern: "src/**"
"#
    );
    VigilanceConfig::from_yaml_str(&text).unwrap()
}

#[tokio::test]
async fn test_default_suites_report_violations() {
    let dir = tempfile::tempdir().unwrap();
    let coverage = write(dir.path(), "coverage.xml", COVERAGE);
    let doxygen = write(dir.path(), "doxygen.log", DOXYGEN);

    let engine = BasicQualityEngine::new(default_catalog().unwrap());
    let verdict = engine.run(&config(&coverage, &doxygen, 75)).await.unwrap();
    assert!(!verdict.passed());

    let messages: Vec<(&str, &str)> = verdict
        .report()
        .violations()
        .map(|(suite, s)| (suite, s.message.as_deref().unwrap_or_default()))
        .collect();
    assert_eq!(
        messages,
        vec![
            ("cobertura", "Line coverage too low for file pkg/B.ext (60/75)"),
            (
                "doxygen",
                "documentation failure: src/impl.c:4: return type of member helper is not documented"
            ),
        ]
    );

    let cobertura = verdict.report().suite("cobertura").unwrap();
    assert!(cobertura.notes.is_empty());
    assert_eq!(cobertura.items_evaluated, 4);
}

#[tokio::test]
async fn test_gate_passes_with_lower_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let coverage = write(dir.path(), "coverage.xml", COVERAGE);
    let doxygen = write(dir.path(), "doxygen.log", "");

    let engine = BasicQualityEngine::new(default_catalog().unwrap());
    let verdict = engine.run(&config(&coverage, &doxygen, 50)).await.unwrap();
    assert!(verdict.passed(), "{:?}", verdict.report());

    let doxygen = verdict.report().suite("doxygen").unwrap();
    assert_eq!(doxygen.items_evaluated, 0);
    assert_eq!(doxygen.notes.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parallel_run_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let coverage = write(dir.path(), "coverage.xml", COVERAGE);
    let doxygen = write(dir.path(), "doxygen.log", DOXYGEN);
    let config = config(&coverage, &doxygen, 75);

    let sequential = BasicQualityEngine::new(default_catalog().unwrap());
    let parallel = sequential.clone().with_config(EngineConfig { parallel: true });

    let a = sequential.run(&config).await.unwrap();
    let b = parallel.run(&config).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_malformed_report_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let coverage = write(dir.path(), "coverage.xml", "<coverage>");
    let doxygen = write(dir.path(), "doxygen.log", DOXYGEN);

    let engine = BasicQualityEngine::new(default_catalog().unwrap());
    let err = engine.run(&config(&coverage, &doxygen, 75)).await.unwrap_err();
    assert!(matches!(err, QualityError::ReportParsing(_)));
    assert_eq!(err.to_string(), "Unable to parse Cobertura report as XML");
}

#[tokio::test]
async fn test_unknown_suite_aborts() {
    let text = "suites:\n  lint:\n    report: lint.txt\n    constraints: []\n";
    let config = VigilanceConfig::from_yaml_str(text).unwrap();
    let engine = BasicQualityEngine::new(default_catalog().unwrap());

    let err = engine.run(&config).await.unwrap_err();
    assert_eq!(err.to_string(), "suites were configured but not available: lint");
    assert_eq!(err.exit_code(), 252);
}
