// tests/report_suite_tests.rs
//
// Suite manifests and report sinks.
//
// These tests verify:
// - the shipped suite manifests parse and validate
// - a manifest run produces one entry per (scenario, model)
// - named variants of one archetype stay distinct in the report
// - the JSON sink writes a timestamped file with the report schema
// - the Markdown sink renders every entry and the final status

use std::fs;
use std::path::PathBuf;

use causal_bench::{
    Harness, JsonFileSink, MarkdownFileSink, ReportSink, ScenarioKind, SuiteReport, SuiteSpec,
    Verdict,
};

fn suites_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("workspace root")
        .join("suites")
}

fn small_report() -> SuiteReport {
    let spec = SuiteSpec {
        samples: 1_000,
        base_seed: Some(42),
        ..SuiteSpec::default()
    };
    let scenarios = spec.build_scenarios().unwrap();
    let models = spec.build_models().unwrap();
    let harness = Harness::new(spec.harness_config()).unwrap();
    harness.run_suite(&models, &scenarios)
}

// =============================================================================
// Suite manifests
// =============================================================================

#[test]
fn test_canonical_suite_parses() {
    let spec = SuiteSpec::from_yaml_file(suites_dir().join("canonical.yaml")).expect("parse");
    assert_eq!(spec.suite_id, "causal_integrity");
    assert_eq!(spec.samples, 10_000);
    assert_eq!(spec.base_seed, Some(42));
    assert_eq!(spec.models, vec!["last_touch", "linear"]);

    let kinds: Vec<ScenarioKind> = spec.scenarios.iter().map(|e| e.params.kind()).collect();
    assert_eq!(kinds, ScenarioKind::ALL.to_vec());
}

#[test]
fn test_all_shipped_suites_validate() {
    let mut count = 0;
    for entry in fs::read_dir(suites_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        SuiteSpec::from_yaml_file(&path)
            .unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        count += 1;
    }
    assert!(count >= 1);
}

#[test]
fn test_missing_suite_file_is_io_error() {
    let err = SuiteSpec::from_yaml_file(suites_dir().join("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, causal_bench::BenchError::Io { .. }));
}

#[test]
fn test_manifest_run_covers_every_pair() {
    let report = small_report();
    assert_eq!(report.total_tests, 10);
    assert_eq!(report.suite_id, "causal_integrity");
    assert!(report
        .results
        .iter()
        .all(|e| e.samples == 1_000 && e.dataset_checksum.len() == 64));
}

#[test]
fn test_named_variants_produce_distinct_rows() {
    let mut spec =
        SuiteSpec::from_yaml_file(suites_dir().join("synergy_stress.yaml")).expect("parse");
    spec.samples = 2_000;
    let scenarios = spec.build_scenarios().unwrap();
    let models = spec.build_models().unwrap();
    let report = Harness::new(spec.harness_config())
        .unwrap()
        .run_suite(&models, &scenarios);

    let linear_rows: Vec<&str> = report
        .results
        .iter()
        .filter(|e| e.model == "linear")
        .map(|e| e.scenario.as_str())
        .collect();
    assert_eq!(
        linear_rows,
        vec!["Strong Synergy", "Wide Exposure Synergy", "Three Day Lag"]
    );

    let lag = report
        .results
        .iter()
        .find(|e| e.scenario == "Three Day Lag")
        .unwrap();
    assert_eq!(lag.tolerance, 0.15);
    let strong = report
        .results
        .iter()
        .find(|e| e.scenario == "Strong Synergy")
        .unwrap();
    assert_eq!(strong.tolerance, 0.10);
}

// =============================================================================
// Sinks
// =============================================================================

#[test]
fn test_json_sink_writes_timestamped_report() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reports");
    let report = small_report();

    let mut sink = JsonFileSink::new(&out);
    sink.save(&report).unwrap();

    let path = sink.last_path().expect("path recorded").to_path_buf();
    assert_eq!(path, out.join(report.file_name()));
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("causal_report_") && name.ends_with(".json"));

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["suite_id"], "causal_integrity");
    assert_eq!(value["total_tests"], 10);
    assert_eq!(value["passed"], report.passed);
    let rows = value["results"].as_array().unwrap();
    assert_eq!(rows.len(), 10);
    for key in ["test", "model", "ground_truth", "estimated", "error", "passed", "verdict"] {
        assert!(rows[0].get(key).is_some(), "missing {key}");
    }

    let parsed: SuiteReport = serde_json::from_value(value).unwrap();
    assert_eq!(parsed.results[0].scenario, "Last-Touch Bias");
    assert_eq!(parsed.timestamp, report.timestamp);
}

#[test]
fn test_markdown_sink_renders_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("report.md");
    let report = small_report();

    MarkdownFileSink::new(&path).save(&report).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# Causal Integrity Report: causal_integrity"));
    for kind in ScenarioKind::ALL {
        assert!(text.contains(kind.name()), "missing {}", kind.name());
    }
    assert!(text.contains(&format!(
        "**Final Status:** {}/{} tests passed.",
        report.passed, report.total_tests
    )));
    if !report.all_passed() {
        assert!(text.contains(Verdict::Fail.label()));
    }
}
