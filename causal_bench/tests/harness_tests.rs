// tests/harness_tests.rs
//
// End-to-end harness checks against the canonical scenarios.
//
// These tests verify:
// - last-touch attribution is caught over-crediting Search
// - symmetric channels get symmetric credit, and relabeling is equivariant
// - additive models miss the synergy bucket; interaction-aware models don't
// - zero-conversion datasets score the maximal error without panicking
// - unnormalized output is rescaled, including credits near f64::MAX
// - model errors and panics are recorded and the suite keeps going
// - suite results keep scenario-then-model order

use causal_bench::scenario::labels::{DISPLAY, EMAIL, SEARCH, SOCIAL_FB, SOCIAL_IG, SYNERGY};
use causal_bench::{
    canonical_scenarios, correlated_channels, evaluate, generate, interaction_effects,
    last_touch_bias, AttributionModel, CreditDistribution, FnModel, Harness, HarnessConfig,
    JourneyRecord, LastTouch, LastTouchBiasParams, LinearTouch, ModelError, Verdict,
    DEFAULT_TOLERANCE, MAX_ERROR,
};

// =============================================================================
// Helpers
// =============================================================================

/// Converted share for rows matching `pred`, with the row count.
fn cell_rate(dataset: &[JourneyRecord], pred: impl Fn(&JourneyRecord) -> bool) -> (f64, usize) {
    let rows: Vec<&JourneyRecord> = dataset.iter().filter(|&r| pred(r)).collect();
    if rows.is_empty() {
        return (0.0, 0);
    }
    let conv = rows.iter().filter(|r| r.is_converted()).count();
    (conv as f64 / rows.len() as f64, rows.len())
}

/// Credits each channel with its marginal lift, ignoring interactions.
fn additive_lift(dataset: &[JourneyRecord]) -> Result<CreditDistribution, ModelError> {
    let mut out = CreditDistribution::new();
    for channel in [EMAIL, SEARCH] {
        let (with, _) = cell_rate(dataset, |r| r.touched(channel));
        let (without, _) = cell_rate(dataset, |r| !r.touched(channel));
        out.insert(channel, (with - without).max(0.0));
    }
    Ok(out)
}

/// Decomposes incremental conversions using the four exposure cells.
fn cell_means(dataset: &[JourneyRecord]) -> Result<CreditDistribution, ModelError> {
    let (r00, _) = cell_rate(dataset, |r| !r.touched(EMAIL) && !r.touched(SEARCH));
    let (r10, n10) = cell_rate(dataset, |r| r.touched(EMAIL) && !r.touched(SEARCH));
    let (r01, n01) = cell_rate(dataset, |r| !r.touched(EMAIL) && r.touched(SEARCH));
    let (r11, n11) = cell_rate(dataset, |r| r.touched(EMAIL) && r.touched(SEARCH));
    if n10 == 0 || n01 == 0 || n11 == 0 {
        return Err(ModelError::Failed("empty exposure cell".to_string()));
    }

    let n = dataset.len() as f64;
    let p_email = (n10 + n11) as f64 / n;
    let p_search = (n01 + n11) as f64 / n;

    let mut out = CreditDistribution::new();
    out.insert(EMAIL, p_email * (r10 - r00).max(0.0));
    out.insert(SEARCH, p_search * (r01 - r00).max(0.0));
    out.insert(
        SYNERGY,
        p_email * p_search * (r11 - r10 - r01 + r00).max(0.0),
    );
    Ok(out)
}

fn failing(_: &[JourneyRecord]) -> Result<CreditDistribution, ModelError> {
    Err(ModelError::Failed("no data".to_string()))
}

fn panicking(_: &[JourneyRecord]) -> Result<CreditDistribution, ModelError> {
    panic!("attribution exploded")
}

// =============================================================================
// Causal failure modes
// =============================================================================

#[test]
fn test_last_touch_over_credits_search() {
    let scenario = last_touch_bias(10_000, Some(42)).unwrap();
    assert!((scenario.ground_truth().share(SEARCH) - 0.2).abs() < 1e-12);

    let entry = evaluate(&scenario, &LastTouch, DEFAULT_TOLERANCE);
    assert!(entry.estimated.share(SEARCH) > 0.5);
    assert!(entry.estimated.share(DISPLAY) < 0.5);
    assert_eq!(entry.verdict, Verdict::Fail);
    assert!(entry.error > DEFAULT_TOLERANCE);
}

#[test]
fn test_correlated_channels_get_symmetric_credit() {
    let scenario = correlated_channels(20_000, Some(5)).unwrap();
    let entry = evaluate(&scenario, &LinearTouch, DEFAULT_TOLERANCE);
    assert!((entry.estimated.share(SOCIAL_FB) - 0.5).abs() < 0.02);
    assert!((entry.estimated.share(SOCIAL_IG) - 0.5).abs() < 0.02);
    assert_eq!(entry.verdict, Verdict::Pass);
}

#[test]
fn test_relabeling_symmetric_channels_swaps_credit() {
    let swap = |label: &str| match label {
        SOCIAL_FB => SOCIAL_IG.to_string(),
        SOCIAL_IG => SOCIAL_FB.to_string(),
        other => other.to_string(),
    };

    let scenario = correlated_channels(5_000, Some(8)).unwrap();
    let swapped: Vec<JourneyRecord> = scenario
        .dataset()
        .iter()
        .map(|r| r.relabeled(swap))
        .collect();

    let original = LinearTouch.attribute(scenario.dataset()).unwrap();
    let mirrored = LinearTouch.attribute(&swapped).unwrap();
    assert_eq!(mirrored, original.relabeled(swap));
}

#[test]
fn test_additive_model_misses_synergy() {
    let scenario = interaction_effects(200_000, Some(99)).unwrap();
    let model = FnModel::new("additive_lift", additive_lift);
    let entry = evaluate(&scenario, &model, DEFAULT_TOLERANCE);
    assert_eq!(entry.estimated.share(SYNERGY), 0.0);
    assert!(entry.error > DEFAULT_TOLERANCE, "error {}", entry.error);
}

#[test]
fn test_interaction_aware_model_recovers_synergy() {
    let scenario = interaction_effects(400_000, Some(99)).unwrap();
    let model = FnModel::new("cell_means", cell_means);
    let entry = evaluate(&scenario, &model, DEFAULT_TOLERANCE);
    assert!(entry.estimated.share(SYNERGY) > 0.0);
    assert!(entry.error <= DEFAULT_TOLERANCE, "error {}", entry.error);
    assert_eq!(entry.verdict, Verdict::Pass);
}

// =============================================================================
// Edge cases
// =============================================================================

#[test]
fn test_zero_conversions_score_max_error() {
    let params = LastTouchBiasParams {
        p_intent: 0.0,
        ..Default::default()
    };
    let scenario = generate(&params, 1_000, Some(4)).unwrap();
    assert_eq!(scenario.conversions(), 0);

    let entry = evaluate(&scenario, &LinearTouch, DEFAULT_TOLERANCE);
    assert!(entry.estimated.is_empty());
    assert_eq!(entry.error, MAX_ERROR);
    assert_eq!(entry.verdict, Verdict::Fail);
    assert!(entry.model_error.is_none());
}

#[test]
fn test_unnormalized_output_is_rescaled() {
    let scenario = last_touch_bias(100, Some(1)).unwrap();
    let model = FnModel::new("scaled_truth", |_: &[JourneyRecord]| {
        Ok(CreditDistribution::from([(DISPLAY, 80.0), (SEARCH, 20.0)]))
    });
    let entry = evaluate(&scenario, &model, DEFAULT_TOLERANCE);
    assert!(entry.error < 1e-9);
    assert!((entry.estimated.total() - 1.0).abs() < 1e-9);
    assert!(entry.passed);
}

#[test]
fn test_huge_proportional_output_is_rescaled() {
    let scenario = last_touch_bias(100, Some(1)).unwrap();
    let model = FnModel::new("huge_truth", |_: &[JourneyRecord]| {
        Ok(CreditDistribution::from([(DISPLAY, 1.6e308), (SEARCH, 0.4e308)]))
    });
    let entry = evaluate(&scenario, &model, DEFAULT_TOLERANCE);
    assert!((entry.estimated.share(DISPLAY) - 0.8).abs() < 1e-9);
    assert!((entry.estimated.share(SEARCH) - 0.2).abs() < 1e-9);
    assert!(entry.error < 1e-9, "error {}", entry.error);
    assert_eq!(entry.verdict, Verdict::Pass);
}

#[test]
fn test_model_failures_do_not_abort_suite() {
    let scenarios = canonical_scenarios(500, Some(3)).unwrap();
    let models: Vec<Box<dyn AttributionModel>> = vec![
        Box::new(FnModel::new("failing", failing)),
        Box::new(FnModel::new("panicking", panicking)),
        Box::new(LinearTouch),
    ];

    let harness = Harness::new(HarnessConfig::default()).unwrap();
    let report = harness.run_suite(&models, &scenarios);
    assert_eq!(report.total_tests, 15);

    for entry in report.results.iter().filter(|e| e.model != "linear") {
        assert_eq!(entry.verdict, Verdict::ModelError);
        assert!(!entry.passed);
        assert_eq!(entry.error, MAX_ERROR);
    }
    let panicked = report
        .results
        .iter()
        .find(|e| e.model == "panicking")
        .unwrap();
    assert!(panicked
        .model_error
        .as_deref()
        .unwrap()
        .contains("attribution exploded"));

    let linear: Vec<_> = report.results.iter().filter(|e| e.model == "linear").collect();
    assert_eq!(linear.len(), 5);
    assert!(linear.iter().all(|e| e.verdict != Verdict::ModelError));
}

// =============================================================================
// Suite runs
// =============================================================================

#[test]
fn test_suite_order_is_scenario_then_model() {
    let scenarios = canonical_scenarios(200, Some(1)).unwrap();
    let models: Vec<Box<dyn AttributionModel>> = vec![Box::new(LastTouch), Box::new(LinearTouch)];
    let report = Harness::default().run_suite(&models, &scenarios);

    let order: Vec<(String, String)> = report
        .results
        .iter()
        .map(|e| (e.scenario.clone(), e.model.clone()))
        .collect();
    let expected: Vec<(String, String)> = scenarios
        .iter()
        .flat_map(|s| {
            ["last_touch", "linear"]
                .iter()
                .map(move |m| (s.name().to_string(), m.to_string()))
        })
        .collect();
    assert_eq!(order, expected);
}

#[test]
fn test_seeded_suite_is_reproducible() {
    let models: Vec<Box<dyn AttributionModel>> = vec![Box::new(LastTouch), Box::new(LinearTouch)];
    let run = || {
        let scenarios = canonical_scenarios(2_000, Some(42)).unwrap();
        Harness::default().run_suite(&models, &scenarios)
    };
    let a = run();
    let b = run();
    for (x, y) in a.results.iter().zip(b.results.iter()) {
        assert_eq!(x.error, y.error);
        assert_eq!(x.estimated, y.estimated);
        assert_eq!(x.dataset_checksum, y.dataset_checksum);
    }
}

#[test]
fn test_reference_models_fail_canonical_suite() {
    let scenarios = canonical_scenarios(10_000, Some(42)).unwrap();
    let models: Vec<Box<dyn AttributionModel>> = vec![Box::new(LastTouch), Box::new(LinearTouch)];
    let report = Harness::default().run_suite(&models, &scenarios);
    assert!(!report.all_passed());
    assert!(report
        .failures()
        .any(|e| e.scenario == "Last-Touch Bias" && e.model == "last_touch"));
}

#[test]
fn test_scenario_tolerance_override_changes_verdict() {
    let scenario = last_touch_bias(5_000, Some(42)).unwrap();
    let strict = Harness::default();
    let lenient =
        Harness::new(HarnessConfig::default().with_scenario_tolerance("Last-Touch Bias", MAX_ERROR))
            .unwrap();

    assert!(!strict.evaluate(&scenario, &LastTouch).passed);
    let entry = lenient.evaluate(&scenario, &LastTouch);
    assert!(entry.passed);
    assert_eq!(entry.tolerance, MAX_ERROR);
}
