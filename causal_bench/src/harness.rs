// src/harness.rs
//
// Validation harness: scenario -> model -> comparison -> report.
//
// Scoring:
// - model output and ground truth are both normalized before comparison
// - error is the L1 distance over the union of labels
// - an empty estimate against a nonempty ground truth scores MAX_ERROR
// - pass iff error <= tolerance (per-scenario override, else default)
//
// A failing or panicking model becomes a ModelError entry; the rest of the
// suite still runs.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::credit::{CreditDistribution, GroundTruth};
use crate::error::{BenchError, ModelError, Result};
use crate::model::AttributionModel;
use crate::report::{ReportEntry, SuiteReport, Verdict};
use crate::scenario::Scenario;

/// Default pass threshold on the L1 error.
pub const DEFAULT_TOLERANCE: f64 = 0.10;

/// Largest L1 distance between two probability distributions.
pub const MAX_ERROR: f64 = 2.0;

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Identifier stamped on reports.
    pub suite_id: String,
    /// Default pass threshold.
    pub tolerance: f64,
    /// Per-scenario thresholds keyed by scenario name.
    pub scenario_tolerances: BTreeMap<String, f64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            suite_id: "causal_integrity".to_string(),
            tolerance: DEFAULT_TOLERANCE,
            scenario_tolerances: BTreeMap::new(),
        }
    }
}

impl HarnessConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Override the threshold for one scenario.
    pub fn with_scenario_tolerance(mut self, scenario: impl Into<String>, tolerance: f64) -> Self {
        self.scenario_tolerances.insert(scenario.into(), tolerance);
        self
    }

    pub fn tolerance_for(&self, scenario: &str) -> f64 {
        self.scenario_tolerances
            .get(scenario)
            .copied()
            .unwrap_or(self.tolerance)
    }

    pub fn validate(&self) -> Result<()> {
        check_tolerance("tolerance", self.tolerance)?;
        for (name, tol) in &self.scenario_tolerances {
            check_tolerance(&format!("scenario_tolerances.{name}"), *tol)?;
        }
        Ok(())
    }
}

fn check_tolerance(field: &str, tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(BenchError::invalid(
            field,
            format!("tolerance must be finite and >= 0, got {tolerance}"),
        ));
    }
    Ok(())
}

/// Scores attribution models against scenario ground truth.
#[derive(Debug, Clone, Default)]
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Evaluate one model on one scenario.
    pub fn evaluate(&self, scenario: &Scenario, model: &dyn AttributionModel) -> ReportEntry {
        let tolerance = self.config.tolerance_for(scenario.name());
        evaluate(scenario, model, tolerance)
    }

    /// Evaluate every model on every scenario.
    ///
    /// Pairs run in parallel; results keep scenario-then-model order.
    pub fn run_suite(
        &self,
        models: &[Box<dyn AttributionModel>],
        scenarios: &[Scenario],
    ) -> SuiteReport {
        let pairs: Vec<(&Scenario, &dyn AttributionModel)> = scenarios
            .iter()
            .flat_map(|s| models.iter().map(move |m| (s, &**m)))
            .collect();

        let results: Vec<ReportEntry> = pairs
            .par_iter()
            .map(|(scenario, model)| self.evaluate(scenario, *model))
            .collect();

        let report = SuiteReport::new(self.config.suite_id.clone(), results);
        info!(
            suite = %report.suite_id,
            passed = report.passed,
            total = report.total_tests,
            "suite finished"
        );
        report
    }
}

/// Evaluate `model` on `scenario` against a fixed tolerance.
pub fn evaluate(scenario: &Scenario, model: &dyn AttributionModel, tolerance: f64) -> ReportEntry {
    let mut entry = ReportEntry {
        scenario: scenario.name().to_string(),
        model: model.name().to_string(),
        ground_truth: scenario.ground_truth().clone(),
        estimated: CreditDistribution::new(),
        error: MAX_ERROR,
        tolerance,
        passed: false,
        verdict: Verdict::Fail,
        model_error: None,
        samples: scenario.len(),
        conversions: scenario.conversions(),
        dataset_checksum: scenario.checksum().to_string(),
    };

    match run_model(model, scenario) {
        Ok(raw) => {
            let estimated = raw.normalized();
            if estimated.is_empty() {
                warn!(
                    scenario = scenario.name(),
                    model = model.name(),
                    "model assigned no credit"
                );
            }
            entry.error = score(scenario.ground_truth(), &estimated);
            entry.passed = entry.error <= tolerance;
            entry.verdict = if entry.passed {
                Verdict::Pass
            } else {
                Verdict::Fail
            };
            entry.estimated = estimated;
        }
        Err(err) => {
            warn!(
                scenario = scenario.name(),
                model = model.name(),
                error = %err,
                "model error"
            );
            entry.verdict = Verdict::ModelError;
            entry.model_error = Some(err.to_string());
        }
    }

    debug!(
        scenario = %entry.scenario,
        model = %entry.model,
        error = entry.error,
        verdict = entry.verdict.label(),
        "evaluated"
    );
    entry
}

/// L1 error between normalized ground truth and a normalized estimate.
pub fn score(ground_truth: &GroundTruth, estimated: &CreditDistribution) -> f64 {
    let truth = ground_truth.normalized();
    let estimated = estimated.normalized();
    if estimated.is_empty() && !truth.is_empty() {
        return MAX_ERROR;
    }
    truth.l1_distance(&estimated)
}

fn run_model(
    model: &dyn AttributionModel,
    scenario: &Scenario,
) -> std::result::Result<CreditDistribution, ModelError> {
    match panic::catch_unwind(AssertUnwindSafe(|| model.attribute(scenario.dataset()))) {
        Ok(result) => result,
        Err(payload) => {
            let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            Err(ModelError::Panicked(msg))
        }
    }
}
