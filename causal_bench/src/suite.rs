// src/suite.rs
//
// Suite manifest: a YAML file that fully defines a validation run.
//
// A suite fixes:
// - suite_id + suite_version for tracking
// - sample count per scenario
// - base seed (scenario k uses base_seed + k)
// - default and per-scenario tolerances
// - which built-in models to score
// - which archetypes to generate, with optional parameter overrides
//
// An empty scenario list means the five canonical archetypes with defaults.
// Each scenario entry may carry a `name`; names must be unique within a
// suite, and `tolerances` keys must name one of its scenarios.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{check_sample_count, BenchError, Result};
use crate::harness::{HarnessConfig, DEFAULT_TOLERANCE};
use crate::model::{builtin, AttributionModel, BUILTIN_MODELS};
use crate::scenario::{scenario_seed, Scenario, ScenarioEntry, ScenarioKind, ScenarioParams};

/// Current suite schema version.
pub const SUITE_SCHEMA_VERSION: u32 = 1;

/// Default number of records per scenario.
pub const DEFAULT_SAMPLES: usize = 10_000;

/// A validation run described as a YAML manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteSpec {
    /// Unique suite identifier.
    pub suite_id: String,
    /// Schema version.
    #[serde(default = "default_suite_version")]
    pub suite_version: u32,
    /// Records generated per scenario.
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Base seed; unseeded generation when absent.
    #[serde(default)]
    pub base_seed: Option<u64>,
    /// Default pass threshold.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Per-scenario thresholds keyed by scenario name.
    /// Uses BTreeMap for stable ordering.
    #[serde(default)]
    pub tolerances: BTreeMap<String, f64>,
    /// Built-in model names; all built-ins when empty.
    #[serde(default)]
    pub models: Vec<String>,
    /// Scenarios to generate; the five archetypes with defaults when empty.
    #[serde(default)]
    pub scenarios: Vec<ScenarioEntry>,
}

fn default_suite_version() -> u32 {
    SUITE_SCHEMA_VERSION
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for SuiteSpec {
    fn default() -> Self {
        Self {
            suite_id: "causal_integrity".to_string(),
            suite_version: SUITE_SCHEMA_VERSION,
            samples: DEFAULT_SAMPLES,
            base_seed: None,
            tolerance: DEFAULT_TOLERANCE,
            tolerances: BTreeMap::new(),
            models: Vec::new(),
            scenarios: Vec::new(),
        }
    }
}

impl SuiteSpec {
    /// Load a suite from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| BenchError::io(path.display().to_string(), e))?;
        Self::from_yaml_str(&contents)
    }

    /// Parse a suite from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let spec: SuiteSpec = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Validate the manifest.
    pub fn validate(&self) -> Result<()> {
        if self.suite_id.is_empty() {
            return Err(BenchError::invalid("suite_id", "suite_id cannot be empty"));
        }
        if self.suite_version == 0 {
            return Err(BenchError::invalid(
                "suite_version",
                "suite_version must be >= 1",
            ));
        }
        check_sample_count(self.samples)
            .map_err(|_| BenchError::invalid("samples", "samples must be >= 1"))?;

        self.harness_config().validate()?;

        for name in &self.models {
            if builtin(name).is_none() {
                return Err(BenchError::invalid(
                    "models",
                    format!(
                        "unknown model '{}', expected one of: {}",
                        name,
                        BUILTIN_MODELS.join(", ")
                    ),
                ));
            }
        }

        for (i, entry) in self.scenarios.iter().enumerate() {
            if entry.name.as_deref() == Some("") {
                return Err(BenchError::invalid(
                    format!("scenarios[{}].name", i),
                    "name cannot be empty",
                ));
            }
            entry.params.validate().map_err(|e| match e {
                BenchError::InvalidConfiguration { field, message } => BenchError::invalid(
                    format!("scenarios[{}].{}", i, field),
                    message,
                ),
                other => other,
            })?;
        }

        let entries = self.scenario_entries();
        let mut names = BTreeSet::new();
        for (i, entry) in entries.iter().enumerate() {
            if !names.insert(entry.name()) {
                return Err(BenchError::invalid(
                    format!("scenarios[{}].name", i),
                    format!(
                        "duplicate scenario name '{}'; give each variant a distinct name",
                        entry.name()
                    ),
                ));
            }
        }
        for key in self.tolerances.keys() {
            if !names.contains(key.as_str()) {
                return Err(BenchError::invalid(
                    format!("tolerances.{key}"),
                    "does not name a scenario in this suite",
                ));
            }
        }

        Ok(())
    }

    /// Scenario entries to generate, defaulting to the canonical five.
    pub fn scenario_entries(&self) -> Vec<ScenarioEntry> {
        if self.scenarios.is_empty() {
            ScenarioKind::ALL
                .iter()
                .map(|k| ScenarioEntry::from(ScenarioParams::defaults(*k)))
                .collect()
        } else {
            self.scenarios.clone()
        }
    }

    /// Expand seeds into (scenario_index, seed) pairs.
    pub fn expand_seeds(&self) -> Vec<(usize, Option<u64>)> {
        (0..self.scenario_entries().len())
            .map(|k| (k, scenario_seed(self.base_seed, k)))
            .collect()
    }

    pub fn harness_config(&self) -> HarnessConfig {
        HarnessConfig {
            suite_id: self.suite_id.clone(),
            tolerance: self.tolerance,
            scenario_tolerances: self.tolerances.clone(),
        }
    }

    /// Generate every scenario in the suite, in parallel, in manifest order.
    pub fn build_scenarios(&self) -> Result<Vec<Scenario>> {
        let entries = self.scenario_entries();
        self.expand_seeds()
            .into_par_iter()
            .map(|(k, seed)| entries[k].generate(self.samples, seed))
            .collect()
    }

    /// Instantiate the suite's models.
    pub fn build_models(&self) -> Result<Vec<Box<dyn AttributionModel>>> {
        let names: Vec<&str> = if self.models.is_empty() {
            BUILTIN_MODELS.to_vec()
        } else {
            self.models.iter().map(String::as_str).collect()
        };
        names
            .into_iter()
            .map(|name| {
                builtin(name)
                    .ok_or_else(|| BenchError::invalid("models", format!("unknown model '{name}'")))
            })
            .collect()
    }
}
