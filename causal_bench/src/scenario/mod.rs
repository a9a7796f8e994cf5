// src/scenario/mod.rs
//
// Synthetic scenario generators with known ground truth.
//
// Each archetype encodes one causal failure mode that attribution models
// commonly get wrong:
// - last_touch:  a navigational click steals credit from the real cause
// - correlated:  two channels fire together off one latent intent
// - interaction: two channels convert better together than apart
// - delayed:     the cause happens a day before the conversion
// - confounding: a hidden covariate drives both exposure and conversion
//
// A generator call owns its RNG. With a seed the dataset is bit-for-bit
// reproducible; without one the RNG is seeded from OS entropy.

mod confounding;
mod correlated;
mod delayed;
mod interaction;
mod last_touch;

pub use confounding::ConfoundingParams;
pub use correlated::CorrelatedChannelsParams;
pub use delayed::DelayedEffectsParams;
pub use interaction::InteractionEffectsParams;
pub use last_touch::LastTouchBiasParams;

/// Credit-bearing labels used by the built-in archetypes.
///
/// Some name channels that appear on paths; others (`SYNERGY`, `BASELINE`,
/// `SOCIAL_INCREMENTAL`, `NATURAL_WEEKEND_LIFT`) name causal mechanisms
/// that only appear in ground truth.
pub mod labels {
    pub const DISPLAY: &str = "Display";
    pub const SEARCH: &str = "Search";
    pub const EMAIL: &str = "Email";
    pub const SOCIAL: &str = "Social";
    pub const SOCIAL_FB: &str = "Social (FB)";
    pub const SOCIAL_IG: &str = "Social (IG)";
    pub const SYNERGY: &str = "Synergy";
    pub const BASELINE: &str = "Baseline";
    pub const SOCIAL_INCREMENTAL: &str = "Social_Incremental";
    pub const NATURAL_WEEKEND_LIFT: &str = "Natural_Weekend_Lift";
}

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::credit::GroundTruth;
use crate::error::{check_sample_count, Result};
use crate::types::{conversion_rate, JourneyRecord};

/// Default conversion value for every archetype.
pub const DEFAULT_CONVERSION_VALUE: f64 = 100.0;

/// The five causal archetypes, in canonical suite order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    LastTouchBias,
    CorrelatedChannels,
    InteractionEffects,
    DelayedEffects,
    ConfoundingVariables,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 5] = [
        ScenarioKind::LastTouchBias,
        ScenarioKind::CorrelatedChannels,
        ScenarioKind::InteractionEffects,
        ScenarioKind::DelayedEffects,
        ScenarioKind::ConfoundingVariables,
    ];

    /// Human-readable scenario name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            ScenarioKind::LastTouchBias => "Last-Touch Bias",
            ScenarioKind::CorrelatedChannels => "Correlated Channels",
            ScenarioKind::InteractionEffects => "Interaction Effects",
            ScenarioKind::DelayedEffects => "Delayed Effects",
            ScenarioKind::ConfoundingVariables => "Confounding Variables",
        }
    }

    /// Short description of the failure mode.
    pub fn description(self) -> &'static str {
        match self {
            ScenarioKind::LastTouchBias => {
                "Display creates intent; Search is a navigational last click"
            }
            ScenarioKind::CorrelatedChannels => {
                "One social intent fires two highly correlated touchpoints"
            }
            ScenarioKind::InteractionEffects => {
                "Email and Search convert super-additively when combined"
            }
            ScenarioKind::DelayedEffects => {
                "An email drives conversions that land days after it was sent"
            }
            ScenarioKind::ConfoundingVariables => {
                "Weekends raise both Social exposure and baseline conversion"
            }
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A probabilistic generative model for one archetype.
pub trait Archetype {
    fn kind(&self) -> ScenarioKind;

    /// Reject out-of-range parameters.
    fn validate(&self) -> Result<()>;

    /// True credit split, derived from the parameters.
    fn ground_truth(&self) -> GroundTruth;

    /// Analytic probability that a single record converts.
    fn expected_conversion_rate(&self) -> f64;

    /// Draw one independent record.
    fn draw(&self, rng: &mut ChaCha8Rng) -> JourneyRecord;
}

/// A generated experiment: dataset plus the oracle it is judged against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    name: String,
    kind: ScenarioKind,
    seed: Option<u64>,
    expected_conversion_rate: f64,
    ground_truth: GroundTruth,
    dataset: Vec<JourneyRecord>,
    checksum: String,
}

impl Scenario {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the scenario. Reports and tolerance overrides use this name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn kind(&self) -> ScenarioKind {
        self.kind
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn ground_truth(&self) -> &GroundTruth {
        &self.ground_truth
    }

    pub fn dataset(&self) -> &[JourneyRecord] {
        &self.dataset
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn conversions(&self) -> usize {
        self.dataset.iter().filter(|r| r.is_converted()).count()
    }

    /// Empirical conversion rate of the dataset.
    pub fn conversion_rate(&self) -> f64 {
        conversion_rate(&self.dataset)
    }

    /// Analytic conversion rate implied by the generating parameters.
    pub fn expected_conversion_rate(&self) -> f64 {
        self.expected_conversion_rate
    }

    /// SHA-256 over the dataset contents, hex-encoded.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

/// Covers each record's path (channel + day offset), outcome, value bits
/// and covariates, in generation order.
fn dataset_checksum(dataset: &[JourneyRecord]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((dataset.len() as u64).to_le_bytes());
    for record in dataset {
        hasher.update((record.path().len() as u64).to_le_bytes());
        for touch in record.path() {
            hasher.update(touch.channel().as_bytes());
            hasher.update([0u8]);
            hasher.update(touch.day_offset().map_or(u64::MAX, u64::from).to_le_bytes());
        }
        hasher.update([record.is_converted() as u8]);
        hasher.update(record.value().to_bits().to_le_bytes());
        hasher.update(
            record
                .days_to_conv()
                .map_or(u64::MAX, u64::from)
                .to_le_bytes(),
        );
        hasher.update([match record.is_weekend() {
            None => 2u8,
            Some(w) => w as u8,
        }]);
    }
    hex_encode(&hasher.finalize())
}

/// Local RNG for one generator call.
pub fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Seed for the `k`-th scenario of a run seeded with `base_seed`.
pub fn scenario_seed(base_seed: Option<u64>, k: usize) -> Option<u64> {
    base_seed.map(|s| s.wrapping_add(k as u64))
}

/// Sample a boolean with the given probability.
pub(crate) fn bernoulli(rng: &mut ChaCha8Rng, prob: f64) -> bool {
    rng.gen::<f64>() < prob
}

/// Draw `n` i.i.d. records from `params` and package them as a scenario.
pub fn generate<A: Archetype + ?Sized>(
    params: &A,
    n: usize,
    seed: Option<u64>,
) -> Result<Scenario> {
    check_sample_count(n)?;
    params.validate()?;

    let kind = params.kind();
    let mut rng = rng_for(seed);
    let dataset: Vec<JourneyRecord> = (0..n).map(|_| params.draw(&mut rng)).collect();

    let scenario = Scenario {
        name: kind.name().to_string(),
        kind,
        seed,
        expected_conversion_rate: params.expected_conversion_rate(),
        ground_truth: params.ground_truth(),
        checksum: dataset_checksum(&dataset),
        dataset,
    };

    debug!(
        scenario = scenario.name(),
        n,
        ?seed,
        conversions = scenario.conversions(),
        "generated scenario"
    );

    Ok(scenario)
}

pub fn last_touch_bias(n: usize, seed: Option<u64>) -> Result<Scenario> {
    generate(&LastTouchBiasParams::default(), n, seed)
}

pub fn correlated_channels(n: usize, seed: Option<u64>) -> Result<Scenario> {
    generate(&CorrelatedChannelsParams::default(), n, seed)
}

pub fn interaction_effects(n: usize, seed: Option<u64>) -> Result<Scenario> {
    generate(&InteractionEffectsParams::default(), n, seed)
}

pub fn delayed_effects(n: usize, seed: Option<u64>) -> Result<Scenario> {
    generate(&DelayedEffectsParams::default(), n, seed)
}

pub fn confounding_variables(n: usize, seed: Option<u64>) -> Result<Scenario> {
    generate(&ConfoundingParams::default(), n, seed)
}

/// Parameters for any archetype, tagged by `archetype` in suite manifests.
///
/// Omitted fields fall back to the archetype defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "archetype", rename_all = "snake_case")]
pub enum ScenarioParams {
    LastTouchBias(LastTouchBiasParams),
    CorrelatedChannels(CorrelatedChannelsParams),
    InteractionEffects(InteractionEffectsParams),
    DelayedEffects(DelayedEffectsParams),
    ConfoundingVariables(ConfoundingParams),
}

impl ScenarioParams {
    /// Default parameters for `kind`.
    pub fn defaults(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::LastTouchBias => Self::LastTouchBias(Default::default()),
            ScenarioKind::CorrelatedChannels => Self::CorrelatedChannels(Default::default()),
            ScenarioKind::InteractionEffects => Self::InteractionEffects(Default::default()),
            ScenarioKind::DelayedEffects => Self::DelayedEffects(Default::default()),
            ScenarioKind::ConfoundingVariables => Self::ConfoundingVariables(Default::default()),
        }
    }

    pub fn as_archetype(&self) -> &(dyn Archetype + Sync) {
        match self {
            Self::LastTouchBias(p) => p,
            Self::CorrelatedChannels(p) => p,
            Self::InteractionEffects(p) => p,
            Self::DelayedEffects(p) => p,
            Self::ConfoundingVariables(p) => p,
        }
    }

    pub fn kind(&self) -> ScenarioKind {
        self.as_archetype().kind()
    }

    pub fn validate(&self) -> Result<()> {
        self.as_archetype().validate()
    }

    pub fn ground_truth(&self) -> GroundTruth {
        self.as_archetype().ground_truth()
    }

    pub fn expected_conversion_rate(&self) -> f64 {
        self.as_archetype().expected_conversion_rate()
    }

    pub fn generate(&self, n: usize, seed: Option<u64>) -> Result<Scenario> {
        generate(self.as_archetype(), n, seed)
    }
}

/// A suite scenario: archetype parameters plus an optional report name.
///
/// Without a name the scenario is reported under its archetype name, so two
/// variants of the same archetype need distinct names to be told apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub params: ScenarioParams,
}

impl ScenarioEntry {
    pub fn named(name: impl Into<String>, params: ScenarioParams) -> Self {
        Self {
            name: Some(name.into()),
            params,
        }
    }

    /// Report name: the explicit name, else the archetype name.
    pub fn name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.params.kind().name())
    }

    pub fn generate(&self, n: usize, seed: Option<u64>) -> Result<Scenario> {
        Ok(self.params.generate(n, seed)?.with_name(self.name()))
    }
}

impl From<ScenarioParams> for ScenarioEntry {
    fn from(params: ScenarioParams) -> Self {
        Self { name: None, params }
    }
}

/// Generate one scenario per entry, in parallel, preserving input order.
///
/// With a base seed, entry `k` is seeded with `base_seed + k`.
pub fn generate_all(
    params: &[ScenarioParams],
    n: usize,
    base_seed: Option<u64>,
) -> Result<Vec<Scenario>> {
    params
        .par_iter()
        .enumerate()
        .map(|(k, p)| p.generate(n, scenario_seed(base_seed, k)))
        .collect()
}

/// The five archetypes with default parameters, in canonical order.
pub fn canonical_scenarios(n: usize, base_seed: Option<u64>) -> Result<Vec<Scenario>> {
    let params: Vec<ScenarioParams> = ScenarioKind::ALL
        .iter()
        .map(|k| ScenarioParams::defaults(*k))
        .collect();
    generate_all(&params, n, base_seed)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
