//! causal_bench core library.
//!
//! Synthetic customer-journey scenarios with known causal ground truth, and
//! a harness that scores attribution models against them. The binary
//! (`src/bin/causal_bench.rs`) is a thin runner around these components.
//!
//! # Architecture
//!
//! - **Scenarios** (`scenario`): five parameterized generators, one per
//!   causal failure mode. Each call owns a seeded RNG, so datasets are
//!   reproducible and generation is safe to run in parallel.
//!
//! - **Models** (`model`): the `AttributionModel` contract plus two
//!   reference models (last-touch, linear).
//!
//! - **Harness** (`harness`): normalizes model output, computes the L1
//!   error against ground truth and applies the pass threshold.
//!
//! - **Reports** (`report`): `SuiteReport` and the `ReportSink`
//!   implementations that print or persist it.
//!
//! - **Suites** (`suite`): YAML manifests that fully define a run.

pub mod credit;
pub mod error;
pub mod harness;
pub mod model;
pub mod report;
pub mod scenario;
pub mod suite;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use credit::{CreditDistribution, GroundTruth};
pub use error::{BenchError, ModelError, Result};
pub use harness::{evaluate, score, Harness, HarnessConfig, DEFAULT_TOLERANCE, MAX_ERROR};
pub use model::{AttributionModel, FnModel, LastTouch, LinearTouch};
pub use report::{
    ConsoleSink, JsonFileSink, MarkdownFileSink, ReportEntry, ReportSink, SuiteReport, Verdict,
};
pub use scenario::{
    canonical_scenarios, confounding_variables, correlated_channels, delayed_effects,
    generate, generate_all, interaction_effects, last_touch_bias, Archetype,
    ConfoundingParams, CorrelatedChannelsParams, DelayedEffectsParams,
    InteractionEffectsParams, LastTouchBiasParams, Scenario, ScenarioEntry, ScenarioKind,
    ScenarioParams,
};
pub use suite::SuiteSpec;
pub use types::{JourneyRecord, Touchpoint};
