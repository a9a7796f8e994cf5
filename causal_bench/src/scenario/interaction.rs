// src/scenario/interaction.rs
//
// Interaction effects (synergy).
//
// Email and Search are drawn independently. Conversion probability is a
// baseline plus a lift per channel plus an extra super-additive bonus when
// both co-occur. Ground truth splits incremental conversions (those above
// baseline) between the two main effects and a separate Synergy bucket.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::labels::{EMAIL, SEARCH, SYNERGY};
use super::{bernoulli, Archetype, ScenarioKind, DEFAULT_CONVERSION_VALUE};
use crate::credit::GroundTruth;
use crate::error::{check_probability, check_value, BenchError, Result};
use crate::types::{JourneyRecord, Touchpoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionEffectsParams {
    pub p_email: f64,
    pub p_search: f64,
    /// Conversion probability with neither touch.
    pub base_rate: f64,
    pub lift_email: f64,
    pub lift_search: f64,
    /// Additional lift when both touches occur.
    pub synergy_lift: f64,
    pub conversion_value: f64,
}

impl Default for InteractionEffectsParams {
    fn default() -> Self {
        Self {
            p_email: 0.30,
            p_search: 0.30,
            base_rate: 0.02,
            lift_email: 0.03,
            lift_search: 0.03,
            synergy_lift: 0.07,
            conversion_value: DEFAULT_CONVERSION_VALUE,
        }
    }
}

impl InteractionEffectsParams {
    /// Conversion probability for a given exposure cell.
    pub fn conversion_probability(&self, email: bool, search: bool) -> f64 {
        let mut prob = self.base_rate;
        if email {
            prob += self.lift_email;
        }
        if search {
            prob += self.lift_search;
        }
        if email && search {
            prob += self.synergy_lift;
        }
        prob
    }
}

impl Archetype for InteractionEffectsParams {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::InteractionEffects
    }

    fn validate(&self) -> Result<()> {
        check_probability("p_email", self.p_email)?;
        check_probability("p_search", self.p_search)?;
        check_probability("base_rate", self.base_rate)?;
        check_probability("lift_email", self.lift_email)?;
        check_probability("lift_search", self.lift_search)?;
        check_probability("synergy_lift", self.synergy_lift)?;
        let peak = self.conversion_probability(true, true);
        if peak > 1.0 {
            return Err(BenchError::invalid(
                "synergy_lift",
                format!("combined conversion probability {peak} exceeds 1"),
            ));
        }
        check_value("conversion_value", self.conversion_value)
    }

    fn ground_truth(&self) -> GroundTruth {
        let email = self.p_email * self.lift_email;
        let search = self.p_search * self.lift_search;
        let synergy = self.p_email * self.p_search * self.synergy_lift;
        let total = email + search + synergy;
        if total <= 0.0 {
            return GroundTruth::new();
        }
        GroundTruth::from([
            (EMAIL, email / total),
            (SEARCH, search / total),
            (SYNERGY, synergy / total),
        ])
    }

    fn expected_conversion_rate(&self) -> f64 {
        self.base_rate
            + self.p_email * self.lift_email
            + self.p_search * self.lift_search
            + self.p_email * self.p_search * self.synergy_lift
    }

    fn draw(&self, rng: &mut ChaCha8Rng) -> JourneyRecord {
        let email = bernoulli(rng, self.p_email);
        let search = bernoulli(rng, self.p_search);
        let converted = bernoulli(rng, self.conversion_probability(email, search));

        let mut path = Vec::with_capacity(2);
        if email {
            path.push(Touchpoint::new(EMAIL));
        }
        if search {
            path.push(Touchpoint::new(SEARCH));
        }

        JourneyRecord::from_outcome(path, converted, self.conversion_value)
    }
}
