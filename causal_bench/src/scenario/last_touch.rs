// src/scenario/last_touch.rs
//
// Last-touch bias.
//
// A Display impression creates purchase intent. Customers with intent
// usually click a Search ad on the way to the checkout, so Search is the
// last touch on most converting paths even though it caused nothing.
// Conversion happens exactly when intent fired.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::labels::{DISPLAY, SEARCH};
use super::{bernoulli, Archetype, ScenarioKind, DEFAULT_CONVERSION_VALUE};
use crate::credit::GroundTruth;
use crate::error::{check_probability, check_value, Result};
use crate::types::{JourneyRecord, Touchpoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LastTouchBiasParams {
    /// Probability that Display creates intent.
    pub p_intent: f64,
    /// Probability of a navigational Search click given intent.
    pub p_search_given_intent: f64,
    /// Probability of a stray Search click without intent.
    pub p_search_given_no_intent: f64,
    /// Ground-truth share of the intent-creating channel. The remainder
    /// is assigned to Search.
    pub display_credit: f64,
    /// Value of a conversion.
    pub conversion_value: f64,
}

impl Default for LastTouchBiasParams {
    fn default() -> Self {
        Self {
            p_intent: 0.10,
            p_search_given_intent: 0.80,
            p_search_given_no_intent: 0.05,
            display_credit: 0.80,
            conversion_value: DEFAULT_CONVERSION_VALUE,
        }
    }
}

impl Archetype for LastTouchBiasParams {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::LastTouchBias
    }

    fn validate(&self) -> Result<()> {
        check_probability("p_intent", self.p_intent)?;
        check_probability("p_search_given_intent", self.p_search_given_intent)?;
        check_probability("p_search_given_no_intent", self.p_search_given_no_intent)?;
        check_probability("display_credit", self.display_credit)?;
        check_value("conversion_value", self.conversion_value)
    }

    fn ground_truth(&self) -> GroundTruth {
        GroundTruth::from([
            (DISPLAY, self.display_credit),
            (SEARCH, 1.0 - self.display_credit),
        ])
    }

    fn expected_conversion_rate(&self) -> f64 {
        self.p_intent
    }

    fn draw(&self, rng: &mut ChaCha8Rng) -> JourneyRecord {
        let intent = bernoulli(rng, self.p_intent);
        let search_click = if intent {
            bernoulli(rng, self.p_search_given_intent)
        } else {
            bernoulli(rng, self.p_search_given_no_intent)
        };

        let mut path = Vec::with_capacity(2);
        if intent {
            path.push(Touchpoint::new(DISPLAY));
        }
        if search_click {
            path.push(Touchpoint::new(SEARCH));
        }

        JourneyRecord::from_outcome(path, intent, self.conversion_value)
    }
}
