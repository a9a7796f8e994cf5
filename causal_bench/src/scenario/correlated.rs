// src/scenario/correlated.rs
//
// Correlated channels.
//
// A single latent social intent triggers two placements (FB, IG) that are
// conditionally independent given intent. Conversion happens exactly when
// intent fired, so neither placement deserves more credit than its trigger
// rate warrants.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::labels::{SOCIAL_FB, SOCIAL_IG};
use super::{bernoulli, Archetype, ScenarioKind, DEFAULT_CONVERSION_VALUE};
use crate::credit::GroundTruth;
use crate::error::{check_probability, check_value, Result};
use crate::types::{JourneyRecord, Touchpoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorrelatedChannelsParams {
    /// Probability of the latent social intent.
    pub p_social_intent: f64,
    /// Probability of an FB touch given intent.
    pub p_fb_given_intent: f64,
    /// Probability of an IG touch given intent.
    pub p_ig_given_intent: f64,
    pub conversion_value: f64,
}

impl Default for CorrelatedChannelsParams {
    fn default() -> Self {
        Self {
            p_social_intent: 0.12,
            p_fb_given_intent: 0.90,
            p_ig_given_intent: 0.90,
            conversion_value: DEFAULT_CONVERSION_VALUE,
        }
    }
}

impl Archetype for CorrelatedChannelsParams {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::CorrelatedChannels
    }

    fn validate(&self) -> Result<()> {
        check_probability("p_social_intent", self.p_social_intent)?;
        check_probability("p_fb_given_intent", self.p_fb_given_intent)?;
        check_probability("p_ig_given_intent", self.p_ig_given_intent)?;
        check_value("conversion_value", self.conversion_value)
    }

    /// Credit proportional to each placement's trigger probability; an even
    /// split when neither placement ever fires.
    fn ground_truth(&self) -> GroundTruth {
        let total = self.p_fb_given_intent + self.p_ig_given_intent;
        let fb = if total > 0.0 {
            self.p_fb_given_intent / total
        } else {
            0.5
        };
        GroundTruth::from([(SOCIAL_FB, fb), (SOCIAL_IG, 1.0 - fb)])
    }

    fn expected_conversion_rate(&self) -> f64 {
        self.p_social_intent
    }

    fn draw(&self, rng: &mut ChaCha8Rng) -> JourneyRecord {
        let intent = bernoulli(rng, self.p_social_intent);

        let mut path = Vec::with_capacity(2);
        if intent {
            if bernoulli(rng, self.p_fb_given_intent) {
                path.push(Touchpoint::new(SOCIAL_FB));
            }
            if bernoulli(rng, self.p_ig_given_intent) {
                path.push(Touchpoint::new(SOCIAL_IG));
            }
        }

        JourneyRecord::from_outcome(path, intent, self.conversion_value)
    }
}
