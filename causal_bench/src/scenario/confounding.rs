// src/scenario/confounding.rs
//
// Confounding variables.
//
// A hidden weekend flag raises both the chance of a Social impression and
// the baseline conversion rate. Social adds a true incremental lift on
// top. A model that ignores the weekend flag overstates Social.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::labels::{NATURAL_WEEKEND_LIFT, SOCIAL, SOCIAL_INCREMENTAL};
use super::{bernoulli, Archetype, ScenarioKind, DEFAULT_CONVERSION_VALUE};
use crate::credit::GroundTruth;
use crate::error::{check_probability, check_value, BenchError, Result};
use crate::types::{JourneyRecord, Touchpoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfoundingParams {
    /// Probability that a record falls on a weekend.
    pub p_weekend: f64,
    pub p_social_weekend: f64,
    pub p_social_weekday: f64,
    /// Conversion probability on weekends without Social.
    pub base_weekend: f64,
    /// Conversion probability on weekdays without Social.
    pub base_weekday: f64,
    /// True incremental lift of a Social impression.
    pub incremental_lift: f64,
    pub conversion_value: f64,
}

impl Default for ConfoundingParams {
    fn default() -> Self {
        Self {
            p_weekend: 0.30,
            p_social_weekend: 0.70,
            p_social_weekday: 0.10,
            base_weekend: 0.10,
            base_weekday: 0.02,
            incremental_lift: 0.05,
            conversion_value: DEFAULT_CONVERSION_VALUE,
        }
    }
}

impl ConfoundingParams {
    pub fn conversion_probability(&self, weekend: bool, social: bool) -> f64 {
        let base = if weekend {
            self.base_weekend
        } else {
            self.base_weekday
        };
        if social {
            base + self.incremental_lift
        } else {
            base
        }
    }
}

impl Archetype for ConfoundingParams {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::ConfoundingVariables
    }

    fn validate(&self) -> Result<()> {
        check_probability("p_weekend", self.p_weekend)?;
        check_probability("p_social_weekend", self.p_social_weekend)?;
        check_probability("p_social_weekday", self.p_social_weekday)?;
        check_probability("base_weekend", self.base_weekend)?;
        check_probability("base_weekday", self.base_weekday)?;
        check_probability("incremental_lift", self.incremental_lift)?;
        for weekend in [true, false] {
            let peak = self.conversion_probability(weekend, true);
            if peak > 1.0 {
                return Err(BenchError::invalid(
                    "incremental_lift",
                    format!("combined conversion probability {peak} exceeds 1"),
                ));
            }
        }
        check_value("conversion_value", self.conversion_value)
    }

    /// Split of an exposed weekend customer's conversion probability between
    /// the Social lift and the natural weekend propensity.
    fn ground_truth(&self) -> GroundTruth {
        let total = self.incremental_lift + self.base_weekend;
        if total <= 0.0 {
            return GroundTruth::new();
        }
        GroundTruth::from([
            (SOCIAL_INCREMENTAL, self.incremental_lift / total),
            (NATURAL_WEEKEND_LIFT, self.base_weekend / total),
        ])
    }

    fn expected_conversion_rate(&self) -> f64 {
        let weekend = self.base_weekend + self.p_social_weekend * self.incremental_lift;
        let weekday = self.base_weekday + self.p_social_weekday * self.incremental_lift;
        self.p_weekend * weekend + (1.0 - self.p_weekend) * weekday
    }

    fn draw(&self, rng: &mut ChaCha8Rng) -> JourneyRecord {
        let weekend = bernoulli(rng, self.p_weekend);
        let social = if weekend {
            bernoulli(rng, self.p_social_weekend)
        } else {
            bernoulli(rng, self.p_social_weekday)
        };
        let converted = bernoulli(rng, self.conversion_probability(weekend, social));

        let path = if social {
            vec![Touchpoint::new(SOCIAL)]
        } else {
            Vec::new()
        };

        JourneyRecord::from_outcome(path, converted, self.conversion_value)
            .with_is_weekend(weekend)
    }
}
