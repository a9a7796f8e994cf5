// src/scenario/delayed.rs
//
// Delayed effects (carryover).
//
// An Email sent on day `send_day` raises the probability of a conversion
// observed `lag_days` later. The touch and the outcome never share a
// session, so a model that only credits same-session touches misses it.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::labels::{BASELINE, EMAIL};
use super::{bernoulli, Archetype, ScenarioKind, DEFAULT_CONVERSION_VALUE};
use crate::credit::GroundTruth;
use crate::error::{check_probability, check_value, Result};
use crate::types::{JourneyRecord, Touchpoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DelayedEffectsParams {
    /// Probability the Email is sent.
    pub p_email: f64,
    /// Conversion probability `lag_days` after an Email.
    pub p_convert_after_email: f64,
    /// Conversion probability without an Email.
    pub p_convert_baseline: f64,
    /// Day the Email is sent on.
    pub send_day: u32,
    /// Days between the Email and the conversion window.
    pub lag_days: u32,
    pub conversion_value: f64,
}

impl Default for DelayedEffectsParams {
    fn default() -> Self {
        Self {
            p_email: 0.20,
            p_convert_after_email: 0.15,
            p_convert_baseline: 0.02,
            send_day: 1,
            lag_days: 1,
            conversion_value: DEFAULT_CONVERSION_VALUE,
        }
    }
}

impl Archetype for DelayedEffectsParams {
    fn kind(&self) -> ScenarioKind {
        ScenarioKind::DelayedEffects
    }

    fn validate(&self) -> Result<()> {
        check_probability("p_email", self.p_email)?;
        check_probability("p_convert_after_email", self.p_convert_after_email)?;
        check_probability("p_convert_baseline", self.p_convert_baseline)?;
        check_value("conversion_value", self.conversion_value)
    }

    /// Among emailed converters, the fraction caused by the Email versus the
    /// fraction that would have converted anyway. An Email that does not
    /// raise the conversion rate earns nothing.
    fn ground_truth(&self) -> GroundTruth {
        let email = if self.p_convert_after_email > 0.0 {
            (self.p_convert_after_email - self.p_convert_baseline).max(0.0)
                / self.p_convert_after_email
        } else {
            0.0
        };
        GroundTruth::from([(EMAIL, email), (BASELINE, 1.0 - email)])
    }

    fn expected_conversion_rate(&self) -> f64 {
        self.p_email * self.p_convert_after_email
            + (1.0 - self.p_email) * self.p_convert_baseline
    }

    fn draw(&self, rng: &mut ChaCha8Rng) -> JourneyRecord {
        let emailed = bernoulli(rng, self.p_email);
        let converted = if emailed {
            bernoulli(rng, self.p_convert_after_email)
        } else {
            bernoulli(rng, self.p_convert_baseline)
        };

        let path = if emailed {
            vec![Touchpoint::on_day(EMAIL, self.send_day)]
        } else {
            Vec::new()
        };
        let lag = if emailed { self.lag_days } else { 0 };

        JourneyRecord::from_outcome(path, converted, self.conversion_value).with_days_to_conv(lag)
    }
}
