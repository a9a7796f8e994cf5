// src/types.rs
//
// Journey data types shared by generators, models and the harness.
//
// Records are built once by a generator and only read afterwards: fields are
// private and the `with_*` builders consume the record.

use serde::{Deserialize, Serialize};

/// A single marketing exposure on a customer path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Touchpoint {
    channel: String,
    /// Day the exposure happened, relative to the start of the journey.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    day_offset: Option<u32>,
}

impl Touchpoint {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            day_offset: None,
        }
    }

    /// Touchpoint annotated with the day it occurred on.
    pub fn on_day(channel: impl Into<String>, day_offset: u32) -> Self {
        Self {
            channel: channel.into(),
            day_offset: Some(day_offset),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn day_offset(&self) -> Option<u32> {
        self.day_offset
    }

    /// Same exposure context under a different channel label.
    pub fn relabeled(&self, channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            day_offset: self.day_offset,
        }
    }
}

/// One simulated customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyRecord {
    path: Vec<Touchpoint>,
    converted: bool,
    value: f64,
    /// Days between the causal touch and the conversion window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    days_to_conv: Option<u32>,
    /// Hidden confounder, exposed for diagnostics only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_weekend: Option<bool>,
}

impl JourneyRecord {
    /// Converting journey. Negative values are floored at zero.
    pub fn converted(path: Vec<Touchpoint>, value: f64) -> Self {
        Self {
            path,
            converted: true,
            value: value.max(0.0),
            days_to_conv: None,
            is_weekend: None,
        }
    }

    /// Non-converting journey; value is always zero.
    pub fn not_converted(path: Vec<Touchpoint>) -> Self {
        Self {
            path,
            converted: false,
            value: 0.0,
            days_to_conv: None,
            is_weekend: None,
        }
    }

    /// Build a record from an outcome flag.
    pub fn from_outcome(path: Vec<Touchpoint>, converted: bool, value: f64) -> Self {
        if converted {
            Self::converted(path, value)
        } else {
            Self::not_converted(path)
        }
    }

    pub fn with_days_to_conv(mut self, days: u32) -> Self {
        self.days_to_conv = Some(days);
        self
    }

    pub fn with_is_weekend(mut self, is_weekend: bool) -> Self {
        self.is_weekend = Some(is_weekend);
        self
    }

    pub fn path(&self) -> &[Touchpoint] {
        &self.path
    }

    /// Channel labels along the path, in temporal order.
    pub fn channels(&self) -> impl Iterator<Item = &str> + '_ {
        self.path.iter().map(Touchpoint::channel)
    }

    pub fn is_converted(&self) -> bool {
        self.converted
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn days_to_conv(&self) -> Option<u32> {
        self.days_to_conv
    }

    pub fn is_weekend(&self) -> Option<bool> {
        self.is_weekend
    }

    /// True if any touchpoint on the path carries `channel`.
    pub fn touched(&self, channel: &str) -> bool {
        self.channels().any(|c| c == channel)
    }

    /// Copy of this record with channel labels rewritten by `map`.
    pub fn relabeled<F>(&self, map: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        Self {
            path: self
                .path
                .iter()
                .map(|t| t.relabeled(map(t.channel())))
                .collect(),
            ..self.clone()
        }
    }
}

/// Fraction of records in `dataset` that converted.
pub fn conversion_rate(dataset: &[JourneyRecord]) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }
    let converted = dataset.iter().filter(|r| r.is_converted()).count();
    converted as f64 / dataset.len() as f64
}
