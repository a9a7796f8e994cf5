// src/credit.rs
//
// Credit distributions: label -> non-negative credit.
//
// Used both for model output and for scenario ground truth. Labels are
// opaque strings; a label may name a channel ("Search") or a causal
// mechanism ("Synergy"). Backed by a BTreeMap so iteration and serialized
// output are ordered by label.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tolerance used when checking whether a distribution already sums to one.
pub const NORMALIZATION_EPSILON: f64 = 1e-9;

/// Mapping from credit-bearing label to credit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditDistribution(BTreeMap<String, f64>);

/// Ground truth uses the same representation as model output.
pub type GroundTruth = CreditDistribution;

impl CreditDistribution {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set the credit for `label`, replacing any previous value.
    pub fn insert(&mut self, label: impl Into<String>, credit: f64) {
        self.0.insert(label.into(), credit);
    }

    /// Add `credit` to the running total for `label`.
    pub fn add(&mut self, label: &str, credit: f64) {
        *self.0.entry(label.to_string()).or_insert(0.0) += credit;
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    /// Credit for `label`, 0 when absent.
    pub fn share(&self, label: &str) -> f64 {
        self.get(label).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Sum of usable (finite, positive) credit.
    pub fn total(&self) -> f64 {
        self.0.values().copied().map(usable).sum()
    }

    /// True if the credits already form a probability distribution.
    pub fn is_normalized(&self) -> bool {
        !self.is_empty() && (self.total() - 1.0).abs() <= NORMALIZATION_EPSILON
    }

    /// Rescale so credits sum to one.
    ///
    /// Negative and non-finite credits count as zero. A zero-sum
    /// distribution normalizes to the empty distribution rather than
    /// dividing by zero. An input that already sums to one is returned
    /// unchanged. Credits are divided by the largest one before summing, so
    /// huge but finite credits cannot overflow the total.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return Self::new();
        }
        if (total - 1.0).abs() <= NORMALIZATION_EPSILON {
            return Self(
                self.0
                    .iter()
                    .map(|(k, v)| (k.clone(), usable(*v)))
                    .collect(),
            );
        }

        let peak = self.0.values().copied().map(usable).fold(0.0, f64::max);
        let scaled_total: f64 = self.0.values().map(|v| usable(*v) / peak).sum();
        let inner = self
            .0
            .iter()
            .filter_map(|(k, v)| {
                let v = usable(*v);
                (v > 0.0).then(|| (k.clone(), v / peak / scaled_total))
            })
            .collect();
        Self(inner)
    }

    /// L1 distance over the union of labels; missing labels count as 0.
    pub fn l1_distance(&self, other: &Self) -> f64 {
        let mut distance = 0.0;
        for (label, credit) in self.iter() {
            distance += (credit - other.share(label)).abs();
        }
        for (label, credit) in other.iter() {
            if !self.0.contains_key(label) {
                distance += credit.abs();
            }
        }
        distance
    }

    /// Copy with labels rewritten by `map`. Colliding labels are summed.
    pub fn relabeled<F>(&self, map: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let mut out = Self::new();
        for (label, credit) in self.iter() {
            out.add(&map(label), credit);
        }
        out
    }
}

fn usable(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for CreditDistribution {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>, const N: usize> From<[(K, f64); N]> for CreditDistribution {
    fn from(entries: [(K, f64); N]) -> Self {
        entries.into_iter().collect()
    }
}
