// src/model.rs
//
// Attribution model contract.
//
// Any scoring function that maps a dataset to a credit distribution can be
// evaluated by the harness. Models receive the full dataset; converted rows
// carry the attribution signal, non-converted rows are there for models
// that compare exposed and unexposed customers.
//
// Contract:
// - paths may be empty, including on converted rows
// - a dataset without conversions yields an empty distribution
// - output need not be normalized; the harness rescales it

use crate::credit::CreditDistribution;
use crate::error::ModelError;
use crate::types::JourneyRecord;

/// An attribution model under evaluation.
pub trait AttributionModel: Send + Sync {
    /// Name used in reports.
    fn name(&self) -> &str;

    /// Assign credit over the labels present in `dataset`.
    fn attribute(&self, dataset: &[JourneyRecord]) -> Result<CreditDistribution, ModelError>;
}

/// Adapter that turns a named closure into an [`AttributionModel`].
pub struct FnModel<F> {
    name: String,
    func: F,
}

impl<F> FnModel<F>
where
    F: Fn(&[JourneyRecord]) -> Result<CreditDistribution, ModelError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> AttributionModel for FnModel<F>
where
    F: Fn(&[JourneyRecord]) -> Result<CreditDistribution, ModelError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, dataset: &[JourneyRecord]) -> Result<CreditDistribution, ModelError> {
        (self.func)(dataset)
    }
}

/// All credit for a conversion goes to the last touch on its path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastTouch;

impl AttributionModel for LastTouch {
    fn name(&self) -> &str {
        "last_touch"
    }

    fn attribute(&self, dataset: &[JourneyRecord]) -> Result<CreditDistribution, ModelError> {
        let mut scores = CreditDistribution::new();
        for record in dataset.iter().filter(|r| r.is_converted()) {
            if let Some(last) = record.path().last() {
                scores.add(last.channel(), 1.0);
            }
        }
        Ok(scores.normalized())
    }
}

/// Credit for a conversion is split evenly across its path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTouch;

impl AttributionModel for LinearTouch {
    fn name(&self) -> &str {
        "linear"
    }

    fn attribute(&self, dataset: &[JourneyRecord]) -> Result<CreditDistribution, ModelError> {
        let mut scores = CreditDistribution::new();
        for record in dataset.iter().filter(|r| r.is_converted()) {
            let len = record.path().len();
            if len == 0 {
                continue;
            }
            let weight = 1.0 / len as f64;
            for channel in record.channels() {
                scores.add(channel, weight);
            }
        }
        Ok(scores.normalized())
    }
}

/// Built-in reference models selectable by name.
pub fn builtin(name: &str) -> Option<Box<dyn AttributionModel>> {
    match name {
        "last_touch" | "last-touch" => Some(Box::new(LastTouch)),
        "linear" => Some(Box::new(LinearTouch)),
        _ => None,
    }
}

/// Names accepted by [`builtin`].
pub const BUILTIN_MODELS: &[&str] = &["last_touch", "linear"];
