// src/error.rs
//
// Error types for scenario generation, suite loading and report persistence.
//
// Model failures are not part of BenchError: the harness records them as a
// `Verdict::ModelError` entry instead of aborting the suite.

use thiserror::Error;

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors raised by generators, the suite loader and report sinks.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A generator or suite received an unusable parameter.
    #[error("invalid configuration in '{field}': {message}")]
    InvalidConfiguration { field: String, message: String },

    /// Reading a suite manifest or writing a report failed.
    #[error("i/o error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error in a suite manifest.
    #[error("failed to parse suite YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BenchError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        BenchError::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        BenchError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure reported by an attribution model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The model returned an error.
    #[error("model failed: {0}")]
    Failed(String),

    /// The model panicked while attributing.
    #[error("model panicked: {0}")]
    Panicked(String),
}

/// Check that `value` is a probability in `[0, 1]`.
pub(crate) fn check_probability(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(BenchError::invalid(
            field,
            format!("probability must be within [0, 1], got {value}"),
        ));
    }
    Ok(())
}

/// Check that a conversion value is finite and non-negative.
pub(crate) fn check_value(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(BenchError::invalid(
            field,
            format!("value must be finite and >= 0, got {value}"),
        ));
    }
    Ok(())
}

/// Check that the sample count is at least one.
pub(crate) fn check_sample_count(n: usize) -> Result<()> {
    if n < 1 {
        return Err(BenchError::invalid("n", "sample count must be >= 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_bounds_are_inclusive() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", -0.01).is_err());
        assert!(check_probability("p", 1.01).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn zero_samples_is_invalid_configuration() {
        let err = check_sample_count(0).unwrap_err();
        assert!(matches!(
            err,
            BenchError::InvalidConfiguration { ref field, .. } if field == "n"
        ));
        assert!(check_sample_count(1).is_ok());
    }

    #[test]
    fn invalid_configuration_message_names_field() {
        let err = BenchError::invalid("p_intent", "out of range");
        assert_eq!(
            err.to_string(),
            "invalid configuration in 'p_intent': out of range"
        );
    }
}
