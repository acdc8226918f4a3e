//! Common error types for stayprice

use thiserror::Error;

use crate::schema::FeatureVector;

/// Common result type for stayprice operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the estimation pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A supplied attribute is outside its valid domain
    #[error("Invalid input for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The model failed or produced a non-finite value for `input`
    #[error("Prediction failed: {reason}")]
    Prediction {
        input: Box<FeatureVector>,
        reason: String,
    },

    /// Planned sweep would exceed the configured per-request prediction budget
    #[error("Prediction budget exceeded: request needs {planned} model calls, limit is {limit}")]
    PredictionBudget { planned: usize, limit: usize },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a validation failure on a named field
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Model input attached to a prediction failure
    pub fn input(&self) -> Option<&FeatureVector> {
        match self {
            Error::Prediction { input, .. } => Some(&**input),
            _ => None,
        }
    }

    /// Shorthand for a model failure on a given input vector
    pub fn prediction(input: &FeatureVector, reason: impl Into<String>) -> Self {
        Error::Prediction {
            input: Box::new(*input),
            reason: reason.into(),
        }
    }
}
