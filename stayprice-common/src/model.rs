//! Prediction model boundary
//!
//! The pretrained model is a black box: a function from the canonical
//! feature vector to a single log-space value. [`LinearModel`] is the
//! artifact format this service ships with; any other model plugs in through
//! [`PriceModel`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::schema::{FEATURE_ORDER, FIELD_COUNT};
use crate::{Error, Result};

/// Failure inside a model evaluation
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("{0}")]
    Evaluation(String),
}

/// A pretrained regression model predicting `ln(1 + price)`
pub trait PriceModel: Send + Sync {
    /// Evaluate one input vector, ordered as [`FEATURE_ORDER`]
    fn predict(&self, features: &[f64]) -> std::result::Result<f64, ModelError>;

    /// Short identification for logs
    fn describe(&self) -> String {
        "unnamed model".to_string()
    }
}

/// Convert a raw log-space prediction to a price: `exp(raw) - 1`
pub fn to_price(raw: f64) -> f64 {
    raw.exp_m1()
}

/// Linear regression artifact
///
/// Stored as JSON. `features` must list the canonical field names in model
/// invocation order; a mismatch is rejected at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub name: String,
    pub version: String,
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Build from coefficients already in canonical order
    pub fn from_coefficients(coefficients: [f64; FIELD_COUNT], intercept: f64) -> Self {
        Self {
            name: "linear".to_string(),
            version: "inline".to_string(),
            features: FEATURE_ORDER.iter().map(|f| f.name().to_string()).collect(),
            coefficients: coefficients.to_vec(),
            intercept,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let model: LinearModel = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid model artifact: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    /// Load a model artifact from disk
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read model artifact {}: {}", path.display(), e))
        })?;
        let model = Self::from_json(&json)?;
        info!(
            "Loaded model '{}' v{} from {}",
            model.name,
            model.version,
            path.display()
        );
        Ok(model)
    }

    /// Check the artifact's feature list against the canonical order
    pub fn validate(&self) -> Result<()> {
        if self.features.len() != FIELD_COUNT {
            return Err(Error::Config(format!(
                "model '{}' has {} features, expected {}",
                self.name,
                self.features.len(),
                FIELD_COUNT
            )));
        }

        for (position, (name, field)) in self.features.iter().zip(FEATURE_ORDER).enumerate() {
            if name != field.name() {
                return Err(Error::Config(format!(
                    "model '{}' feature {} is '{}', expected '{}'",
                    self.name, position, name, field
                )));
            }
        }

        if self.coefficients.len() != self.features.len() {
            return Err(Error::Config(format!(
                "model '{}' has {} coefficients for {} features",
                self.name,
                self.coefficients.len(),
                self.features.len()
            )));
        }

        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::Config(format!(
                "model '{}' contains non-finite parameters",
                self.name
            )));
        }

        Ok(())
    }
}

impl PriceModel for LinearModel {
    fn predict(&self, features: &[f64]) -> std::result::Result<f64, ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::Shape {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>())
    }

    fn describe(&self) -> String {
        format!("{} v{}", self.name, self.version)
    }
}

/// Adapts a closure into a [`PriceModel`]
pub struct FnModel<F>(pub F);

impl<F> PriceModel for FnModel<F>
where
    F: Fn(&[f64]) -> std::result::Result<f64, ModelError> + Send + Sync,
{
    fn predict(&self, features: &[f64]) -> std::result::Result<f64, ModelError> {
        (self.0)(features)
    }

    fn describe(&self) -> String {
        "closure model".to_string()
    }
}
