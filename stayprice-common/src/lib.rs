//! # stayprice Common Library
//!
//! Listing price estimation shared by the stayprice service and CLI:
//! - Canonical model fields, default values and sweep candidates
//! - Derived feature calculation and input validation
//! - Sensitivity sweeps and price aggregation
//! - Model boundary and artifact loading
//! - Configuration loading

pub mod aggregate;
pub mod amenities;
pub mod config;
pub mod defaults;
pub mod derived;
pub mod engine;
pub mod error;
pub mod geo;
pub mod model;
pub mod request;
pub mod schema;
pub mod sweep;
pub mod validation;

pub use aggregate::{Estimate, EstimateReport, PriceRange};
pub use engine::Estimator;
pub use error::{Error, Result};
pub use model::{LinearModel, PriceModel};
pub use request::{Audience, EstimateRequest};
pub use schema::{AttributeSet, FeatureVector, Field, Schema, FEATURE_ORDER};
