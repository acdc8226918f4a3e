//! HTTP API handlers for stayprice

pub mod estimate;
pub mod health;
pub mod schema;

pub use estimate::create_estimate;
pub use health::health_routes;
pub use schema::get_schema;
