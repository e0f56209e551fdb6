//! Handlers shared by every deployment of the service.

pub mod health;

pub use health::{HealthResponse, health_check};
