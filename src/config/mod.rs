//! Configuration management for the ranking engine
//!
//! This module handles configuration loading from environment variables,
//! validation, and default values for the rating and pairing subsystems.

pub mod app;
pub mod pairing;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use pairing::PairingConfig;
pub use rating::RatingConfig;
