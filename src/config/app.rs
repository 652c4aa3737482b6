//! Main application configuration
//!
//! This module defines the primary configuration structure for the trackduel
//! ranking engine, including environment variable loading and validation.

use crate::config::pairing::PairingConfig;
use crate::config::rating::RatingConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub pairing: PairingConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "trackduel".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            config.service.log_level = level;
        }

        // Rating settings
        if let Ok(value) = env::var("RATING_INITIAL") {
            config.rating.initial_rating = value.parse()?;
        }
        if let Ok(value) = env::var("RATING_FLOOR") {
            config.rating.rating_floor = value.parse()?;
        }
        if let Ok(value) = env::var("RATING_CEILING") {
            config.rating.rating_ceiling = value.parse()?;
        }
        if let Ok(value) = env::var("RATING_PROVISIONAL_BATTLES") {
            config.rating.provisional_battles = value.parse()?;
        }
        if let Ok(value) = env::var("RATING_PROVISIONAL_K") {
            config.rating.provisional_k = value.parse()?;
        }
        if let Ok(value) = env::var("RATING_ESTABLISHED_K") {
            config.rating.established_k = value.parse()?;
        }

        // Pairing settings
        if let Ok(value) = env::var("PAIRING_EXHAUSTIVE_THRESHOLD") {
            config.pairing.exhaustive_threshold = value.parse()?;
        }
        if let Ok(value) = env::var("PAIRING_MAX_RATING_SPREAD") {
            config.pairing.max_rating_spread = value.parse()?;
        }
        if let Ok(value) = env::var("PAIRING_TARGET_BATTLES_PER_ITEM") {
            config.pairing.target_battles_per_item = value.parse()?;
        }
        if let Ok(value) = env::var("PAIRING_COVERAGE_MULTIPLIER") {
            config.pairing.coverage_multiplier = value.parse()?;
        }

        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate a complete configuration
pub fn validate_config(config: &AppConfig) -> Result<()> {
    config.rating.validate()?;
    config.pairing.validate()?;

    match config.service.log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        other => Err(crate::error::RankingError::ConfigurationError {
            message: format!("Unknown log level: {other}"),
        }
        .into()),
    }
}
