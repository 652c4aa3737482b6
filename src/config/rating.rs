//! Rating system configuration

use crate::error::{RankingError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of the Elo update rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingConfig {
    /// Rating assigned to items on first sight
    pub initial_rating: f64,
    /// Lower clamp applied after every update
    pub rating_floor: f64,
    /// Upper clamp applied after every update
    pub rating_ceiling: f64,
    /// Battles below which an item is considered provisional
    pub provisional_battles: u32,
    /// K-factor while provisional
    pub provisional_k: f64,
    /// K-factor once established
    pub established_k: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1500.0,
            rating_floor: 100.0,
            rating_ceiling: 3000.0,
            provisional_battles: 10,
            provisional_k: 32.0,
            established_k: 16.0,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.rating_floor >= self.rating_ceiling {
            return Err(RankingError::ConfigurationError {
                message: "Rating floor must be below the ceiling".to_string(),
            }
            .into());
        }

        if self.initial_rating < self.rating_floor || self.initial_rating > self.rating_ceiling {
            return Err(RankingError::ConfigurationError {
                message: "Initial rating must lie within the clamp bounds".to_string(),
            }
            .into());
        }

        if self.provisional_k <= 0.0 || self.established_k <= 0.0 {
            return Err(RankingError::ConfigurationError {
                message: "K-factors must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
