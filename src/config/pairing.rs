//! Battle queue construction configuration

use crate::error::{RankingError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of the queue construction heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Item count at or below which every pair is generated exhaustively
    pub exhaustive_threshold: usize,
    /// Maximum rating difference allowed for rating-aware pairing
    pub max_rating_spread: f64,
    /// Matchup ceiling per item during the rating-aware pass
    pub target_battles_per_item: usize,
    /// Queue length target as a multiple of the item count
    pub coverage_multiplier: usize,
    /// Sampling attempts per missing matchup during random top-up
    pub top_up_attempt_factor: usize,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            exhaustive_threshold: 10,
            max_rating_spread: 600.0,
            target_battles_per_item: 15,
            coverage_multiplier: 3,
            top_up_attempt_factor: 10,
        }
    }
}

impl PairingConfig {
    /// Queue length the top-up pass aims for
    pub fn coverage_target(&self, item_count: usize) -> usize {
        self.coverage_multiplier * item_count
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.exhaustive_threshold < 2 {
            return Err(RankingError::ConfigurationError {
                message: "Exhaustive threshold must cover at least one pair".to_string(),
            }
            .into());
        }

        if self.max_rating_spread <= 0.0 {
            return Err(RankingError::ConfigurationError {
                message: "Rating spread must be positive".to_string(),
            }
            .into());
        }

        if self.target_battles_per_item == 0 || self.top_up_attempt_factor == 0 {
            return Err(RankingError::ConfigurationError {
                message: "Per-item target and attempt factor must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
