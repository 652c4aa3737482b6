//! Elo rating calculations
//!
//! Pure math for expected scores and rating updates. The calculator holds a
//! validated [`RatingConfig`] and never touches storage; applying results to
//! records is the store's job.

use crate::config::RatingConfig;
use crate::error::Result;

/// Elo update calculator
#[derive(Debug, Clone)]
pub struct EloCalculator {
    config: RatingConfig,
}

impl Default for EloCalculator {
    fn default() -> Self {
        Self {
            config: RatingConfig::default(),
        }
    }
}

impl EloCalculator {
    /// Create a calculator from a validated configuration
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Rating assigned to items on first sight
    pub fn initial_rating(&self) -> f64 {
        self.config.initial_rating
    }

    /// Predicted probability that a rating of `a` beats a rating of `b`
    pub fn expected_score(&self, a: f64, b: f64) -> f64 {
        1.0 / (1.0 + 10f64.powf((b - a) / 400.0))
    }

    /// Update sensitivity, higher while an item is still provisional
    pub fn k_factor(&self, battles: u32) -> f64 {
        if battles < self.config.provisional_battles {
            self.config.provisional_k
        } else {
            self.config.established_k
        }
    }

    /// New (winner, loser) ratings after a decisive battle.
    ///
    /// `battles` counts are the participants' battle counts before this one.
    pub fn rate_win(
        &self,
        winner_rating: f64,
        winner_battles: u32,
        loser_rating: f64,
        loser_battles: u32,
    ) -> (f64, f64) {
        let expected_winner = self.expected_score(winner_rating, loser_rating);
        let expected_loser = 1.0 - expected_winner;

        let new_winner =
            winner_rating + self.k_factor(winner_battles) * (1.0 - expected_winner);
        let new_loser = loser_rating + self.k_factor(loser_battles) * (0.0 - expected_loser);

        (self.clamp_rating(new_winner), self.clamp_rating(new_loser))
    }

    /// New ratings after a tie; both sides score 0.5
    pub fn rate_tie(
        &self,
        rating_a: f64,
        battles_a: u32,
        rating_b: f64,
        battles_b: u32,
    ) -> (f64, f64) {
        let expected_a = self.expected_score(rating_a, rating_b);
        let expected_b = 1.0 - expected_a;

        let new_a = rating_a + self.k_factor(battles_a) * (0.5 - expected_a);
        let new_b = rating_b + self.k_factor(battles_b) * (0.5 - expected_b);

        (self.clamp_rating(new_a), self.clamp_rating(new_b))
    }

    fn clamp_rating(&self, rating: f64) -> f64 {
        rating.clamp(self.config.rating_floor, self.config.rating_ceiling)
    }
}
