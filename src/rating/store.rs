//! The rating store component
//!
//! [`RatingStore`] owns the authoritative in-memory mapping from
//! (context, item) to [`RatingRecord`], applies Elo updates for battle
//! outcomes, and mirrors every mutation to the injected [`RatingStorage`]
//! backend. It knows nothing about queues or sessions.
//!
//! In-memory state is the source of truth for the running process: a
//! persistence failure is logged and surfaced for the affected operation,
//! but never rolls back or corrupts the cached records.

use crate::error::{RankingError, Result};
use crate::rating::elo::EloCalculator;
use crate::rating::storage::{RatingRecord, RatingStorage};
use crate::types::{ContextKey, ContextStatistics, ItemId, RankableItem};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

type RecordKey = (ContextKey, ItemId);

#[derive(Debug, Default)]
struct StoreState {
    records: HashMap<RecordKey, RatingRecord>,
    /// Creation order, used as the stable tie-break when ranking
    order: Vec<RecordKey>,
}

/// In-process rating manager backed by a pluggable storage
pub struct RatingStore {
    calculator: EloCalculator,
    storage: Arc<dyn RatingStorage>,
    state: RwLock<StoreState>,
}

impl RatingStore {
    /// Create a store with the default Elo parameters
    pub fn new(storage: Arc<dyn RatingStorage>) -> Self {
        Self::with_calculator(storage, EloCalculator::default())
    }

    pub fn with_calculator(storage: Arc<dyn RatingStorage>, calculator: EloCalculator) -> Self {
        Self {
            calculator,
            storage,
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn calculator(&self) -> &EloCalculator {
        &self.calculator
    }

    /// Predicted probability that a rating of `a` beats a rating of `b`
    pub fn expected_score(&self, a: f64, b: f64) -> f64 {
        self.calculator.expected_score(a, b)
    }

    /// Get the record for an item in a context, creating it lazily at the
    /// initial rating. Absence is expected, not exceptional: this never
    /// fails logically, even when the backing storage is down.
    pub fn get_rating(&self, context: &str, item: &RankableItem) -> RatingRecord {
        let key = (context.to_string(), item.id.clone());

        {
            let state = self.state.read().unwrap_or_else(|e| e.into_inner());
            if let Some(record) = state.records.get(&key) {
                return record.clone();
            }
        }

        // First sight in this process: consult persistence, then fall back
        // to a fresh record at the initial rating.
        let record = match self.storage.fetch_rating(context, &item.id) {
            Ok(Some(persisted)) => persisted,
            Ok(None) => {
                let fresh = RatingRecord::new(
                    item.id.clone(),
                    item.kind,
                    context.to_string(),
                    self.calculator.initial_rating(),
                );
                if let Err(err) = self.storage.upsert_rating(&fresh) {
                    warn!(context, item_id = %item.id, error = %err, "Failed to persist new rating record");
                }
                fresh
            }
            Err(err) => {
                warn!(context, item_id = %item.id, error = %err, "Rating fetch failed, serving fresh record");
                RatingRecord::new(
                    item.id.clone(),
                    item.kind,
                    context.to_string(),
                    self.calculator.initial_rating(),
                )
            }
        };

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        // A concurrent lookup may have raced us here; keep the first insert.
        if let Some(existing) = state.records.get(&key) {
            return existing.clone();
        }
        state.order.push(key.clone());
        state.records.insert(key, record.clone());
        record
    }

    /// Apply a decisive outcome: Elo update, clamp, count and timestamp
    /// maintenance on both records, then persistence of both.
    pub fn apply_win(
        &self,
        context: &str,
        winner: &RankableItem,
        loser: &RankableItem,
    ) -> Result<(RatingRecord, RatingRecord)> {
        let winner_record = self.get_rating(context, winner);
        let loser_record = self.get_rating(context, loser);

        let (new_winner, new_loser) = self.calculator.rate_win(
            winner_record.rating,
            winner_record.battles,
            loser_record.rating,
            loser_record.battles,
        );

        let now = crate::utils::current_timestamp();
        let updated = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());

            let w = state
                .records
                .get_mut(&(context.to_string(), winner.id.clone()))
                .ok_or_else(|| RankingError::InternalError {
                    message: format!("Rating record vanished for {}", winner.id),
                })?;
            w.rating = new_winner;
            w.battles += 1;
            w.wins += 1;
            w.last_updated = now;
            let w = w.clone();

            let l = state
                .records
                .get_mut(&(context.to_string(), loser.id.clone()))
                .ok_or_else(|| RankingError::InternalError {
                    message: format!("Rating record vanished for {}", loser.id),
                })?;
            l.rating = new_loser;
            l.battles += 1;
            l.losses += 1;
            l.last_updated = now;
            let l = l.clone();

            (w, l)
        };

        debug!(
            context,
            winner_id = %winner.id,
            loser_id = %loser.id,
            winner_rating = updated.0.rating,
            loser_rating = updated.1.rating,
            "Applied win"
        );

        self.persist_pair(&updated.0, &updated.1)?;
        Ok(updated)
    }

    /// Apply a tie: both sides score 0.5 and gain a `ties` count
    pub fn apply_tie(
        &self,
        context: &str,
        item_a: &RankableItem,
        item_b: &RankableItem,
    ) -> Result<(RatingRecord, RatingRecord)> {
        let record_a = self.get_rating(context, item_a);
        let record_b = self.get_rating(context, item_b);

        let (new_a, new_b) = self.calculator.rate_tie(
            record_a.rating,
            record_a.battles,
            record_b.rating,
            record_b.battles,
        );

        let now = crate::utils::current_timestamp();
        let updated = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());

            let mut tied = Vec::with_capacity(2);
            for (id, new_rating) in [(&item_a.id, new_a), (&item_b.id, new_b)] {
                let record = state
                    .records
                    .get_mut(&(context.to_string(), id.clone()))
                    .ok_or_else(|| RankingError::InternalError {
                        message: format!("Rating record vanished for {id}"),
                    })?;
                record.rating = new_rating;
                record.battles += 1;
                record.ties += 1;
                record.last_updated = now;
                tied.push(record.clone());
            }

            let b = tied.pop().ok_or_else(|| RankingError::InternalError {
                message: "Tie update produced no records".to_string(),
            })?;
            let a = tied.pop().ok_or_else(|| RankingError::InternalError {
                message: "Tie update produced no records".to_string(),
            })?;
            (a, b)
        };

        debug!(context, a = %item_a.id, b = %item_b.id, "Applied tie");

        self.persist_pair(&updated.0, &updated.1)?;
        Ok(updated)
    }

    /// Current rankings for a context: rating descending, creation order as
    /// the tie-break, truncated to `limit` when given
    pub fn rankings(&self, context: &str, limit: Option<usize>) -> Vec<RatingRecord> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());

        let mut records: Vec<RatingRecord> = state
            .order
            .iter()
            .filter(|(ctx, _)| ctx == context)
            .filter_map(|key| state.records.get(key))
            .cloned()
            .collect();

        // sort_by is stable, so equal ratings keep creation order.
        records.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if let Some(limit) = limit {
            records.truncate(limit);
        }

        records
    }

    /// Remove every record for a context; later lookups recreate at the
    /// initial rating
    pub fn reset_context(&self, context: &str) -> Result<usize> {
        let removed = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            let before = state.records.len();
            state.records.retain(|(ctx, _), _| ctx != context);
            state.order.retain(|(ctx, _)| ctx != context);
            before - state.records.len()
        };

        debug!(context, removed, "Reset context");

        if let Err(err) = self.storage.delete_context(context) {
            warn!(context, error = %err, "Failed to delete context from storage");
            return Err(RankingError::StorageUnavailable {
                message: err.to_string(),
            }
            .into());
        }

        Ok(removed)
    }

    /// Wipe every record and session across all contexts
    pub fn delete_all(&self) -> Result<()> {
        {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            state.records.clear();
            state.order.clear();
        }

        if let Err(err) = self.storage.delete_all() {
            warn!(error = %err, "Failed to wipe storage");
            return Err(RankingError::StorageUnavailable {
                message: err.to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Aggregate statistics over the context's current records
    pub fn context_statistics(&self, context: &str) -> ContextStatistics {
        let records = self.rankings(context, None);

        let item_count = records.len();
        let total_battles = records.iter().map(|r| r.battles as u64).sum();
        let average_rating = if item_count == 0 {
            self.calculator.initial_rating()
        } else {
            records.iter().map(|r| r.rating).sum::<f64>() / item_count as f64
        };

        ContextStatistics {
            item_count,
            total_battles,
            average_rating,
        }
    }

    fn persist_pair(&self, a: &RatingRecord, b: &RatingRecord) -> Result<()> {
        if let Err(err) = self.storage.upsert_ratings(&[a.clone(), b.clone()]) {
            warn!(error = %err, "Failed to persist rating update, in-memory state kept");
            return Err(RankingError::StorageUnavailable {
                message: err.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
