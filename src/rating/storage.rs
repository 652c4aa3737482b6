//! Rating storage interface and implementations
//!
//! This module defines the persistence contract for rating records and
//! sessions, with an in-memory implementation used as the default backend.
//! Durable backends (SQLite, a sync service) implement the same trait.

use crate::error::{RankingError, Result};
use crate::types::{ContextKey, ItemId, ItemKind, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Persisted rating state for one (context, item) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRecord {
    pub item_id: ItemId,
    pub item_kind: ItemKind,
    pub context: ContextKey,
    pub rating: f64,
    pub battles: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RatingRecord {
    /// Create a fresh record at the given initial rating with zero counts
    pub fn new(
        item_id: ItemId,
        item_kind: ItemKind,
        context: ContextKey,
        initial_rating: f64,
    ) -> Self {
        let now = crate::utils::current_timestamp();
        Self {
            item_id,
            item_kind,
            context,
            rating: initial_rating,
            battles: 0,
            wins: 0,
            losses: 0,
            ties: 0,
            last_updated: now,
            created_at: now,
        }
    }

    /// Fraction of battles won; 0.0 before the first battle
    pub fn win_rate(&self) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        self.wins as f64 / self.battles as f64
    }

    /// How settled this rating is, as a step function of battle count
    pub fn confidence(&self) -> f64 {
        match self.battles {
            0..=4 => 0.2,
            5..=14 => 0.5,
            15..=29 => 0.7,
            30..=49 => 0.85,
            _ => 1.0,
        }
    }
}

/// Trait for rating and session persistence
pub trait RatingStorage: Send + Sync {
    /// Fetch the record for one (context, item) pair, if any
    fn fetch_rating(&self, context: &str, item_id: &str) -> Result<Option<RatingRecord>>;

    /// Insert or replace a single record
    fn upsert_rating(&self, record: &RatingRecord) -> Result<()>;

    /// Insert or replace several records in one call
    fn upsert_ratings(&self, records: &[RatingRecord]) -> Result<()>;

    /// All records for a context, sorted by rating descending,
    /// truncated to `limit` when given
    fn fetch_ratings(&self, context: &str, limit: Option<usize>) -> Result<Vec<RatingRecord>>;

    /// Remove every record for a context, returning how many were removed
    fn delete_context(&self, context: &str) -> Result<usize>;

    /// Remove every record and session across all contexts
    fn delete_all(&self) -> Result<()>;

    /// Persist a freshly created session
    fn create_session(&self, session: &Session) -> Result<()>;

    /// Persist updated progress for an existing session
    fn update_session(&self, session: &Session) -> Result<()>;
}

fn record_key(context: &str, item_id: &str) -> String {
    format!("{context}:{item_id}")
}

/// In-memory rating storage implementation
#[derive(Debug, Default)]
pub struct InMemoryRatingStorage {
    ratings: RwLock<HashMap<String, RatingRecord>>,
    sessions: RwLock<HashMap<uuid::Uuid, Session>>,
}

impl InMemoryRatingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn ratings_read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, RatingRecord>>> {
        self.ratings.read().map_err(|_| {
            RankingError::InternalError {
                message: "Failed to acquire ratings read lock".to_string(),
            }
            .into()
        })
    }

    fn ratings_write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, RatingRecord>>> {
        self.ratings.write().map_err(|_| {
            RankingError::InternalError {
                message: "Failed to acquire ratings write lock".to_string(),
            }
            .into()
        })
    }
}

impl RatingStorage for InMemoryRatingStorage {
    fn fetch_rating(&self, context: &str, item_id: &str) -> Result<Option<RatingRecord>> {
        let ratings = self.ratings_read()?;
        Ok(ratings.get(&record_key(context, item_id)).cloned())
    }

    fn upsert_rating(&self, record: &RatingRecord) -> Result<()> {
        let mut ratings = self.ratings_write()?;
        ratings.insert(record_key(&record.context, &record.item_id), record.clone());
        Ok(())
    }

    fn upsert_ratings(&self, records: &[RatingRecord]) -> Result<()> {
        let mut ratings = self.ratings_write()?;
        for record in records {
            ratings.insert(record_key(&record.context, &record.item_id), record.clone());
        }
        Ok(())
    }

    fn fetch_ratings(&self, context: &str, limit: Option<usize>) -> Result<Vec<RatingRecord>> {
        let ratings = self.ratings_read()?;

        let mut matching: Vec<RatingRecord> = ratings
            .values()
            .filter(|record| record.context == context)
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if let Some(limit) = limit {
            matching.truncate(limit);
        }

        Ok(matching)
    }

    fn delete_context(&self, context: &str) -> Result<usize> {
        let mut ratings = self.ratings_write()?;
        let before = ratings.len();
        ratings.retain(|_, record| record.context != context);
        Ok(before - ratings.len())
    }

    fn delete_all(&self) -> Result<()> {
        self.ratings_write()?.clear();
        self.sessions
            .write()
            .map_err(|_| RankingError::InternalError {
                message: "Failed to acquire sessions write lock".to_string(),
            })?
            .clear();
        Ok(())
    }

    fn create_session(&self, session: &Session) -> Result<()> {
        self.sessions
            .write()
            .map_err(|_| RankingError::InternalError {
                message: "Failed to acquire sessions write lock".to_string(),
            })?
            .insert(session.id, session.clone());
        Ok(())
    }

    fn update_session(&self, session: &Session) -> Result<()> {
        self.create_session(session)
    }
}
