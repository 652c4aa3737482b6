//! Trackduel - Head-to-head Elo ranking engine for music libraries
//!
//! This crate ranks comparable items (songs, albums) through repeated
//! pairwise human judgments: an Elo-style rating store plus a battle
//! sequencer that queues informative matchups.

pub mod battle;
pub mod config;
pub mod error;
pub mod library;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RankingError, Result};
pub use types::*;

// Re-export key components
pub use battle::{BattleEngine, EngineState};
pub use library::{MediaLibrary, StaticMediaLibrary};
pub use rating::{InMemoryRatingStorage, RatingRecord, RatingStorage, RatingStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
