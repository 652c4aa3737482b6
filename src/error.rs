//! Error types for the ranking engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ranking scenarios
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("Need at least two items to battle, got {count}")]
    InsufficientItems { count: usize },

    #[error("No active matchup to record an outcome for")]
    NoActiveMatchup,

    #[error("Item not part of the current matchup: {item_id}")]
    UnknownParticipant { item_id: String },

    #[error("Rating storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal engine error: {message}")]
    InternalError { message: String },
}
