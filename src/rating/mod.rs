//! Elo rating system: pure calculations, persistence contract, and the
//! in-process store that ties them together.

pub mod elo;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use elo::EloCalculator;
pub use storage::{InMemoryRatingStorage, RatingRecord, RatingStorage};
pub use store::RatingStore;
