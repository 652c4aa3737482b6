//! Battle sequencing: queue construction heuristics and the engine that
//! walks the queue as outcomes come in.

pub mod engine;
pub mod pairing;

// Re-export commonly used types
pub use engine::{BattleEngine, EngineState};
pub use pairing::build_battle_queue;
