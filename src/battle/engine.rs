//! Battle engine: sequences matchups and records outcomes
//!
//! One engine instance drives one ranking session at a time. Calls are
//! expected to arrive serialized from a single interaction flow; the engine
//! holds no internal locking beyond what the shared [`RatingStore`] does.

use crate::config::PairingConfig;
use crate::error::{RankingError, Result};
use crate::rating::storage::RatingStorage;
use crate::rating::{RatingRecord, RatingStore};
use crate::types::{
    BattleOutcome, ContextKey, ContextStatistics, Matchup, RankableItem, Session,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of a battle engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No session set up yet
    Idle,
    /// Queue construction in progress (transient within `setup`)
    Building,
    /// Matchups available for judging
    Active,
    /// Queue drained; only a new `setup` leaves this state
    Complete,
}

/// Sequences pairwise battles for one collection of items
pub struct BattleEngine {
    store: Arc<RatingStore>,
    storage: Arc<dyn RatingStorage>,
    config: PairingConfig,
    state: EngineState,
    context: ContextKey,
    queue: VecDeque<Matchup>,
    session: Option<Session>,
    completed_battles: usize,
    skipped_battles: usize,
}

impl BattleEngine {
    /// Create an idle engine over a shared store and storage backend
    pub fn new(store: Arc<RatingStore>, storage: Arc<dyn RatingStorage>) -> Self {
        Self::with_config(store, storage, PairingConfig::default())
    }

    pub fn with_config(
        store: Arc<RatingStore>,
        storage: Arc<dyn RatingStorage>,
        config: PairingConfig,
    ) -> Self {
        Self {
            store,
            storage,
            config,
            state: EngineState::Idle,
            context: ContextKey::new(),
            queue: VecDeque::new(),
            session: None,
            completed_battles: 0,
            skipped_battles: 0,
        }
    }

    /// Start a new session over `items`, discarding any prior state.
    ///
    /// Fails with [`RankingError::InsufficientItems`] when fewer than two
    /// items are supplied; the engine then keeps no queue and no session.
    pub fn setup(&mut self, items: Vec<RankableItem>, context: ContextKey) -> Result<()> {
        if items.len() < 2 {
            return Err(RankingError::InsufficientItems { count: items.len() }.into());
        }

        self.state = EngineState::Building;
        self.context = context;
        self.completed_battles = 0;
        self.skipped_battles = 0;

        // Queue construction is synchronous: the shuffled queue exists in
        // full before the first matchup is exposed.
        let queue =
            crate::battle::pairing::build_battle_queue(&items, &self.context, &self.store, &self.config);
        self.queue = VecDeque::from(queue);

        let session = Session::new(self.context.clone(), self.queue.len());
        if let Err(err) = self.storage.create_session(&session) {
            warn!(context = %self.context, error = %err, "Failed to persist new session");
        }

        info!(
            context = %self.context,
            session_id = %session.id,
            total_battles = session.total_battles,
            "Battle session started"
        );

        self.session = Some(session);
        self.state = EngineState::Active;
        Ok(())
    }

    /// The matchup awaiting judgment, if any. `None` means no active session
    /// or a completed one.
    pub fn current_matchup(&self) -> Option<&Matchup> {
        if self.state != EngineState::Active {
            return None;
        }
        self.queue.front()
    }

    /// Record the outcome of the current matchup and advance the queue.
    ///
    /// Rating and session persistence failures are logged and never roll
    /// back queue advancement; in-memory state stays authoritative.
    pub fn record_outcome(&mut self, outcome: BattleOutcome) -> Result<()> {
        if self.state != EngineState::Active || self.queue.is_empty() {
            return Err(RankingError::NoActiveMatchup.into());
        }

        // Resolve participants before popping so a bad winner id rejects
        // the call without consuming the matchup.
        match &outcome {
            BattleOutcome::WinnerSelected { winner_id } => {
                let matchup = self.queue.front().ok_or(RankingError::NoActiveMatchup)?;
                let (winner, loser) = if matchup.first.id == *winner_id {
                    (matchup.first.clone(), matchup.second.clone())
                } else if matchup.second.id == *winner_id {
                    (matchup.second.clone(), matchup.first.clone())
                } else {
                    return Err(RankingError::UnknownParticipant {
                        item_id: winner_id.clone(),
                    }
                    .into());
                };
                self.queue.pop_front();

                if let Err(err) = self.store.apply_win(&self.context, &winner, &loser) {
                    warn!(context = %self.context, error = %err, "Rating update not persisted");
                }
                self.completed_battles += 1;
            }
            BattleOutcome::BothLiked => {
                let matchup = self
                    .queue
                    .pop_front()
                    .ok_or(RankingError::NoActiveMatchup)?;

                if let Err(err) =
                    self.store
                        .apply_tie(&self.context, &matchup.first, &matchup.second)
                {
                    warn!(context = %self.context, error = %err, "Rating update not persisted");
                }
                self.completed_battles += 1;
            }
            BattleOutcome::Skipped => {
                self.queue.pop_front();
                // Skips are dropped from the queue but never count toward
                // session completion.
                self.skipped_battles += 1;
            }
        }

        if let Some(session) = self.session.as_mut() {
            session.completed_battles = self.completed_battles;
            if let Err(err) = self.storage.update_session(session) {
                warn!(session_id = %session.id, error = %err, "Failed to persist session progress");
            }
        }

        if self.queue.is_empty() {
            self.finish_session();
        } else {
            debug!(
                context = %self.context,
                remaining = self.queue.len(),
                completed = self.completed_battles,
                skipped = self.skipped_battles,
                "Advanced battle queue"
            );
        }

        Ok(())
    }

    /// Fraction of the session completed via decisive or tied battles.
    /// Skipped matchups never count, so a fully-skipped run stays below 1.0
    /// even after the engine reaches Complete.
    pub fn progress(&self) -> f64 {
        match &self.session {
            Some(session) if session.total_battles > 0 => {
                self.completed_battles as f64 / session.total_battles as f64
            }
            _ => 0.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == EngineState::Complete
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn completed_count(&self) -> usize {
        self.completed_battles
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_battles
    }

    pub fn battles_remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current rankings for a context, rating descending
    pub fn rankings(&self, context: &str, limit: Option<usize>) -> Vec<RatingRecord> {
        self.store.rankings(context, limit)
    }

    /// Aggregate statistics for a context
    pub fn context_statistics(&self, context: &str) -> ContextStatistics {
        self.store.context_statistics(context)
    }

    fn finish_session(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.completed_at = Some(crate::utils::current_timestamp());
            if let Err(err) = self.storage.update_session(session) {
                warn!(session_id = %session.id, error = %err, "Failed to persist completed session");
            }
            info!(
                session_id = %session.id,
                completed = self.completed_battles,
                skipped = self.skipped_battles,
                "Battle session complete"
            );
        }
        self.state = EngineState::Complete;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::InMemoryRatingStorage;
    use crate::types::ItemKind;

    const CTX: &str = "album_songs:7";

    fn songs(count: usize) -> Vec<RankableItem> {
        (0..count)
            .map(|i| {
                RankableItem::new(
                    format!("song-{i}"),
                    format!("Track {i}"),
                    "Artist",
                    ItemKind::Song,
                )
            })
            .collect()
    }

    fn test_engine() -> BattleEngine {
        let storage = Arc::new(InMemoryRatingStorage::new());
        let store = Arc::new(RatingStore::new(storage.clone()));
        BattleEngine::new(store, storage)
    }

    fn winner_of(matchup: &Matchup) -> BattleOutcome {
        BattleOutcome::WinnerSelected {
            winner_id: matchup.first.id.clone(),
        }
    }

    #[test]
    fn test_setup_requires_two_items() {
        let mut engine = test_engine();

        let err = engine.setup(songs(1), CTX.to_string()).unwrap_err();
        assert!(err.to_string().contains("at least two items"));
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.current_matchup().is_none());
        assert!(engine.session().is_none());
    }

    #[test]
    fn test_two_items_produce_one_matchup() {
        let mut engine = test_engine();
        engine.setup(songs(2), CTX.to_string()).unwrap();

        assert_eq!(engine.state(), EngineState::Active);
        assert_eq!(engine.battles_remaining(), 1);
        assert_eq!(engine.session().unwrap().total_battles, 1);
        assert_eq!(engine.progress(), 0.0);

        let matchup = engine.current_matchup().unwrap().clone();
        engine.record_outcome(winner_of(&matchup)).unwrap();

        assert!(engine.is_complete());
        assert_eq!(engine.progress(), 1.0);
        assert_eq!(engine.completed_count(), 1);
        assert!(engine.session().unwrap().completed_at.is_some());

        // Winner took 16 points off the loser at k=32.
        let rankings = engine.rankings(CTX, None);
        assert!((rankings[0].rating - 1516.0).abs() < 1e-9);
        assert!((rankings[1].rating - 1484.0).abs() < 1e-9);
    }

    #[test]
    fn test_current_matchup_does_not_consume() {
        let mut engine = test_engine();
        engine.setup(songs(3), CTX.to_string()).unwrap();

        let before = engine.battles_remaining();
        let first = engine.current_matchup().unwrap().clone();
        let second = engine.current_matchup().unwrap().clone();
        assert!(first.same_pair(&second.first.id, &second.second.id));
        assert_eq!(engine.battles_remaining(), before);
    }

    #[test]
    fn test_outcome_without_matchup_is_rejected() {
        let mut engine = test_engine();
        let err = engine.record_outcome(BattleOutcome::BothLiked).unwrap_err();
        assert!(err.to_string().contains("No active matchup"));
    }

    #[test]
    fn test_unknown_winner_leaves_matchup_in_place() {
        let mut engine = test_engine();
        engine.setup(songs(2), CTX.to_string()).unwrap();

        let err = engine
            .record_outcome(BattleOutcome::WinnerSelected {
                winner_id: "not-in-this-matchup".to_string(),
            })
            .unwrap_err();
        assert!(err.to_string().contains("not part of the current matchup"));
        assert_eq!(engine.battles_remaining(), 1);
        assert_eq!(engine.completed_count(), 0);
    }

    #[test]
    fn test_skip_does_not_advance_progress() {
        let mut engine = test_engine();
        engine.setup(songs(2), CTX.to_string()).unwrap();

        engine.record_outcome(BattleOutcome::Skipped).unwrap();

        // The queue drained, so the session completes, but progress never
        // reaches 1.0 because skips do not count.
        assert!(engine.is_complete());
        assert_eq!(engine.progress(), 0.0);
        assert_eq!(engine.skipped_count(), 1);
        assert_eq!(engine.completed_count(), 0);
        assert_eq!(engine.session().unwrap().completed_battles, 0);
        assert!(engine.session().unwrap().completed_at.is_some());
    }

    #[test]
    fn test_ties_count_toward_completion() {
        let mut engine = test_engine();
        engine.setup(songs(2), CTX.to_string()).unwrap();

        engine.record_outcome(BattleOutcome::BothLiked).unwrap();

        assert!(engine.is_complete());
        assert_eq!(engine.progress(), 1.0);
        let rankings = engine.rankings(CTX, None);
        assert_eq!(rankings[0].ties, 1);
        assert_eq!(rankings[1].ties, 1);
    }

    #[test]
    fn test_completed_never_exceeds_total() {
        let mut engine = test_engine();
        engine.setup(songs(4), CTX.to_string()).unwrap();
        let total = engine.session().unwrap().total_battles;

        while let Some(matchup) = engine.current_matchup().cloned() {
            engine.record_outcome(winner_of(&matchup)).unwrap();
            assert!(engine.completed_count() <= total);
        }

        assert!(engine.is_complete());
        assert_eq!(engine.completed_count(), total);
        assert_eq!(engine.progress(), 1.0);
    }

    #[test]
    fn test_new_setup_supersedes_completed_session() {
        let mut engine = test_engine();
        engine.setup(songs(2), CTX.to_string()).unwrap();
        engine.record_outcome(BattleOutcome::BothLiked).unwrap();
        let first_session = engine.session().unwrap().id;
        assert!(engine.is_complete());

        engine.setup(songs(3), CTX.to_string()).unwrap();
        assert_eq!(engine.state(), EngineState::Active);
        assert_ne!(engine.session().unwrap().id, first_session);
        assert_eq!(engine.completed_count(), 0);
        assert_eq!(engine.skipped_count(), 0);
        assert_eq!(engine.battles_remaining(), 3);
    }

    #[test]
    fn test_mixed_outcomes_through_a_full_session() {
        let mut engine = test_engine();
        engine.setup(songs(4), CTX.to_string()).unwrap();
        let total = engine.session().unwrap().total_battles;
        assert_eq!(total, 6);

        let mut skipped = 0;
        let mut completed = 0;
        let mut turn = 0;
        while let Some(matchup) = engine.current_matchup().cloned() {
            let outcome = match turn % 3 {
                0 => winner_of(&matchup),
                1 => BattleOutcome::BothLiked,
                _ => BattleOutcome::Skipped,
            };
            if matches!(outcome, BattleOutcome::Skipped) {
                skipped += 1;
            } else {
                completed += 1;
            }
            engine.record_outcome(outcome).unwrap();
            turn += 1;
        }

        assert!(engine.is_complete());
        assert_eq!(engine.completed_count(), completed);
        assert_eq!(engine.skipped_count(), skipped);
        assert!((engine.progress() - completed as f64 / total as f64).abs() < 1e-9);

        // Recording after completion is a rejected precondition, not a crash.
        assert!(engine.record_outcome(BattleOutcome::BothLiked).is_err());
    }
}
