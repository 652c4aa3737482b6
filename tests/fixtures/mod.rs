//! Test fixtures and mock implementations for integration testing

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use trackduel::error::{RankingError, Result};
use trackduel::rating::storage::RatingRecord;
use trackduel::types::Session;
use trackduel::{InMemoryRatingStorage, ItemKind, RankableItem, RatingStorage, StaticMediaLibrary};

/// Storage wrapper that can be switched into a failing mode, for exercising
/// the degradation path where in-memory state stays authoritative
#[derive(Default)]
pub struct FlakyStorage {
    inner: InMemoryRatingStorage,
    failing: AtomicBool,
    failed_calls: AtomicUsize,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn failed_calls(&self) -> usize {
        self.failed_calls.load(Ordering::SeqCst)
    }

    fn gate(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            self.failed_calls.fetch_add(1, Ordering::SeqCst);
            return Err(RankingError::StorageUnavailable {
                message: "simulated outage".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl RatingStorage for FlakyStorage {
    fn fetch_rating(&self, context: &str, item_id: &str) -> Result<Option<RatingRecord>> {
        self.gate()?;
        self.inner.fetch_rating(context, item_id)
    }

    fn upsert_rating(&self, record: &RatingRecord) -> Result<()> {
        self.gate()?;
        self.inner.upsert_rating(record)
    }

    fn upsert_ratings(&self, records: &[RatingRecord]) -> Result<()> {
        self.gate()?;
        self.inner.upsert_ratings(records)
    }

    fn fetch_ratings(&self, context: &str, limit: Option<usize>) -> Result<Vec<RatingRecord>> {
        self.gate()?;
        self.inner.fetch_ratings(context, limit)
    }

    fn delete_context(&self, context: &str) -> Result<usize> {
        self.gate()?;
        self.inner.delete_context(context)
    }

    fn delete_all(&self) -> Result<()> {
        self.gate()?;
        self.inner.delete_all()
    }

    fn create_session(&self, session: &Session) -> Result<()> {
        self.gate()?;
        self.inner.create_session(session)
    }

    fn update_session(&self, session: &Session) -> Result<()> {
        self.gate()?;
        self.inner.update_session(session)
    }
}

/// Build a library with one album of `song_count` songs
pub fn album_library(song_count: usize) -> StaticMediaLibrary {
    let mut library = StaticMediaLibrary::new();
    library.add_album(RankableItem::new(
        "alb-1",
        "Integration LP",
        "The Fixtures",
        ItemKind::Album,
    ));
    for i in 0..song_count {
        library.add_song(
            RankableItem::new(
                format!("song-{i}"),
                format!("Track {i}"),
                "The Fixtures",
                ItemKind::Song,
            ),
            Some("alb-1".to_string()),
        );
    }
    library
}
