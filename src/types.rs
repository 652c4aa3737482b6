//! Common types used throughout the ranking engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a rankable item (song or album)
pub type ItemId = String;

/// Opaque scope key partitioning ratings, composed externally as
/// `<scope>:<scopeID>`. The engine treats it as a flat string and never
/// parses it.
pub type ContextKey = String;

/// Unique identifier for ranking sessions
pub type SessionId = Uuid;

/// Kind of entity being ranked, decided once at item creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Song,
    Album,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Song => write!(f, "song"),
            ItemKind::Album => write!(f, "album"),
        }
    }
}

/// An entity that can take part in battles.
///
/// Identity is carried entirely by `id`; title and artist exist for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankableItem {
    pub id: ItemId,
    pub title: String,
    pub artist: String,
    pub kind: ItemKind,
}

impl RankableItem {
    pub fn new(
        id: impl Into<ItemId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        kind: ItemKind,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            kind,
        }
    }
}

impl PartialEq for RankableItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RankableItem {}

/// One head-to-head comparison awaiting a judged outcome.
///
/// Produced by the sequencer and consumed exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matchup {
    pub first: RankableItem,
    pub second: RankableItem,
    pub context: ContextKey,
}

impl Matchup {
    /// Check whether two matchups cover the same unordered pair of items
    pub fn same_pair(&self, a: &ItemId, b: &ItemId) -> bool {
        (self.first.id == *a && self.second.id == *b)
            || (self.first.id == *b && self.second.id == *a)
    }

    /// Given one participant, return the other, if the id matches at all
    pub fn opponent_of(&self, item_id: &ItemId) -> Option<&RankableItem> {
        if self.first.id == *item_id {
            Some(&self.second)
        } else if self.second.id == *item_id {
            Some(&self.first)
        } else {
            None
        }
    }
}

/// Judged result of one matchup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BattleOutcome {
    /// One side was preferred; the other participant is the loser
    WinnerSelected { winner_id: ItemId },
    /// Both sides liked equally, scored as a tie
    BothLiked,
    /// No judgment; the matchup is dropped without a rating change
    Skipped,
}

/// Bookkeeping record of one full ranking run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub context: ContextKey,
    pub total_battles: usize,
    pub completed_battles: usize,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(context: ContextKey, total_battles: usize) -> Self {
        Self {
            id: crate::utils::generate_session_id(),
            context,
            total_battles,
            completed_battles: 0,
            created_at: crate::utils::current_timestamp(),
            completed_at: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed_battles >= self.total_battles
    }

    /// Fraction of completed battles; an empty session counts as done
    pub fn progress(&self) -> f64 {
        if self.total_battles == 0 {
            return 1.0;
        }
        self.completed_battles as f64 / self.total_battles as f64
    }
}

/// Aggregate statistics for one rating context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextStatistics {
    pub item_count: usize,
    pub total_battles: u64,
    pub average_rating: f64,
}

/// Well-known ranking scopes and their context keys.
///
/// The engine itself only sees the composed keys; this enum exists so
/// callers compose them consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankingScope {
    ArtistAlbums,
    ArtistSongs,
    AlbumSongs,
    AllSongs,
}

impl RankingScope {
    /// Compose the context key for this scope and an optional scope id
    pub fn context_key(&self, scope_id: Option<&str>) -> ContextKey {
        let id = scope_id.unwrap_or_default();
        match self {
            RankingScope::ArtistAlbums => format!("artist_albums:{id}"),
            RankingScope::ArtistSongs => format!("artist_songs:{id}"),
            RankingScope::AlbumSongs => format!("album_songs:{id}"),
            RankingScope::AllSongs => "global_songs".to_string(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RankingScope::ArtistAlbums => "Artist Albums",
            RankingScope::ArtistSongs => "Artist Songs",
            RankingScope::AlbumSongs => "Album Songs",
            RankingScope::AllSongs => "All Songs",
        }
    }
}
