//! Media library collaborator boundary
//!
//! The engine only ever consumes a finished list of [`RankableItem`]s; how
//! that list is obtained (device library, streaming catalog, test fixture)
//! lives behind this trait. [`StaticMediaLibrary`] is the in-memory
//! implementation used by the simulator and tests.

use crate::types::{ItemId, ItemKind, RankableItem};

/// Source of rankable items
pub trait MediaLibrary: Send + Sync {
    /// All albums known to the library
    fn albums(&self) -> Vec<RankableItem>;

    /// All songs known to the library
    fn songs(&self) -> Vec<RankableItem>;

    /// Songs belonging to one album
    fn songs_in_album(&self, album_id: &ItemId) -> Vec<RankableItem>;
}

/// Fixed in-memory library
#[derive(Debug, Default)]
pub struct StaticMediaLibrary {
    albums: Vec<RankableItem>,
    songs: Vec<(Option<ItemId>, RankableItem)>,
}

impl StaticMediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_album(&mut self, album: RankableItem) -> &mut Self {
        debug_assert_eq!(album.kind, ItemKind::Album);
        self.albums.push(album);
        self
    }

    /// Add a song, optionally attached to an album already in the library
    pub fn add_song(&mut self, song: RankableItem, album_id: Option<ItemId>) -> &mut Self {
        debug_assert_eq!(song.kind, ItemKind::Song);
        self.songs.push((album_id, song));
        self
    }
}

impl MediaLibrary for StaticMediaLibrary {
    fn albums(&self) -> Vec<RankableItem> {
        self.albums.clone()
    }

    fn songs(&self) -> Vec<RankableItem> {
        self.songs.iter().map(|(_, song)| song.clone()).collect()
    }

    fn songs_in_album(&self, album_id: &ItemId) -> Vec<RankableItem> {
        self.songs
            .iter()
            .filter(|(album, _)| album.as_ref() == Some(album_id))
            .map(|(_, song)| song.clone())
            .collect()
    }
}
