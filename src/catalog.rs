//! Song catalog: the global indexed song store.
//!
//! One catalog exists per process and is shared by every session. Songs are
//! owned here exclusively; everything else (playlists, queues, cursors) refers
//! to them by [`SongId`] only.

use log::trace;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Stable song identifier.
///
/// Assigned monotonically starting at 1 and never reused within a process
/// lifetime, so a deleted id stays dead forever. Ordered numerically, which is
/// the ordering every catalog listing uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub u64);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SongId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(SongId)
    }
}

/// A catalog entry. Identity is immutable; the descriptive fields can be
/// edited in place via [`SongCatalog::update`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub genre: String,
}

/// Seed record for the JSON library format. Carries no id; the catalog
/// assigns one on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSong {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub genre: String,
}

/// Indexed store of all songs with O(1) lookup by id and free-text search.
#[derive(Debug, Clone)]
pub struct SongCatalog {
    songs: HashMap<SongId, Song>,
    next_id: u64,
}

impl Default for SongCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SongCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            songs: HashMap::new(),
            next_id: 1,
        }
    }

    /// Add a song and return its freshly assigned id. Never fails.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        artist: impl Into<String>,
        genre: impl Into<String>,
    ) -> SongId {
        let id = SongId(self.next_id);
        self.next_id += 1;
        let song = Song {
            id,
            title: title.into(),
            artist: artist.into(),
            genre: genre.into(),
        };
        trace!("cataloged song {id}: {} - {}", song.artist, song.title);
        self.songs.insert(id, song);
        id
    }

    /// O(1) lookup by id.
    #[must_use]
    pub fn get(&self, id: SongId) -> Option<&Song> {
        self.songs.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: SongId) -> bool {
        self.songs.contains_key(&id)
    }

    /// Update the descriptive fields of an existing song. Returns false when
    /// the id is unknown.
    pub fn update(
        &mut self,
        id: SongId,
        title: impl Into<String>,
        artist: impl Into<String>,
        genre: impl Into<String>,
    ) -> bool {
        match self.songs.get_mut(&id) {
            Some(song) => {
                song.title = title.into();
                song.artist = artist.into();
                song.genre = genre.into();
                true
            }
            None => false,
        }
    }

    /// Remove a song. Returns false when the id is unknown.
    ///
    /// The catalog does not cascade: after a successful delete the caller owes
    /// a purge of the id from every playlist and every session that still
    /// references it ([`crate::engine::Engine::delete_song`] honors this).
    pub fn delete(&mut self, id: SongId) -> bool {
        let removed = self.songs.remove(&id).is_some();
        if removed {
            trace!("deleted song {id} from catalog");
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Every song, ordered by ascending numeric id.
    #[must_use]
    pub fn all(&self) -> Vec<&Song> {
        let mut songs: Vec<&Song> = self.songs.values().collect();
        songs.sort_by_key(|song| song.id);
        songs
    }

    /// Free-text search: case-insensitive substring match against title,
    /// artist or genre, or an exact match against the id. A blank query
    /// returns the full catalog. Results are ordered by ascending id and
    /// never contain a song twice.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Song> {
        let query = query.trim();
        if query.is_empty() {
            return self.all();
        }
        let needle = query.to_lowercase();

        let mut hits: Vec<&Song> = self
            .songs
            .par_iter()
            .map(|(_, song)| song)
            .filter(|song| song_matches(song, &needle))
            .collect();
        hits.sort_by_key(|song| song.id);
        hits
    }

    /// Import seed records, assigning fresh ids. Returns how many were added.
    pub fn import(&mut self, seeds: impl IntoIterator<Item = SeedSong>) -> usize {
        let mut added = 0;
        for seed in seeds {
            self.add(seed.title, seed.artist, seed.genre);
            added += 1;
        }
        added
    }
}

fn song_matches(song: &Song, needle: &str) -> bool {
    song.title.to_lowercase().contains(needle)
        || song.artist.to_lowercase().contains(needle)
        || song.genre.to_lowercase().contains(needle)
        || needle == song.id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> SongCatalog {
        let mut catalog = SongCatalog::new();
        catalog.add("Hymn for the Morning", "Coldwave", "Pop");
        catalog.add("Rhapsody in Grey", "Quartz", "Rock");
        catalog.add("Happier Later", "Billie Crest", "Pop");
        catalog
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut catalog = sample_catalog();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.delete(SongId(3)));
        let id = catalog.add("New Song", "Someone", "Jazz");
        assert_eq!(id, SongId(4), "deleted ids must not be recycled");
    }

    #[test]
    fn a_fresh_catalog_is_empty() {
        let catalog = SongCatalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.all().is_empty());
    }

    #[test]
    fn get_update_delete_roundtrip() {
        let mut catalog = sample_catalog();
        assert_eq!(catalog.get(SongId(2)).map(|s| s.artist.as_str()), Some("Quartz"));

        assert!(catalog.update(SongId(2), "Rhapsody in Blue", "Quartz", "Jazz"));
        assert_eq!(catalog.get(SongId(2)).map(|s| s.genre.as_str()), Some("Jazz"));

        assert!(!catalog.update(SongId(99), "x", "y", "z"));
        assert!(catalog.delete(SongId(2)));
        assert!(!catalog.delete(SongId(2)));
        assert!(catalog.get(SongId(2)).is_none());
    }

    #[test]
    fn all_is_ordered_by_numeric_id() {
        let catalog = sample_catalog();
        let ids: Vec<SongId> = catalog.all().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SongId(1), SongId(2), SongId(3)]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let catalog = sample_catalog();

        let by_title: Vec<SongId> = catalog.search("hymn").iter().map(|s| s.id).collect();
        assert_eq!(by_title, vec![SongId(1)]);

        let by_artist: Vec<SongId> = catalog.search("QUARTZ").iter().map(|s| s.id).collect();
        assert_eq!(by_artist, vec![SongId(2)]);

        let by_genre: Vec<SongId> = catalog.search("pop").iter().map(|s| s.id).collect();
        assert_eq!(by_genre, vec![SongId(1), SongId(3)]);
    }

    #[test]
    fn search_matches_exact_id() {
        let catalog = sample_catalog();
        let hits: Vec<SongId> = catalog.search("2").iter().map(|s| s.id).collect();
        assert_eq!(hits, vec![SongId(2)]);
    }

    #[test]
    fn search_never_duplicates_a_song() {
        let mut catalog = SongCatalog::new();
        // "pop" matches the title, the artist and the genre of this one.
        catalog.add("Pop Anthem", "Pop Collective", "Pop");
        assert_eq!(catalog.search("pop").len(), 1);
    }

    #[test]
    fn blank_query_returns_everything() {
        let catalog = sample_catalog();
        assert_eq!(catalog.search("").len(), 3);
        assert_eq!(catalog.search("   ").len(), 3);
    }

    #[test]
    fn import_assigns_ascending_ids() {
        let mut catalog = SongCatalog::new();
        let seeds = vec![
            SeedSong {
                title: "One".into(),
                artist: "A".into(),
                genre: "Pop".into(),
            },
            SeedSong {
                title: "Two".into(),
                artist: "B".into(),
                genre: "Rock".into(),
            },
        ];
        assert_eq!(catalog.import(seeds), 2);
        let ids: Vec<SongId> = catalog.all().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SongId(1), SongId(2)]);
    }
}
