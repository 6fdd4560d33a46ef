//! The process-wide playback engine: one shared catalog, one session table.
//!
//! This is the surface the presentation layer (CLI shell, or any other thin
//! I/O wrapper) talks to. Every entry point maps onto a catalog, playlist or
//! resolver operation and honors the cascade contracts between them - most
//! importantly that deleting a song purges it from every playlist and stops
//! every session that was playing it.
//!
//! Locking model: the catalog sits behind a read/write lock because deletes
//! must be observed consistently by every session's cleanup; each user's
//! state has its own mutex, and sessions never contend with one another.
//! Lock order is always catalog before user state.

use crate::catalog::{SeedSong, Song, SongCatalog, SongId};
use crate::playlist::PlaylistSequence;
use crate::resolver;
use crate::session::{PlaybackSession, Source};
use crate::similar::ScoringWeights;
use log::{debug, info};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError, RwLock};

/// Playlists and playback state for one user.
#[derive(Debug, Default)]
pub struct UserState {
    pub playlists: BTreeMap<String, PlaylistSequence>,
    pub session: PlaybackSession,
}

/// Outcome of an [`Engine::enqueue`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// Nothing was playing; the song started immediately.
    Started,
    /// The song joined the back of the explicit queue.
    Queued,
}

/// The engine. Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug, Default)]
pub struct Engine {
    catalog: RwLock<SongCatalog>,
    users: RwLock<HashMap<String, Mutex<UserState>>>,
    weights: ScoringWeights,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with custom similarity weights.
    #[must_use]
    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self {
            weights,
            ..Self::default()
        }
    }

    // --- sessions ------------------------------------------------------

    /// Create the user's state on first login. Returns true when it was
    /// created by this call. Sessions have no expiry; [`Self::logout`] is
    /// the explicit teardown.
    pub fn login(&self, user: &str) -> bool {
        let mut users = write_lock(&self.users);
        if users.contains_key(user) {
            return false;
        }
        info!("creating session for '{user}'");
        users.insert(user.to_string(), Mutex::new(UserState::default()));
        true
    }

    /// Discard the user's playlists and session. Returns false for an
    /// unknown user.
    pub fn logout(&self, user: &str) -> bool {
        write_lock(&self.users).remove(user).is_some()
    }

    // --- catalog administration ---------------------------------------

    pub fn add_song(
        &self,
        title: impl Into<String>,
        artist: impl Into<String>,
        genre: impl Into<String>,
    ) -> SongId {
        write_lock(&self.catalog).add(title, artist, genre)
    }

    pub fn update_song(
        &self,
        id: SongId,
        title: impl Into<String>,
        artist: impl Into<String>,
        genre: impl Into<String>,
    ) -> bool {
        write_lock(&self.catalog).update(id, title, artist, genre)
    }

    /// Delete a song and run the cascade the catalog contract demands:
    /// purge the id from every playlist of every user, and fully stop any
    /// session whose current song was the deleted one. Linear and explicit
    /// queues are left alone; a dead id in them resolves to nothing at
    /// display time.
    pub fn delete_song(&self, id: SongId) -> bool {
        {
            let mut catalog = write_lock(&self.catalog);
            if !catalog.delete(id) {
                return false;
            }
        }
        let users = read_lock(&self.users);
        for (name, state) in users.iter() {
            let mut state = lock(state);
            for playlist in state.playlists.values_mut() {
                playlist.remove_all(id);
            }
            if state.session.current == Some(id) {
                debug!("stopping '{name}': current song {id} was deleted");
                state.session.reset();
            }
        }
        true
    }

    #[must_use]
    pub fn get_song(&self, id: SongId) -> Option<Song> {
        read_lock(&self.catalog).get(id).cloned()
    }

    #[must_use]
    pub fn all_songs(&self) -> Vec<Song> {
        read_lock(&self.catalog).all().into_iter().cloned().collect()
    }

    #[must_use]
    pub fn search_songs(&self, query: &str) -> Vec<Song> {
        read_lock(&self.catalog)
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Bulk-load seed records (the JSON library format). Returns how many
    /// songs were added.
    pub fn import_songs(&self, seeds: impl IntoIterator<Item = SeedSong>) -> usize {
        write_lock(&self.catalog).import(seeds)
    }

    // --- playlist management ------------------------------------------

    /// Create an empty playlist. The name must be non-blank and unused for
    /// this user.
    pub fn create_playlist(&self, user: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.with_user(user, |state| {
            if state.playlists.contains_key(name) {
                return false;
            }
            state.playlists.insert(name.to_string(), PlaylistSequence::new());
            true
        })
        .unwrap_or(false)
    }

    /// Delete a playlist. If it was the active source, playback of it stops
    /// first (the explicit queue is untouched).
    pub fn delete_playlist(&self, user: &str, name: &str) -> bool {
        self.with_user(user, |state| {
            if state.playlists.remove(name).is_none() {
                return false;
            }
            if matches!(&state.session.source, Source::Playlist { name: active, .. } if active == name)
            {
                state.session.current = None;
                state.session.source = Source::Idle;
            }
            true
        })
        .unwrap_or(false)
    }

    /// Append a catalog song to a playlist. False when the song or the
    /// playlist is unknown, or the song is already in it.
    pub fn add_to_playlist(&self, user: &str, name: &str, id: SongId) -> bool {
        let catalog = read_lock(&self.catalog);
        if !catalog.contains(id) {
            return false;
        }
        drop(catalog);
        self.with_user(user, |state| match state.playlists.get_mut(name) {
            Some(playlist) => playlist.add(id),
            None => false,
        })
        .unwrap_or(false)
    }

    /// Remove a song from a playlist, returning how many nodes went away.
    ///
    /// When the removal hits the song the user was playing from that very
    /// playlist, playback restarts from the playlist head - or stops if the
    /// playlist is now empty.
    pub fn remove_from_playlist(&self, user: &str, name: &str, id: SongId) -> usize {
        self.with_user(user, |state| {
            let Some(playlist) = state.playlists.get_mut(name) else {
                return 0;
            };
            let removed = playlist.remove_all(id);
            if removed == 0 {
                return 0;
            }

            let was_active = matches!(&state.session.source, Source::Playlist { name: active, .. } if active == name);
            if was_active && state.session.current == Some(id) {
                let restart = state.playlists.get(name).and_then(|playlist| {
                    let head = playlist.head()?;
                    Some((head, playlist.song_at(head)?))
                });
                match restart {
                    Some((node, song)) => {
                        debug!("'{user}' restarting playlist '{name}' from its head");
                        state.session.current = Some(song);
                        state.session.source = Source::Playlist {
                            name: name.to_string(),
                            node,
                        };
                    }
                    None => {
                        state.session.current = None;
                        state.session.source = Source::Idle;
                    }
                }
            }
            removed
        })
        .unwrap_or(0)
    }

    #[must_use]
    pub fn playlist_names(&self, user: &str) -> Vec<String> {
        self.with_user(user, |state| state.playlists.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn playlist_songs(&self, user: &str, name: &str) -> Option<Vec<SongId>> {
        self.with_user(user, |state| {
            state.playlists.get(name).map(PlaylistSequence::song_ids)
        })
        .flatten()
    }

    // --- playback arming ----------------------------------------------

    /// Arm the browse queue from a search ordering and start at `id`'s
    /// position in it. False when `id` is not part of that ordering.
    pub fn play_from_library(&self, user: &str, query: &str, id: SongId) -> bool {
        let ordering: Vec<SongId> = {
            let catalog = read_lock(&self.catalog);
            catalog.search(query).iter().map(|song| song.id).collect()
        };
        let Some(index) = ordering.iter().position(|&song| song == id) else {
            return false;
        };
        self.with_user(user, |state| {
            debug!("'{user}' playing {id} from a {}-song browse queue", ordering.len());
            state.session.arm_linear(ordering, index);
            true
        })
        .unwrap_or(false)
    }

    /// Anchor playback on the playlist node carrying `id`. False when the
    /// playlist or the song is not there.
    pub fn play_from_playlist(&self, user: &str, name: &str, id: SongId) -> bool {
        self.with_user(user, |state| {
            let Some(playlist) = state.playlists.get(name) else {
                return false;
            };
            let Some(node) = playlist.find_node(id) else {
                return false;
            };
            debug!("'{user}' playing {id} from playlist '{name}'");
            state.session.arm_playlist(name.to_string(), node, id);
            true
        })
        .unwrap_or(false)
    }

    /// Start a playlist from its first song. False for an unknown or empty
    /// playlist.
    pub fn play_playlist(&self, user: &str, name: &str) -> bool {
        self.with_user(user, |state| {
            let start = state.playlists.get(name).and_then(|playlist| {
                let head = playlist.head()?;
                Some((head, playlist.song_at(head)?))
            });
            match start {
                Some((node, song)) => {
                    state.session.arm_playlist(name.to_string(), node, song);
                    true
                }
                None => false,
            }
        })
        .unwrap_or(false)
    }

    /// Append a song to the explicit queue. `None` when the song or the
    /// user is unknown.
    pub fn enqueue(&self, user: &str, id: SongId) -> Option<Enqueued> {
        let catalog = read_lock(&self.catalog);
        if !catalog.contains(id) {
            return None;
        }
        drop(catalog);
        self.with_user(user, |state| {
            if state.session.enqueue(id) {
                Enqueued::Started
            } else {
                Enqueued::Queued
            }
        })
    }

    /// Pick a uniformly random catalog song and arm the full-library browse
    /// queue at its position.
    pub fn roulette(&self, user: &str) -> Option<SongId> {
        let ordering: Vec<SongId> = {
            let catalog = read_lock(&self.catalog);
            catalog.all().iter().map(|song| song.id).collect()
        };
        if ordering.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..ordering.len());
        let song = ordering[index];
        self.with_user(user, |state| {
            state.session.arm_linear(ordering, index);
            song
        })
    }

    // --- playback transitions -----------------------------------------

    /// Advance to whatever plays next. `None` means no song was produced by
    /// this call (see [`resolver::advance`]).
    pub fn advance(&self, user: &str) -> Option<SongId> {
        let catalog = read_lock(&self.catalog);
        self.with_user(user, |state| {
            resolver::advance(&mut state.session, &state.playlists, &catalog, &self.weights)
        })
        .flatten()
    }

    /// Step back to whatever played before.
    pub fn retreat(&self, user: &str) -> Option<SongId> {
        self.with_user(user, |state| {
            resolver::retreat(&mut state.session, &state.playlists)
        })
        .flatten()
    }

    /// Full reset of the user's playback state.
    pub fn stop(&self, user: &str) {
        self.with_user(user, |state| state.session.reset());
    }

    // --- read accessors for the presentation layer --------------------

    #[must_use]
    pub fn now_playing(&self, user: &str) -> Option<Song> {
        let catalog = read_lock(&self.catalog);
        let id = self.with_user(user, |state| state.session.now_playing())??;
        catalog.get(id).cloned()
    }

    /// The explicit queue resolved to songs, skipping ids deleted since they
    /// were enqueued.
    #[must_use]
    pub fn queued_songs(&self, user: &str) -> Vec<Song> {
        let catalog = read_lock(&self.catalog);
        let ids = self
            .with_user(user, |state| {
                state.session.explicit.iter().copied().collect::<Vec<_>>()
            })
            .unwrap_or_default();
        ids.into_iter()
            .filter_map(|id| catalog.get(id).cloned())
            .collect()
    }

    /// Short human-readable label for the active source.
    #[must_use]
    pub fn source_label(&self, user: &str) -> Option<String> {
        self.with_user(user, |state| match &state.session.source {
            Source::Idle if state.session.current.is_some() => "single song".to_string(),
            Source::Idle => "idle".to_string(),
            Source::Linear { queue, index } => {
                format!("browse queue {}/{}", index + 1, queue.len())
            }
            Source::Playlist { name, .. } => format!("playlist '{name}'"),
        })
    }

    fn with_user<T>(&self, user: &str, f: impl FnOnce(&mut UserState) -> T) -> Option<T> {
        let users = read_lock(&self.users);
        let state = users.get(user)?;
        let mut state = lock(state);
        Some(f(&mut state))
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_user() -> Engine {
        let engine = Engine::new();
        engine.add_song("One", "X", "Pop"); // 1
        engine.add_song("Two", "Y", "Pop"); // 2
        engine.add_song("Three", "X", "Rock"); // 3
        engine.login("ada");
        engine
    }

    #[test]
    fn login_is_idempotent_and_logout_tears_down() {
        let engine = Engine::new();
        assert!(engine.login("ada"));
        assert!(!engine.login("ada"));
        assert!(engine.logout("ada"));
        assert!(!engine.logout("ada"));
        // Operations against a logged-out user are harmless no-ops.
        assert!(engine.advance("ada").is_none());
        assert!(!engine.create_playlist("ada", "mix"));
    }

    #[test]
    fn playlist_names_must_be_nonblank_and_unused() {
        let engine = engine_with_user();
        assert!(engine.create_playlist("ada", "mix"));
        assert!(!engine.create_playlist("ada", "mix"));
        assert!(!engine.create_playlist("ada", "   "));
        assert_eq!(engine.playlist_names("ada"), vec!["mix".to_string()]);
    }

    #[test]
    fn add_to_playlist_requires_a_cataloged_song() {
        let engine = engine_with_user();
        engine.create_playlist("ada", "mix");
        assert!(engine.add_to_playlist("ada", "mix", SongId(1)));
        assert!(!engine.add_to_playlist("ada", "mix", SongId(1)), "duplicate");
        assert!(!engine.add_to_playlist("ada", "mix", SongId(99)), "unknown song");
        assert!(!engine.add_to_playlist("ada", "nope", SongId(2)), "unknown playlist");
    }

    #[test]
    fn play_from_library_rejects_ids_outside_the_ordering() {
        let engine = engine_with_user();
        // Query "pop" matches songs 1 and 2 only.
        assert!(!engine.play_from_library("ada", "pop", SongId(3)));
        assert!(engine.now_playing("ada").is_none());

        assert!(engine.play_from_library("ada", "pop", SongId(2)));
        assert_eq!(engine.now_playing("ada").map(|s| s.id), Some(SongId(2)));
    }

    #[test]
    fn enqueue_promotes_only_on_silence() {
        let engine = engine_with_user();
        assert_eq!(engine.enqueue("ada", SongId(2)), Some(Enqueued::Started));
        assert_eq!(engine.now_playing("ada").map(|s| s.id), Some(SongId(2)));

        assert_eq!(engine.enqueue("ada", SongId(3)), Some(Enqueued::Queued));
        assert_eq!(engine.now_playing("ada").map(|s| s.id), Some(SongId(2)));
        assert_eq!(engine.queued_songs("ada").len(), 1);

        assert_eq!(engine.enqueue("ada", SongId(42)), None);
    }

    #[test]
    fn deleting_a_song_cascades_into_playlists_and_sessions() {
        let engine = engine_with_user();
        engine.login("grace");
        engine.create_playlist("ada", "mix");
        engine.add_to_playlist("ada", "mix", SongId(1));
        engine.add_to_playlist("ada", "mix", SongId(2));
        engine.create_playlist("grace", "other");
        engine.add_to_playlist("grace", "other", SongId(1));

        // ada is playing song 1, grace is playing song 2.
        assert!(engine.play_from_playlist("ada", "mix", SongId(1)));
        assert!(engine.play_from_library("grace", "", SongId(2)));

        assert!(engine.delete_song(SongId(1)));

        assert_eq!(engine.playlist_songs("ada", "mix"), Some(vec![SongId(2)]));
        assert_eq!(engine.playlist_songs("grace", "other"), Some(vec![]));
        // ada's session was playing the deleted song: fully reset.
        assert!(engine.now_playing("ada").is_none());
        assert_eq!(engine.source_label("ada").as_deref(), Some("idle"));
        // grace was playing something else and is untouched.
        assert_eq!(engine.now_playing("grace").map(|s| s.id), Some(SongId(2)));
    }

    #[test]
    fn removing_the_active_current_song_restarts_from_the_head() {
        let engine = engine_with_user();
        engine.create_playlist("ada", "mix");
        engine.add_to_playlist("ada", "mix", SongId(1));
        engine.add_to_playlist("ada", "mix", SongId(2));
        engine.add_to_playlist("ada", "mix", SongId(3));
        assert!(engine.play_from_playlist("ada", "mix", SongId(2)));

        assert_eq!(engine.remove_from_playlist("ada", "mix", SongId(2)), 1);
        assert_eq!(engine.now_playing("ada").map(|s| s.id), Some(SongId(1)));
        assert_eq!(engine.source_label("ada").as_deref(), Some("playlist 'mix'"));
    }

    #[test]
    fn removing_the_last_active_song_stops_the_playlist() {
        let engine = engine_with_user();
        engine.create_playlist("ada", "solo");
        engine.add_to_playlist("ada", "solo", SongId(1));
        assert!(engine.play_playlist("ada", "solo"));

        assert_eq!(engine.remove_from_playlist("ada", "solo", SongId(1)), 1);
        assert!(engine.now_playing("ada").is_none());
        assert_eq!(engine.source_label("ada").as_deref(), Some("idle"));
    }

    #[test]
    fn deleting_the_active_playlist_stops_it_but_keeps_the_explicit_queue() {
        let engine = engine_with_user();
        engine.create_playlist("ada", "mix");
        engine.add_to_playlist("ada", "mix", SongId(1));
        engine.play_playlist("ada", "mix");
        engine.enqueue("ada", SongId(3));

        assert!(engine.delete_playlist("ada", "mix"));
        assert!(engine.now_playing("ada").is_none());
        assert_eq!(engine.queued_songs("ada").len(), 1);
        assert!(engine.playlist_names("ada").is_empty());
    }

    #[test]
    fn roulette_arms_the_full_library() {
        let engine = engine_with_user();
        let song = engine.roulette("ada");
        assert!(song.is_some());
        assert_eq!(engine.now_playing("ada").map(|s| s.id), song);
        let label = engine.source_label("ada").unwrap_or_default();
        assert!(label.starts_with("browse queue"), "got: {label}");
    }

    #[test]
    fn stop_silences_the_session() {
        let engine = engine_with_user();
        engine.play_from_library("ada", "", SongId(1));
        engine.enqueue("ada", SongId(2));
        engine.stop("ada");
        assert!(engine.now_playing("ada").is_none());
        assert!(engine.queued_songs("ada").is_empty());
        assert_eq!(engine.source_label("ada").as_deref(), Some("idle"));
    }
}
