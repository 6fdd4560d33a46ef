//! Cross-source queue resolution: the state machine that decides what plays
//! next (or previous) for a session.
//!
//! Sources are consulted in strict priority order on advance: the explicit
//! queue, then the linear browse queue, then the active playlist chain, then
//! the similarity recommender. Retreat walks the linear queue or playlist
//! backwards and repeats the first element at either start. When nothing
//! matches, playback degrades to a full stop rather than an error.

use crate::catalog::{SongCatalog, SongId};
use crate::playlist::PlaylistSequence;
use crate::session::{PlaybackSession, Source};
use crate::similar::{self, ScoringWeights};
use log::debug;
use std::collections::BTreeMap;

/// Resolve one "advance" request. Returns the new current song, or `None`
/// when this call produced no song.
///
/// Two distinct situations return `None`: a playlist running off its tail
/// (the source is dropped but the current song is kept, so the *next* call
/// reaches the recommender) and the full stop (no source matched or the
/// recommender came up empty, everything cleared).
pub fn advance(
    session: &mut PlaybackSession,
    playlists: &BTreeMap<String, PlaylistSequence>,
    catalog: &SongCatalog,
    weights: &ScoringWeights,
) -> Option<SongId> {
    // 1. Explicit requests interrupt and replace any other source.
    if let Some(song) = session.explicit.pop_front() {
        debug!("advance: explicit queue yields {song}");
        session.source = Source::Idle;
        session.current = Some(song);
        return Some(song);
    }

    // 2. Walk the linear queue while it has room ahead of the cursor.
    if let Source::Linear { queue, index } = &mut session.source {
        if *index + 1 < queue.len() {
            *index += 1;
            let song = queue[*index];
            debug!("advance: linear queue moves to {}/{}", *index + 1, queue.len());
            session.current = Some(song);
            return Some(song);
        }
    }

    // 3. Follow the playlist chain; at the tail the source is dropped but the
    //    current song stays, so the recommender takes over next call.
    if let Source::Playlist { name, node } = session.source.clone() {
        let successor = playlists
            .get(&name)
            .and_then(|playlist| Some((playlist, playlist.next(node)?)));
        match successor.and_then(|(playlist, next)| Some((next, playlist.song_at(next)?))) {
            Some((next, song)) => {
                debug!("advance: playlist '{name}' moves to {song}");
                session.source = Source::Playlist { name, node: next };
                session.current = Some(song);
                return Some(song);
            }
            None => {
                debug!("advance: playlist '{name}' exhausted");
                session.source = Source::Idle;
                return None;
            }
        }
    }

    // 4. Similarity fallback, recording the pick into the linear history.
    if let Some(current) = session.current {
        let played = match &session.source {
            Source::Linear { queue, .. } => queue.clone(),
            _ => Vec::new(),
        };
        if let Some(pick) = similar::recommend(catalog, current, &played, weights) {
            debug!("advance: recommender follows {current} with {pick}");
            match &mut session.source {
                Source::Linear { queue, index } => {
                    queue.push(pick);
                    *index = queue.len() - 1;
                }
                _ => {
                    session.source = Source::Linear {
                        queue: vec![pick],
                        index: 0,
                    };
                }
            }
            session.current = Some(pick);
            return Some(pick);
        }
    }

    debug!("advance: nothing left to play, stopping");
    session.reset();
    None
}

/// Resolve one "retreat" request. Returns the new current song, or `None`
/// after the full-stop fallthrough.
pub fn retreat(
    session: &mut PlaybackSession,
    playlists: &BTreeMap<String, PlaylistSequence>,
) -> Option<SongId> {
    // 1. Step the linear cursor back.
    if let Source::Linear { queue, index } = &mut session.source {
        if !queue.is_empty() && *index > 0 {
            *index -= 1;
            let song = queue[*index];
            session.current = Some(song);
            return Some(song);
        }
    }

    // 2. Step back through the playlist; at the head, repeat the same song.
    if let Source::Playlist { name, node } = session.source.clone() {
        if let Some(playlist) = playlists.get(&name) {
            if let Some(prev) = playlist.prev(node) {
                if let Some(song) = playlist.song_at(prev) {
                    session.source = Source::Playlist { name, node: prev };
                    session.current = Some(song);
                    return Some(song);
                }
            } else if let Some(song) = playlist.song_at(node) {
                session.current = Some(song);
                return Some(song);
            }
        }
        // Playlist or node gone out from under us: fall through to the stop.
    } else if let Source::Linear { queue, index } = &session.source {
        // 3. At the very start of a browse queue, repeat element 0.
        if !queue.is_empty() && *index == 0 {
            let song = queue[0];
            session.current = Some(song);
            return Some(song);
        }
    }

    debug!("retreat: nothing to step back to, stopping");
    session.reset();
    None
}
