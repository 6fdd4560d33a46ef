//! Similarity scoring: picks the next song once every explicit ordering is
//! exhausted.
//!
//! The score is a small integer computed from genre and artist equality with
//! the song that just played. Deliberately sequential: the tie-break is
//! defined in catalog iteration order (ascending id), so the candidate walk
//! must stay ordered.

use crate::catalog::{Song, SongCatalog, SongId};
use log::trace;
use std::collections::HashSet;

/// Integer weights for the similarity score.
///
/// Genre outweighs artist so that a same-genre song from a different artist
/// beats a same-artist song from a different genre.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub genre_match: i32,
    pub artist_match: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            genre_match: 3,
            artist_match: 2,
        }
    }
}

impl ScoringWeights {
    /// Score `candidate` against `current`: genre and artist are compared
    /// case-insensitively, each contributing its weight on an exact match.
    #[must_use]
    pub fn score(&self, current: &Song, candidate: &Song) -> i32 {
        let mut score = 0;
        if candidate.genre.to_lowercase() == current.genre.to_lowercase() {
            score += self.genre_match;
        }
        if candidate.artist.to_lowercase() == current.artist.to_lowercase() {
            score += self.artist_match;
        }
        score
    }
}

/// The most similar not-yet-played song, or `None` when the catalog offers
/// nothing at all.
///
/// Candidates are the catalog songs absent from `played`; when everything has
/// been played, every song except `current` itself becomes a candidate again.
/// The strictly highest score wins, with the lower numeric id preferred on
/// ties. When not even the best candidate shares a genre or an artist with
/// `current` (best score ≤ 0), scoring is ignored entirely and the
/// lowest-numbered candidate is returned instead.
#[must_use]
pub fn recommend(
    catalog: &SongCatalog,
    current: SongId,
    played: &[SongId],
    weights: &ScoringWeights,
) -> Option<SongId> {
    let current_song = catalog.get(current)?;
    let all = catalog.all();
    let played: HashSet<SongId> = played.iter().copied().collect();

    // Ascending id order, inherited from `all()`.
    let mut candidates: Vec<&Song> = all
        .iter()
        .copied()
        .filter(|song| !played.contains(&song.id))
        .collect();
    if candidates.is_empty() {
        candidates = all.into_iter().filter(|song| song.id != current).collect();
        if candidates.is_empty() {
            return None;
        }
    }

    let mut best: Option<(SongId, i32)> = None;
    for song in &candidates {
        let score = weights.score(current_song, song);
        best = match best {
            None => Some((song.id, score)),
            Some((_, max)) if score > max => Some((song.id, score)),
            Some((id, max)) if score == max && song.id < id => Some((song.id, score)),
            keep => keep,
        };
    }

    let (best_id, max_score) = best?;
    if max_score <= 0 {
        // No genre or artist overlap anywhere: fall back to the
        // lowest-numbered candidate regardless of scoring.
        return candidates.iter().map(|song| song.id).min();
    }
    trace!("recommending {best_id} after {current} (score {max_score})");
    Some(best_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SongCatalog {
        let mut catalog = SongCatalog::new();
        catalog.add("A", "X", "Pop"); // 1
        catalog.add("B", "Y", "Pop"); // 2
        catalog.add("C", "X", "Rock"); // 3
        catalog
    }

    #[test]
    fn genre_match_beats_artist_match() {
        let catalog = catalog();
        // B shares A's genre (3), C shares A's artist (2): B wins.
        let pick = recommend(&catalog, SongId(1), &[], &ScoringWeights::default());
        assert_eq!(pick, Some(SongId(2)));
    }

    #[test]
    fn equal_scores_prefer_the_lower_id() {
        let mut catalog = SongCatalog::new();
        catalog.add("Seed", "X", "Pop"); // 1
        catalog.add("Twin A", "Y", "Pop"); // 2, genre match
        catalog.add("Twin B", "Z", "Pop"); // 3, genre match
        let pick = recommend(&catalog, SongId(1), &[SongId(1)], &ScoringWeights::default());
        assert_eq!(pick, Some(SongId(2)));
    }

    #[test]
    fn zero_score_falls_back_to_lowest_unplayed_id() {
        let mut catalog = SongCatalog::new();
        catalog.add("Seed", "X", "Pop"); // 1
        catalog.add("Far", "Q", "Jazz"); // 2
        catalog.add("Away", "R", "Metal"); // 3
        let pick = recommend(
            &catalog,
            SongId(1),
            &[SongId(1), SongId(3)],
            &ScoringWeights::default(),
        );
        // Only song 2 is unplayed; it scores 0 and is still returned.
        assert_eq!(pick, Some(SongId(2)));

        let pick = recommend(&catalog, SongId(1), &[SongId(1)], &ScoringWeights::default());
        // Songs 2 and 3 both score 0: lowest id wins, not map order.
        assert_eq!(pick, Some(SongId(2)));
    }

    #[test]
    fn everything_played_reopens_all_but_current() {
        let catalog = catalog();
        let played = vec![SongId(1), SongId(2), SongId(3)];
        let pick = recommend(&catalog, SongId(1), &played, &ScoringWeights::default());
        // B and C come back as candidates, A itself does not.
        assert_eq!(pick, Some(SongId(2)));
    }

    #[test]
    fn lone_song_catalog_recommends_nothing_once_played() {
        let mut catalog = SongCatalog::new();
        catalog.add("Only", "X", "Pop"); // 1
        let pick = recommend(&catalog, SongId(1), &[SongId(1)], &ScoringWeights::default());
        assert_eq!(pick, None);
    }

    #[test]
    fn current_song_is_its_own_best_match_until_played() {
        let mut catalog = SongCatalog::new();
        catalog.add("Loop", "X", "Pop"); // 1
        catalog.add("Other", "Y", "Jazz"); // 2
        // Nothing recorded as played yet, so the current song is still a
        // candidate and matches itself on both genre and artist.
        let pick = recommend(&catalog, SongId(1), &[], &ScoringWeights::default());
        assert_eq!(pick, Some(SongId(1)));
    }

    #[test]
    fn unknown_current_song_yields_nothing() {
        let catalog = catalog();
        let pick = recommend(&catalog, SongId(42), &[], &ScoringWeights::default());
        assert_eq!(pick, None);
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let catalog = SongCatalog::new();
        let pick = recommend(&catalog, SongId(1), &[], &ScoringWeights::default());
        assert_eq!(pick, None);
    }
}
