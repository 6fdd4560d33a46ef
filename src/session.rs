//! Per-user playback state.

use crate::catalog::SongId;
use crate::playlist::NodeId;
use std::collections::VecDeque;

/// The source currently driving playback.
///
/// Exactly one variant is active at a time, which makes the mutual exclusion
/// between browse queues and playlist anchors structural instead of a
/// set-these-fields-together convention. The explicit queue is not a variant:
/// it coexists with any source and pre-empts all of them on advance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Source {
    /// Nothing queued up beyond the explicit queue.
    #[default]
    Idle,
    /// A search/browse snapshot with a movable cursor. Also serves as the
    /// similarity-history log: recommended songs are appended here.
    Linear { queue: Vec<SongId>, index: usize },
    /// A node anchor into one of the user's named playlists.
    Playlist { name: String, node: NodeId },
}

/// Mutable playback state for one user session.
///
/// Created at first login and kept for the process lifetime unless the
/// owner tears it down explicitly.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSession {
    /// What is playing right now, if anything.
    pub current: Option<SongId>,
    /// FIFO of songs the user asked to play next. Highest priority.
    pub explicit: VecDeque<SongId>,
    pub source: Source,
}

impl PlaybackSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now_playing(&self) -> Option<SongId> {
        self.current
    }

    /// Arm a browse queue with its cursor on `index`, replacing whatever
    /// source was active and flushing the explicit queue.
    pub fn arm_linear(&mut self, queue: Vec<SongId>, index: usize) {
        self.current = queue.get(index).copied();
        self.explicit.clear();
        self.source = Source::Linear { queue, index };
    }

    /// Anchor playback on a playlist node, replacing whatever source was
    /// active and flushing the explicit queue.
    pub fn arm_playlist(&mut self, name: String, node: NodeId, song: SongId) {
        self.current = Some(song);
        self.explicit.clear();
        self.source = Source::Playlist { name, node };
    }

    /// Append to the explicit queue. When nothing is playing, the front of
    /// the queue starts immediately and every other source is dropped;
    /// returns true in exactly that case.
    pub fn enqueue(&mut self, song: SongId) -> bool {
        self.explicit.push_back(song);
        if self.current.is_none() {
            self.current = self.explicit.pop_front();
            self.source = Source::Idle;
            return true;
        }
        false
    }

    /// Full stop: clears the current song, both queues and the source.
    pub fn reset(&mut self) {
        self.current = None;
        self.explicit.clear();
        self.source = Source::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_on_silence_starts_playback() {
        let mut session = PlaybackSession::new();
        assert!(session.enqueue(SongId(5)));
        assert_eq!(session.current, Some(SongId(5)));
        assert!(session.explicit.is_empty());
        assert_eq!(session.source, Source::Idle);
    }

    #[test]
    fn enqueue_while_playing_only_queues() {
        let mut session = PlaybackSession::new();
        session.arm_linear(vec![SongId(1), SongId(2)], 0);
        assert!(!session.enqueue(SongId(5)));
        assert_eq!(session.current, Some(SongId(1)));
        assert_eq!(session.explicit, VecDeque::from(vec![SongId(5)]));
    }

    #[test]
    fn arming_a_source_flushes_the_explicit_queue() {
        let mut session = PlaybackSession::new();
        session.arm_linear(vec![SongId(1)], 0);
        session.enqueue(SongId(9));
        session.arm_linear(vec![SongId(2), SongId(3)], 1);
        assert!(session.explicit.is_empty());
        assert_eq!(session.current, Some(SongId(3)));
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = PlaybackSession::new();
        session.arm_linear(vec![SongId(1), SongId(2)], 0);
        session.enqueue(SongId(9));
        session.reset();
        assert!(session.current.is_none());
        assert!(session.explicit.is_empty());
        assert_eq!(session.source, Source::Idle);
    }
}
