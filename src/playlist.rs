//! Playlist sequences: ordered, duplicate-free chains of song references.
//!
//! A [`PlaylistSequence`] is a doubly linked chain stored in a slot arena.
//! Links are slot indices, never references, and handles handed out to
//! callers ([`NodeId`]) carry a generation so that a handle to a removed
//! node resolves to `None` even if its slot has been reused since.

use crate::catalog::SongId;
use log::trace;

/// Handle to a node inside one [`PlaylistSequence`].
///
/// Only meaningful for the sequence that produced it. Stale handles (the node
/// was removed, with or without slot reuse) resolve to `None` everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    slot: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Node {
    song: SongId,
    generation: u32,
    prev: Option<u32>,
    next: Option<u32>,
}

#[derive(Debug, Clone)]
enum Slot {
    Occupied(Node),
    Vacant { generation: u32 },
}

/// An ordered, duplicate-free sequence of song ids with bidirectional
/// node-anchored traversal.
///
/// Invariants: no two nodes share a song id, the chain is acyclic, the head
/// has no predecessor and the tail no successor, and `len` counts exactly the
/// live nodes.
#[derive(Debug, Clone, Default)]
pub struct PlaylistSequence {
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

impl PlaylistSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the sequence holds `song`. O(len).
    #[must_use]
    pub fn contains(&self, song: SongId) -> bool {
        self.iter().any(|s| s == song)
    }

    /// Append `song` at the tail. Returns false (and leaves the sequence
    /// untouched) when the song is already present.
    pub fn add(&mut self, song: SongId) -> bool {
        if self.contains(song) {
            return false;
        }
        let prev = self.tail;
        let slot = self.alloc(song, prev, None);
        match prev {
            Some(tail) => self.set_next(tail, Some(slot)),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
        true
    }

    /// Insert `song` at the head. Same duplicate rule as [`Self::add`].
    pub fn add_front(&mut self, song: SongId) -> bool {
        if self.contains(song) {
            return false;
        }
        let next = self.head;
        let slot = self.alloc(song, None, next);
        match next {
            Some(head) => self.set_prev(head, Some(slot)),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
        self.len += 1;
        true
    }

    /// Unlink every node holding `song` and return how many were removed.
    ///
    /// The duplicate-free invariant means at most one in practice, but the
    /// operation is defined generally. Removing an absent song returns 0 and
    /// changes nothing.
    pub fn remove_all(&mut self, song: SongId) -> usize {
        let mut removed = 0;
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let (next, hit) = match self.node(slot) {
                Some(node) => (node.next, node.song == song),
                None => break,
            };
            if hit {
                self.unlink(slot);
                removed += 1;
            }
            cursor = next;
        }
        if removed > 0 {
            trace!("removed {removed} node(s) for song {song}");
        }
        removed
    }

    /// Song ids in order, head to tail.
    #[must_use]
    pub fn song_ids(&self) -> Vec<SongId> {
        self.iter().collect()
    }

    /// The first (only) node holding `song`, if any.
    #[must_use]
    pub fn find_node(&self, song: SongId) -> Option<NodeId> {
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let node = self.node(slot)?;
            if node.song == song {
                return Some(NodeId {
                    slot,
                    generation: node.generation,
                });
            }
            cursor = node.next;
        }
        None
    }

    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.handle(self.head?)
    }

    #[must_use]
    pub fn tail(&self) -> Option<NodeId> {
        self.handle(self.tail?)
    }

    /// The node after `id`, or `None` at the tail or for a stale handle.
    #[must_use]
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.handle(self.resolve(id)?.next?)
    }

    /// The node before `id`, or `None` at the head or for a stale handle.
    #[must_use]
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.handle(self.resolve(id)?.prev?)
    }

    /// The song a live handle points at. `None` for stale handles.
    #[must_use]
    pub fn song_at(&self, id: NodeId) -> Option<SongId> {
        Some(self.resolve(id)?.song)
    }

    /// Iterate song ids head to tail.
    pub fn iter(&self) -> impl Iterator<Item = SongId> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.node(cursor?)?;
            cursor = node.next;
            Some(node.song)
        })
    }

    fn node(&self, slot: u32) -> Option<&Node> {
        match self.slots.get(slot as usize) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    fn resolve(&self, id: NodeId) -> Option<&Node> {
        self.node(id.slot).filter(|node| node.generation == id.generation)
    }

    fn handle(&self, slot: u32) -> Option<NodeId> {
        self.node(slot).map(|node| NodeId {
            slot,
            generation: node.generation,
        })
    }

    fn set_next(&mut self, slot: u32, next: Option<u32>) {
        if let Some(Slot::Occupied(node)) = self.slots.get_mut(slot as usize) {
            node.next = next;
        }
    }

    fn set_prev(&mut self, slot: u32, prev: Option<u32>) {
        if let Some(Slot::Occupied(node)) = self.slots.get_mut(slot as usize) {
            node.prev = prev;
        }
    }

    fn alloc(&mut self, song: SongId, prev: Option<u32>, next: Option<u32>) -> u32 {
        if let Some(slot) = self.free.pop() {
            if let Some(Slot::Vacant { generation }) = self.slots.get(slot as usize).cloned() {
                self.slots[slot as usize] = Slot::Occupied(Node {
                    song,
                    generation,
                    prev,
                    next,
                });
                return slot;
            }
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot::Occupied(Node {
            song,
            generation: 0,
            prev,
            next,
        }));
        slot
    }

    fn unlink(&mut self, slot: u32) {
        let (prev, next, generation) = match self.node(slot) {
            Some(node) => (node.prev, node.next, node.generation),
            None => return,
        };
        match prev {
            Some(p) => self.set_next(p, next),
            None => self.head = next,
        }
        match next {
            Some(n) => self.set_prev(n, prev),
            None => self.tail = prev,
        }
        // Bump the generation so outstanding handles to this node go stale.
        self.slots[slot as usize] = Slot::Vacant {
            generation: generation.wrapping_add(1),
        };
        self.free.push(slot);
        self.len -= 1;
    }
}
