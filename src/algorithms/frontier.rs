//! Open and closed collections for the strategies that keep a global
//! frontier.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::cost::Cost;
use crate::movement::Position;
use crate::search::SearchTreeIndex;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpenEntry {
    pub key: Cost,
    pub node_index: SearchTreeIndex,
    pub position: Position,
}

/// Nodes pending expansion, always sorted by `key`.
///
/// Equal keys keep their insertion order.
#[derive(Debug, Default)]
pub struct OpenList {
    entries: VecDeque<OpenEntry>,
}

impl OpenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts after every entry with a key lower or equal to `entry.key`.
    ///
    /// Returns where it landed.
    pub fn insert(&mut self, entry: OpenEntry) -> usize {
        let i = self.entries.partition_point(|e| e.key <= entry.key);
        self.entries.insert(i, entry);
        self.verify();
        i
    }

    pub fn pop(&mut self) -> Option<OpenEntry> {
        let entry = self.entries.pop_front();
        self.verify();
        entry
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpenEntry> {
        self.entries.iter()
    }

    pub fn is_sorted(&self) -> bool {
        self.entries
            .iter()
            .zip(self.entries.iter().skip(1))
            .all(|(a, b)| a.key <= b.key)
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify(&self) {
        // All good... (hopefully)
    }
    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify(&self) {
        assert!(self.is_sorted(), "Open list is out of order: {self:?}");
    }
}

/// An `OpenList` plus the closed set, with position-based duplicate
/// detection across both.
#[derive(Debug, Default)]
pub struct Frontier {
    open: OpenList,
    /// Positions currently in `open`.
    pending: FxHashSet<Position>,
    closed: FxHashSet<Position>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: Cost, node_index: SearchTreeIndex, position: Position) {
        debug_assert!(!self.seen(&position), "{position} is already known");
        self.pending.insert(position);
        self.open.insert(OpenEntry {
            key,
            node_index,
            position,
        });
    }

    /// Takes the best pending node out of the open list.
    pub fn pop(&mut self) -> Option<OpenEntry> {
        let entry = self.open.pop()?;
        self.pending.remove(&entry.position);
        Some(entry)
    }

    /// Closes `position` for the rest of the run.
    pub fn close(&mut self, position: Position) {
        self.closed.insert(position);
    }

    /// Whether `position` is pending or already expanded.
    #[inline(always)]
    pub fn seen(&self, position: &Position) -> bool {
        self.pending.contains(position) || self.closed.contains(position)
    }

    pub fn is_closed(&self, position: &Position) -> bool {
        self.closed.contains(position)
    }

    pub fn open(&self) -> &OpenList {
        &self.open
    }
}
