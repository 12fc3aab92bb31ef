//! Bounded snapshot history.
//!
//! Each entry is the full marker list as it was before a structural
//! mutation. The stack only moves backwards: popping never pushes, so there
//! is no redo.

use crate::constants::MAX_UNDO_DEPTH;
use crate::types::{ImageId, Marker};
use std::collections::VecDeque;

/// A marker list snapshot taken before a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub image_id: ImageId,
    pub prior_markers: Vec<Marker>,
}

/// FIFO-evicting stack of [`UndoEntry`] values.
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<UndoEntry>,
    depth: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(MAX_UNDO_DEPTH)
    }
}

impl UndoStack {
    pub fn new(depth: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(depth + 1),
            depth: depth.max(1),
        }
    }

    /// Record a snapshot, dropping the oldest entry once over depth.
    pub fn push(&mut self, image_id: ImageId, snapshot: Vec<Marker>) {
        self.entries.push_back(UndoEntry {
            image_id,
            prior_markers: snapshot,
        });
        while self.entries.len() > self.depth {
            self.entries.pop_front();
        }
    }

    /// Remove and return the most recent snapshot, if any.
    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop_back()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
