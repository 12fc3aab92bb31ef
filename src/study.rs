//! Study-mode reveal/lock progression.
//!
//! ```text
//! Default -> Transparent   (tap; session only, nothing persisted)
//! Transparent -> Locked    (tap; isLocked = true on every member)
//! Locked -> Default        (tap; isLocked = false on every member)
//! ```
//!
//! A group moves as one unit: tapping any member drives all of them. The
//! transparency map lives here and is never written to storage; the lock
//! flag lives on the markers and goes through the editor.

use crate::editor::MarkerEditor;
use crate::error::Rejection;
use crate::types::GroupId;
use std::collections::HashSet;
use tracing::debug;

/// Visible state of a marker or group during review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Default,
    Transparent,
    Locked,
}

/// Key for session transparency: the group when grouped, else the marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RevealKey {
    Group(GroupId),
    Marker(usize),
}

#[derive(Debug, Default)]
pub struct StudyMachine {
    transparent: HashSet<RevealKey>,
}

impl StudyMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, editor: &MarkerEditor, index: usize) -> Option<RevealState> {
        let marker = editor.marker(index)?;
        let unit = editor.groups().unit_of(index);
        let locked = unit
            .iter()
            .filter_map(|&i| editor.marker(i))
            .any(|m| m.is_locked());
        if locked {
            return Some(RevealState::Locked);
        }
        let key = match marker.group() {
            Some(id) => RevealKey::Group(id.clone()),
            None => RevealKey::Marker(index),
        };
        if self.transparent.contains(&key) {
            Some(RevealState::Transparent)
        } else {
            Some(RevealState::Default)
        }
    }

    /// Advance the unit containing `index` one step and return its new state.
    pub fn tap(&mut self, editor: &mut MarkerEditor, index: usize) -> Result<RevealState, Rejection> {
        let Some(current) = self.state_of(editor, index) else {
            return Err(Rejection::OutOfRange(index));
        };
        let key = match editor.marker(index).and_then(|m| m.group()) {
            Some(id) => RevealKey::Group(id.clone()),
            None => RevealKey::Marker(index),
        };
        let next = match current {
            RevealState::Default => {
                self.transparent.insert(key);
                RevealState::Transparent
            }
            RevealState::Transparent => {
                editor.set_group_locked(index, true)?;
                self.transparent.remove(&key);
                RevealState::Locked
            }
            RevealState::Locked => {
                editor.set_group_locked(index, false)?;
                self.transparent.remove(&key);
                RevealState::Default
            }
        };
        debug!(index, ?current, ?next, "study tap");
        Ok(next)
    }

    /// Forget all session transparency. Persisted locks are untouched.
    pub fn reset_session(&mut self) {
        self.transparent.clear();
    }

    pub fn transparent_count(&self) -> usize {
        self.transparent.len()
    }
}
