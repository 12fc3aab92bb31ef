//! Explicit group structure maintained alongside the marker list.
//!
//! Markers only store a shared `groupId`. [`GroupIndex`] turns that into
//! `Group { id, member_indices }` once per mutation so anchor lookups and
//! cascades do not rescan the list. The anchor is always the lowest member
//! index, which also settles anchor re-election if a single anchor is ever
//! removed: the next lowest index takes over.

use crate::types::{GroupId, Marker};
use std::collections::HashMap;

/// A set of markers sharing one group id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    /// Member indices in ascending order; never empty
    pub member_indices: Vec<usize>,
}

impl Group {
    pub fn anchor(&self) -> usize {
        self.member_indices[0]
    }

    pub fn len(&self) -> usize {
        self.member_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.member_indices.binary_search(&index).is_ok()
    }
}

/// Role of a grouped marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRole {
    Anchor,
    Member,
}

/// Group lookup for one marker list snapshot.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: Vec<Group>,
    by_id: HashMap<GroupId, usize>,
    /// Marker index -> slot in `groups`
    membership: Vec<Option<usize>>,
}

impl GroupIndex {
    pub fn from_markers(markers: &[Marker]) -> Self {
        let mut index = Self::default();
        index.rebuild(markers);
        index
    }

    pub fn rebuild(&mut self, markers: &[Marker]) {
        self.groups.clear();
        self.by_id.clear();
        self.membership.clear();
        self.membership.reserve(markers.len());

        for (i, marker) in markers.iter().enumerate() {
            let slot = marker.group().map(|id| {
                let slot = *self.by_id.entry(id.clone()).or_insert_with(|| {
                    self.groups.push(Group {
                        id: id.clone(),
                        member_indices: Vec::new(),
                    });
                    self.groups.len() - 1
                });
                // Ascending because markers are visited in order
                self.groups[slot].member_indices.push(i);
                slot
            });
            self.membership.push(slot);
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get(&self, id: &GroupId) -> Option<&Group> {
        self.by_id.get(id).map(|&slot| &self.groups[slot])
    }

    pub fn group_of(&self, index: usize) -> Option<&Group> {
        self.membership
            .get(index)
            .copied()
            .flatten()
            .map(|slot| &self.groups[slot])
    }

    pub fn anchor_of(&self, index: usize) -> Option<usize> {
        self.group_of(index).map(Group::anchor)
    }

    pub fn role_of(&self, index: usize) -> Option<GroupRole> {
        self.group_of(index).map(|group| {
            if group.anchor() == index {
                GroupRole::Anchor
            } else {
                GroupRole::Member
            }
        })
    }

    /// Every index that acts together with `index`: its whole group, or just
    /// itself when ungrouped. Empty when `index` is out of range.
    pub fn unit_of(&self, index: usize) -> Vec<usize> {
        match self.membership.get(index) {
            None => Vec::new(),
            Some(None) => vec![index],
            Some(Some(slot)) => self.groups[*slot].member_indices.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
