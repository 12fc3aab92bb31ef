//! Marker editor - the only code that mutates a marker list.
//!
//! Every structural mutation (add, remove, link, unlink) follows the same
//! sequence: snapshot the current list onto the undo stack, apply the change
//! in memory, rebuild the group and spatial indexes, then queue the new list
//! for persistence. Requests that fail a gesture-precision guard return a
//! [`Rejection`] and change nothing.

use crate::error::Rejection;
use crate::groups::{Group, GroupIndex, GroupRole};
use crate::ids::{GroupIdGenerator, UuidGroupIds};
use crate::persistence::WriteQueue;
use crate::settings::EngineSettings;
use crate::spatial_index::SpatialIndex;
use crate::types::{ImageId, Marker, Point, Rect};
use crate::undo::UndoStack;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of an editing request.
pub type EditResult<T = ()> = Result<T, Rejection>;

/// An open link session: taps toggle membership against the anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSession {
    pub image_id: ImageId,
    pub anchor_index: usize,
}

/// What a successful `toggle_link` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    /// Target tapped was the anchor; the session closed
    SessionClosed,
    Linked,
    Unlinked,
    /// Last member left; the anchor's id was stripped too
    Dissolved,
}

/// Owns one image's marker list and applies edits under the group invariants.
pub struct MarkerEditor {
    image_id: ImageId,
    markers: Vec<Marker>,
    groups: GroupIndex,
    spatial: SpatialIndex,
    session: Option<LinkSession>,
    undo: UndoStack,
    ids: Box<dyn GroupIdGenerator>,
    writer: Option<Arc<WriteQueue>>,
    min_marker_size: f32,
}

impl MarkerEditor {
    pub fn new(image_id: ImageId, markers: Vec<Marker>, settings: &EngineSettings) -> Self {
        let groups = GroupIndex::from_markers(&markers);
        let spatial = SpatialIndex::from_markers(&markers);
        Self {
            image_id,
            markers,
            groups,
            spatial,
            session: None,
            undo: UndoStack::new(settings.undo_depth),
            ids: Box::new(UuidGroupIds),
            writer: None,
            min_marker_size: settings.min_marker_size,
        }
    }

    /// Use `ids` for new group ids.
    pub fn with_id_generator(mut self, ids: impl GroupIdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Persist every mutation through `writer`.
    pub fn with_writer(mut self, writer: Arc<WriteQueue>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Switch to another image's list. Closes any link session and clears
    /// history, since both are scoped to one image.
    pub fn load(&mut self, image_id: ImageId, markers: Vec<Marker>) {
        self.image_id = image_id;
        self.markers = markers;
        self.session = None;
        self.undo.clear();
        self.reindex();
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    pub fn image_id(&self) -> &ImageId {
        &self.image_id
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }

    pub fn group_of(&self, index: usize) -> Option<&Group> {
        self.groups.group_of(index)
    }

    pub fn anchor_of(&self, index: usize) -> Option<usize> {
        self.groups.anchor_of(index)
    }

    /// Topmost marker containing a content-space point.
    pub fn marker_at(&self, p: Point) -> Option<usize> {
        self.spatial.topmost_at(p)
    }

    pub fn link_session(&self) -> Option<&LinkSession> {
        self.session.as_ref()
    }

    pub fn is_linking(&self) -> bool {
        self.session.is_some()
    }

    pub fn min_marker_size(&self) -> f32 {
        self.min_marker_size
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    // ------------------------------------------------------------------
    // Structural mutations
    // ------------------------------------------------------------------

    /// Append an ungrouped marker covering `rect`, if it exceeds the minimum
    /// size in both dimensions. Returns the new index.
    pub fn add_marker(&mut self, rect: Rect) -> EditResult<usize> {
        if !rect.exceeds(self.min_marker_size) {
            return self.reject(Rejection::TooSmall);
        }
        self.snapshot();
        let marker = Marker::from_rect(rect);
        let index = self.markers.len();
        self.spatial.insert(index, &marker);
        self.markers.push(marker);
        self.groups.rebuild(&self.markers);
        info!(image = %self.image_id, index, ?rect, "marker added");
        self.persist();
        Ok(index)
    }

    /// Remove a marker, or its whole group when it is grouped. Returns how
    /// many markers were removed.
    pub fn remove_marker(&mut self, index: usize) -> EditResult<usize> {
        let doomed = self.groups.unit_of(index);
        if doomed.is_empty() {
            return self.reject(Rejection::OutOfRange(index));
        }
        self.snapshot();
        let mut position = 0;
        self.markers.retain(|_| {
            let keep = doomed.binary_search(&position).is_err();
            position += 1;
            keep
        });
        // Indices shifted; any session anchor is gone or moved.
        self.session = None;
        self.reindex();
        info!(image = %self.image_id, index, removed = doomed.len(), "markers removed");
        self.persist();
        Ok(doomed.len())
    }

    // ------------------------------------------------------------------
    // Link sessions
    // ------------------------------------------------------------------

    /// Open a link session anchored at `index`. Group members that are not
    /// the anchor cannot start a session.
    pub fn enter_link_session(&mut self, index: usize) -> EditResult {
        if index >= self.markers.len() {
            return self.reject(Rejection::OutOfRange(index));
        }
        if self.groups.role_of(index) == Some(GroupRole::Member) {
            let anchor = self.groups.anchor_of(index).unwrap_or(index);
            return self.reject(Rejection::NotAnchor { index, anchor });
        }
        debug!(image = %self.image_id, anchor = index, "link session opened");
        self.session = Some(LinkSession {
            image_id: self.image_id.clone(),
            anchor_index: index,
        });
        Ok(())
    }

    /// Toggle `target`'s membership in the session anchor's group.
    pub fn toggle_link(&mut self, target: usize) -> EditResult<LinkChange> {
        let image = self.image_id.clone();
        self.toggle_link_on(&image, target)
    }

    /// [`toggle_link`](Self::toggle_link) for a target named by image, so
    /// taps routed from another surface cannot link across images.
    pub fn toggle_link_on(&mut self, image: &ImageId, target: usize) -> EditResult<LinkChange> {
        let Some(session) = self.session.clone() else {
            return self.reject(Rejection::NoSession);
        };
        if &session.image_id != image {
            return self.reject(Rejection::CrossImage {
                session: session.image_id,
                target: image.clone(),
            });
        }
        let anchor = session.anchor_index;
        if target == anchor {
            self.exit_link_session();
            return Ok(LinkChange::SessionClosed);
        }
        let Some(target_marker) = self.markers.get(target) else {
            return self.reject(Rejection::OutOfRange(target));
        };

        let anchor_group = self.markers[anchor].group().cloned();
        let target_group = target_marker.group().cloned();

        // Exclusivity: a marker in another group is never pulled over.
        if let Some(target_group) = &target_group {
            if anchor_group.as_ref() != Some(target_group) {
                return self.reject(Rejection::ForeignGroup(target));
            }
        }

        self.snapshot();
        let change = match (anchor_group, target_group) {
            (Some(_), Some(_)) => {
                self.markers[target].group_id = None;
                let remaining = self.groups.group_of(anchor).map_or(0, |g| g.len() - 1);
                if remaining <= 1 {
                    self.markers[anchor].group_id = None;
                    LinkChange::Dissolved
                } else {
                    LinkChange::Unlinked
                }
            }
            (anchor_group, _) => {
                let id = match anchor_group {
                    Some(id) => id,
                    None => {
                        let id = self.ids.next_id();
                        self.markers[anchor].group_id = Some(id.clone());
                        id
                    }
                };
                self.markers[target].group_id = Some(id);
                LinkChange::Linked
            }
        };
        self.groups.rebuild(&self.markers);
        info!(image = %self.image_id, anchor, target, ?change, "link toggled");
        self.persist();
        Ok(change)
    }

    pub fn exit_link_session(&mut self) {
        if self.session.take().is_some() {
            debug!(image = %self.image_id, "link session closed");
        }
    }

    // ------------------------------------------------------------------
    // Lock state
    // ------------------------------------------------------------------

    /// Set `isLocked` on `index` and every marker grouped with it. Persisted
    /// but not recorded in history. Returns the affected indices.
    pub fn set_group_locked(&mut self, index: usize, locked: bool) -> EditResult<Vec<usize>> {
        let unit = self.groups.unit_of(index);
        if unit.is_empty() {
            return self.reject(Rejection::OutOfRange(index));
        }
        for &i in &unit {
            self.markers[i].is_locked = Some(locked);
        }
        info!(image = %self.image_id, index, members = unit.len(), locked, "lock state written");
        self.persist();
        Ok(unit)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Restore the most recent snapshot and persist it.
    pub fn undo(&mut self) -> EditResult {
        let Some(entry) = self.undo.pop() else {
            return self.reject(Rejection::NothingToUndo);
        };
        if entry.image_id != self.image_id {
            // History is cleared on image switch; never restore across images.
            return self.reject(Rejection::CrossImage {
                session: self.image_id.clone(),
                target: entry.image_id,
            });
        }
        self.markers = entry.prior_markers;
        self.session = None;
        self.reindex();
        info!(image = %self.image_id, remaining = self.undo.len(), "undo");
        self.persist();
        Ok(())
    }

    // ------------------------------------------------------------------

    fn snapshot(&mut self) {
        self.undo.push(self.image_id.clone(), self.markers.clone());
    }

    fn reindex(&mut self) {
        self.groups.rebuild(&self.markers);
        self.spatial.rebuild(&self.markers);
    }

    fn persist(&self) {
        if let Some(writer) = &self.writer {
            writer.enqueue(self.image_id.clone(), self.markers.clone());
        }
    }

    fn reject<T>(&self, reason: Rejection) -> EditResult<T> {
        debug!(image = %self.image_id, %reason, "edit ignored");
        Err(reason)
    }
}
