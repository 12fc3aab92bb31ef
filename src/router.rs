//! Gesture router - classifies contacts and hands each to one consumer.
//!
//! Finger contacts navigate (one finger pans, two pinch). Stylus and mouse
//! contacts annotate: draw, erase, toggle links, or advance study state.
//! A contact claimed for annotation never reaches navigation, and only one
//! annotation contact is claimed at a time.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Drawing    (annotating contact on empty image area, draw tool, edit
//!                     mode, no link session)
//! Idle -> Tapping    (annotating contact on a marker while linking, with the
//!                     erase tool, or in study mode)
//!
//! Drawing -> Idle    (release: commit if large enough, else discard)
//! Tapping -> Idle    (release: act if the contact stayed within tap slop and
//!                     ended on the same marker)
//! Any -> Idle        (cancel: no side effect)
//! ```
//!
//! The router itself never touches the transform or the marker list. It
//! returns a [`RouteAction`] and the surface applies it.

use crate::constants::{MIN_MARKER_SIZE, TAP_SLOP};
use crate::profile_scope;
use crate::settings::EngineSettings;
use crate::types::{Contact, Point, Rect, SurfaceMode, ToolType};
use std::collections::HashSet;
use tracing::{debug, trace};

/// What a tap on a marker does once it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    Link,
    Erase,
    Study,
}

/// Annotation claim held by the router.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RouterState {
    /// No annotation contact claimed
    #[default]
    Idle,

    /// Dragging out a new marker
    Drawing {
        contact_id: u64,
        /// Content-space point where the contact went down
        start: Point,
        /// Latest content-space point
        current: Point,
    },

    /// Waiting to see whether a contact on a marker is a tap
    Tapping {
        contact_id: u64,
        kind: TapKind,
        marker: usize,
        /// View-space point where the contact went down
        start: Point,
        /// Set once the contact strays beyond tap slop
        moved: bool,
    },
}

impl RouterState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    pub fn is_tapping(&self) -> bool {
        matches!(self, Self::Tapping { .. })
    }

    /// Contact currently claimed for annotation, if any
    pub fn claimed_contact(&self) -> Option<u64> {
        match self {
            Self::Idle => None,
            Self::Drawing { contact_id, .. } | Self::Tapping { contact_id, .. } => Some(*contact_id),
        }
    }

    /// Live preview rectangle while drawing
    pub fn drawing_rect(&self) -> Option<Rect> {
        match self {
            Self::Drawing { start, current, .. } => Some(Rect::from_corners(*start, *current)),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}

/// Where a contact event landed, computed by the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    /// Contact position in content space
    pub content: Point,
    /// Topmost marker under the contact
    pub marker: Option<usize>,
    /// Whether the contact is inside the interactive surface
    pub on_surface: bool,
    /// Whether the contact is over the image itself
    pub on_canvas: bool,
}

/// Surface state consulted when a contact goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteContext {
    pub mode: SurfaceMode,
    pub tool: ToolType,
    pub linking: bool,
}

/// Instruction for the transform manager.
#[derive(Debug, Clone, PartialEq)]
pub enum NavCommand {
    /// (Re)start a gesture with these view-space positions
    Begin(Vec<Point>),
    Update(Vec<Point>),
    End,
}

/// What the surface should do in response to a contact event.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteAction {
    None,
    Navigate(NavCommand),
    DrawPreview(Rect),
    CommitDraw(Rect),
    /// Draw released below the size threshold
    DrawDiscarded,
    ToggleLink(usize),
    Erase(usize),
    StudyTap(usize),
}

/// Routing decision for one contact event.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub action: RouteAction,
    /// Host should block page scroll/zoom for this event
    pub suppress_native: bool,
}

impl RouteResponse {
    fn ignored() -> Self {
        Self {
            action: RouteAction::None,
            suppress_native: false,
        }
    }

    fn claimed(action: RouteAction) -> Self {
        Self {
            action,
            suppress_native: true,
        }
    }
}

/// Per-surface contact classifier.
#[derive(Debug)]
pub struct GestureRouter {
    state: RouterState,
    /// Navigation contacts in arrival order; the first two drive the gesture
    fingers: Vec<(u64, Point)>,
    /// Contacts that began off the surface, ignored until released
    ignored: HashSet<u64>,
    tap_slop: f32,
    min_marker_size: f32,
}

impl Default for GestureRouter {
    fn default() -> Self {
        Self::new(TAP_SLOP, MIN_MARKER_SIZE)
    }
}

impl GestureRouter {
    pub fn new(tap_slop: f32, min_marker_size: f32) -> Self {
        Self {
            state: RouterState::Idle,
            fingers: Vec::new(),
            ignored: HashSet::new(),
            tap_slop,
            min_marker_size,
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.tap_slop, settings.min_marker_size)
    }

    pub fn state(&self) -> &RouterState {
        &self.state
    }

    pub fn navigating_contacts(&self) -> usize {
        self.fingers.len()
    }

    pub fn pointer_down(&mut self, contact: &Contact, at: HitInfo, ctx: RouteContext) -> RouteResponse {
        profile_scope!("router_pointer_down");

        if !at.on_surface {
            trace!(contact = contact.id, "contact began off surface");
            self.ignored.insert(contact.id);
            return RouteResponse::ignored();
        }

        if !contact.device_class.is_annotating() {
            self.fingers.push((contact.id, contact.position()));
            return RouteResponse::claimed(RouteAction::Navigate(NavCommand::Begin(self.nav_points())));
        }

        if !self.state.is_idle() {
            debug!(contact = contact.id, "annotation contact already claimed");
            return RouteResponse::ignored();
        }

        match (ctx.mode, at.marker) {
            (SurfaceMode::Study, Some(marker)) => self.start_tap(contact, TapKind::Study, marker),
            (SurfaceMode::Study, None) => RouteResponse::ignored(),
            (SurfaceMode::Edit, Some(marker)) if ctx.linking => self.start_tap(contact, TapKind::Link, marker),
            (SurfaceMode::Edit, Some(marker)) if ctx.tool == ToolType::Erase => {
                self.start_tap(contact, TapKind::Erase, marker)
            }
            (SurfaceMode::Edit, None) if ctx.tool == ToolType::Draw && !ctx.linking && at.on_canvas => {
                self.state = RouterState::Drawing {
                    contact_id: contact.id,
                    start: at.content,
                    current: at.content,
                };
                RouteResponse::claimed(RouteAction::DrawPreview(Rect::from_corners(at.content, at.content)))
            }
            _ => RouteResponse::ignored(),
        }
    }

    pub fn pointer_move(&mut self, contact: &Contact, at: HitInfo) -> RouteResponse {
        profile_scope!("router_pointer_move");

        if self.ignored.contains(&contact.id) {
            return RouteResponse::ignored();
        }

        if let Some(slot) = self.fingers.iter_mut().find(|(id, _)| *id == contact.id) {
            slot.1 = contact.position();
            return RouteResponse::claimed(RouteAction::Navigate(NavCommand::Update(self.nav_points())));
        }

        let slop = self.tap_slop;
        match &mut self.state {
            RouterState::Drawing {
                contact_id,
                start,
                current,
            } if *contact_id == contact.id => {
                *current = at.content;
                RouteResponse::claimed(RouteAction::DrawPreview(Rect::from_corners(*start, *current)))
            }
            RouterState::Tapping {
                contact_id,
                start,
                moved,
                ..
            } if *contact_id == contact.id => {
                if start.distance_to(contact.position()) > slop {
                    *moved = true;
                }
                RouteResponse::claimed(RouteAction::None)
            }
            _ => RouteResponse::ignored(),
        }
    }

    pub fn pointer_up(&mut self, contact: &Contact, at: HitInfo) -> RouteResponse {
        profile_scope!("router_pointer_up");

        if self.ignored.remove(&contact.id) {
            return RouteResponse::ignored();
        }

        if let Some(response) = self.release_finger(contact.id) {
            return response;
        }

        if self.state.claimed_contact() != Some(contact.id) {
            return RouteResponse::ignored();
        }

        let action = match std::mem::take(&mut self.state) {
            RouterState::Drawing { start, .. } => {
                let rect = Rect::from_corners(start, at.content);
                if rect.exceeds(self.min_marker_size) {
                    RouteAction::CommitDraw(rect)
                } else {
                    debug!(?rect, "draw below minimum size discarded");
                    RouteAction::DrawDiscarded
                }
            }
            RouterState::Tapping {
                kind,
                marker,
                start,
                moved,
                ..
            } => {
                if moved || start.distance_to(contact.position()) > self.tap_slop {
                    debug!(marker, ?kind, "contact moved, not a tap");
                    RouteAction::None
                } else if at.marker != Some(marker) {
                    debug!(marker, released_on = ?at.marker, ?kind, "tap ended off its marker");
                    RouteAction::None
                } else {
                    match kind {
                        TapKind::Link => RouteAction::ToggleLink(marker),
                        TapKind::Erase => RouteAction::Erase(marker),
                        TapKind::Study => RouteAction::StudyTap(marker),
                    }
                }
            }
            RouterState::Idle => RouteAction::None,
        };
        RouteResponse::claimed(action)
    }

    /// Platform cancelled a contact: drop it without side effects.
    pub fn pointer_cancel(&mut self, contact_id: u64) -> RouteResponse {
        if self.ignored.remove(&contact_id) {
            return RouteResponse::ignored();
        }
        if let Some(response) = self.release_finger(contact_id) {
            return response;
        }
        if self.state.claimed_contact() == Some(contact_id) {
            debug!(contact = contact_id, "annotation contact cancelled");
            let action = match std::mem::take(&mut self.state) {
                RouterState::Drawing { .. } => RouteAction::DrawDiscarded,
                RouterState::Tapping { .. } | RouterState::Idle => RouteAction::None,
            };
            return RouteResponse::claimed(action);
        }
        RouteResponse::ignored()
    }

    /// Drop every tracked contact, e.g. when the surface switches images.
    pub fn reset(&mut self) {
        self.state.reset();
        self.fingers.clear();
        self.ignored.clear();
    }

    fn start_tap(&mut self, contact: &Contact, kind: TapKind, marker: usize) -> RouteResponse {
        self.state = RouterState::Tapping {
            contact_id: contact.id,
            kind,
            marker,
            start: contact.position(),
            moved: false,
        };
        RouteResponse::claimed(RouteAction::None)
    }

    fn release_finger(&mut self, contact_id: u64) -> Option<RouteResponse> {
        let pos = self.fingers.iter().position(|(id, _)| *id == contact_id)?;
        self.fingers.remove(pos);
        let command = if self.fingers.is_empty() {
            NavCommand::End
        } else {
            NavCommand::Begin(self.nav_points())
        };
        Some(RouteResponse::claimed(RouteAction::Navigate(command)))
    }

    fn nav_points(&self) -> Vec<Point> {
        self.fingers.iter().take(2).map(|(_, p)| *p).collect()
    }
}
