//! Per-image interaction surface.
//!
//! Ties the components together for one displayed image: contacts go to the
//! [`GestureRouter`], and its decision is applied to exactly one of the
//! [`TransformManager`], the [`MarkerEditor`] or the [`StudyMachine`].

use crate::editor::{LinkChange, MarkerEditor};
use crate::error::{Rejection, StorageResult};
use crate::ids::GroupIdGenerator;
use crate::persistence::{MarkerStore, WriteQueue};
use crate::profile_scope;
use crate::router::{GestureRouter, HitInfo, NavCommand, RouteAction, RouteContext, RouteResponse, RouterState};
use crate::settings::EngineSettings;
use crate::study::{RevealState, StudyMachine};
use crate::transform::{Transform, TransformManager};
use crate::types::{Contact, ImageId, ImageMetadata, Marker, Point, Rect, SurfaceMode, ToolType};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Visible effect of a contact event.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOutcome {
    None,
    Navigated(Transform),
    /// Live rectangle of an in-progress draw, in content space
    Preview(Rect),
    MarkerAdded(usize),
    DrawDiscarded,
    MarkersRemoved(usize),
    Linked(LinkChange),
    Revealed { index: usize, state: RevealState },
    /// Request hit a guard and was ignored
    Ignored(Rejection),
}

/// Result of feeding one contact event to the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceResponse {
    pub outcome: SurfaceOutcome,
    /// Host should suppress native scroll/zoom for this event
    pub suppress_native: bool,
}

pub struct OcclusionSurface {
    image: ImageMetadata,
    viewport: Rect,
    transform: TransformManager,
    router: GestureRouter,
    editor: MarkerEditor,
    study: StudyMachine,
    mode: SurfaceMode,
    tool: ToolType,
    preview: Option<Rect>,
    fit_padding: f32,
}

impl OcclusionSurface {
    /// Settings that fail validation are replaced by the defaults.
    pub fn new(image_id: ImageId, image: ImageMetadata, markers: Vec<Marker>, settings: &EngineSettings) -> Self {
        let fallback;
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                warn!(error = %err, "invalid engine settings, using defaults");
                fallback = EngineSettings::default();
                &fallback
            }
        };
        Self {
            image,
            viewport: Rect::new(0.0, 0.0, image.width, image.height),
            transform: TransformManager::new(settings.min_scale, settings.max_scale),
            router: GestureRouter::from_settings(settings),
            editor: MarkerEditor::new(image_id, markers, settings),
            study: StudyMachine::new(),
            mode: SurfaceMode::Edit,
            tool: ToolType::Draw,
            preview: None,
            fit_padding: settings.fit_padding,
        }
    }

    /// Load `image_id`'s markers from `store` and persist edits via `writer`.
    pub fn open(
        store: &dyn MarkerStore,
        writer: Arc<WriteQueue>,
        image_id: ImageId,
        image: ImageMetadata,
        settings: &EngineSettings,
    ) -> StorageResult<Self> {
        let markers = store.load_markers(&image_id)?;
        info!(image = %image_id, count = markers.len(), "surface opened");
        Ok(Self::new(image_id, image, markers, settings).with_writer(writer))
    }

    pub fn with_writer(mut self, writer: Arc<WriteQueue>) -> Self {
        self.editor = self.editor.with_writer(writer);
        self
    }

    pub fn with_id_generator(mut self, ids: impl GroupIdGenerator + 'static) -> Self {
        self.editor = self.editor.with_id_generator(ids);
        self
    }

    /// Switch to another image. Drops in-flight contacts, link session and
    /// study transparency, then fits the new image to the viewport.
    pub fn load_image(&mut self, image_id: ImageId, image: ImageMetadata, markers: Vec<Marker>) {
        info!(image = %image_id, count = markers.len(), "image loaded");
        self.image = image;
        self.editor.load(image_id, markers);
        self.router.reset();
        self.study.reset_session();
        self.preview = None;
        self.transform.end_gesture();
        self.fit_to_screen();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn editor(&self) -> &MarkerEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut MarkerEditor {
        &mut self.editor
    }

    pub fn markers(&self) -> &[Marker] {
        self.editor.markers()
    }

    pub fn transform(&self) -> Transform {
        self.transform.transform()
    }

    pub fn transform_manager(&self) -> &TransformManager {
        &self.transform
    }

    pub fn router_state(&self) -> &RouterState {
        self.router.state()
    }

    pub fn preview(&self) -> Option<Rect> {
        self.preview
    }

    pub fn mode(&self) -> SurfaceMode {
        self.mode
    }

    pub fn tool(&self) -> ToolType {
        self.tool
    }

    pub fn image(&self) -> ImageMetadata {
        self.image
    }

    pub fn reveal_state(&self, index: usize) -> Option<RevealState> {
        self.study.state_of(&self.editor, index)
    }

    // ------------------------------------------------------------------
    // Modes, tools, view
    // ------------------------------------------------------------------

    pub fn set_tool(&mut self, tool: ToolType) {
        self.tool = tool;
    }

    /// Entering study closes any link session; leaving it ends the reveal
    /// session.
    pub fn set_mode(&mut self, mode: SurfaceMode) {
        if mode == self.mode {
            return;
        }
        match mode {
            SurfaceMode::Study => self.editor.exit_link_session(),
            SurfaceMode::Edit => self.study.reset_session(),
        }
        debug!(?mode, "surface mode changed");
        self.mode = mode;
    }

    /// Set the visible viewport size in view-space pixels.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Rect::new(0.0, 0.0, width, height);
    }

    pub fn fit_to_screen(&mut self) {
        self.transform
            .fit_to_screen(self.image.width, self.viewport.width, self.fit_padding);
    }

    // ------------------------------------------------------------------
    // Editing commands outside of gestures
    // ------------------------------------------------------------------

    pub fn enter_link_session(&mut self, index: usize) -> Result<(), Rejection> {
        if self.mode == SurfaceMode::Study {
            return Err(Rejection::StudyMode);
        }
        self.editor.enter_link_session(index)
    }

    pub fn exit_link_session(&mut self) {
        self.editor.exit_link_session();
    }

    pub fn undo(&mut self) -> Result<(), Rejection> {
        self.editor.undo()
    }

    // ------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, contact: &Contact) -> SurfaceResponse {
        profile_scope!("surface_pointer_down");
        let hit = self.hit_info(contact);
        let ctx = RouteContext {
            mode: self.mode,
            tool: self.tool,
            linking: self.editor.is_linking(),
        };
        let response = self.router.pointer_down(contact, hit, ctx);
        self.apply(response)
    }

    pub fn pointer_move(&mut self, contact: &Contact) -> SurfaceResponse {
        profile_scope!("surface_pointer_move");
        let hit = self.hit_info(contact);
        let response = self.router.pointer_move(contact, hit);
        self.apply(response)
    }

    pub fn pointer_up(&mut self, contact: &Contact) -> SurfaceResponse {
        profile_scope!("surface_pointer_up");
        let hit = self.hit_info(contact);
        let response = self.router.pointer_up(contact, hit);
        self.apply(response)
    }

    pub fn pointer_cancel(&mut self, contact_id: u64) -> SurfaceResponse {
        let response = self.router.pointer_cancel(contact_id);
        self.apply(response)
    }

    fn hit_info(&self, contact: &Contact) -> HitInfo {
        let view = contact.position();
        let content = self.transform.to_content_space(view);
        HitInfo {
            content,
            marker: self.editor.marker_at(content),
            on_surface: self.viewport.contains(view),
            on_canvas: self.image.bounds().contains(content),
        }
    }

    fn apply(&mut self, response: RouteResponse) -> SurfaceResponse {
        let RouteResponse {
            action,
            suppress_native,
        } = response;

        let outcome = match action {
            RouteAction::None => SurfaceOutcome::None,
            RouteAction::Navigate(command) => {
                match command {
                    NavCommand::Begin(points) => self.transform.begin_gesture(&points),
                    NavCommand::Update(points) => self.transform.update_gesture(&points),
                    NavCommand::End => self.transform.end_gesture(),
                }
                SurfaceOutcome::Navigated(self.transform.transform())
            }
            RouteAction::DrawPreview(rect) => match rect.intersection(&self.image.bounds()) {
                Some(clipped) => {
                    self.preview = Some(clipped);
                    SurfaceOutcome::Preview(clipped)
                }
                None => {
                    self.preview = None;
                    SurfaceOutcome::None
                }
            },
            RouteAction::CommitDraw(rect) => {
                self.preview = None;
                // Markers never extend past the image
                match rect.intersection(&self.image.bounds()) {
                    Some(clipped) if clipped.exceeds(self.editor.min_marker_size()) => {
                        outcome_of(self.editor.add_marker(clipped), SurfaceOutcome::MarkerAdded)
                    }
                    _ => {
                        debug!(?rect, "draw left too little on the image");
                        SurfaceOutcome::DrawDiscarded
                    }
                }
            }
            RouteAction::DrawDiscarded => {
                self.preview = None;
                SurfaceOutcome::DrawDiscarded
            }
            RouteAction::ToggleLink(index) => outcome_of(self.editor.toggle_link(index), SurfaceOutcome::Linked),
            RouteAction::Erase(index) => outcome_of(self.editor.remove_marker(index), SurfaceOutcome::MarkersRemoved),
            RouteAction::StudyTap(index) => outcome_of(self.study.tap(&mut self.editor, index), |state| {
                SurfaceOutcome::Revealed { index, state }
            }),
        };

        SurfaceResponse {
            outcome,
            suppress_native,
        }
    }

    /// View-space position of a content point, for hosts drawing overlays.
    pub fn to_view_space(&self, content: Point) -> Point {
        self.transform.to_view_space(content)
    }

    /// View-space rectangle of marker `index`.
    pub fn marker_view_rect(&self, index: usize) -> Option<Rect> {
        let marker = self.editor.markers().get(index)?;
        Some(self.transform.transform().rect_to_view_space(marker.rect()))
    }
}

fn outcome_of<T>(result: Result<T, Rejection>, wrap: impl FnOnce(T) -> SurfaceOutcome) -> SurfaceOutcome {
    match result {
        Ok(value) => wrap(value),
        Err(rejection) => SurfaceOutcome::Ignored(rejection),
    }
}
