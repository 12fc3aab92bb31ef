//! Interaction and state engine for image occlusion markers.
//!
//! Markers are opaque rectangles laid over a study image. This crate turns
//! raw contacts into view transform updates, marker edits, group linking,
//! undo and study-mode reveal/lock transitions. Image loading, rendering and
//! deck storage belong to the host.
//!
//! ## Modules
//!
//! - `surface` - per-image facade wiring the components together
//! - `router` - contact classification and the annotation state machine
//! - `transform` - pan, pinch-zoom, fit-to-screen, coordinate conversion
//! - `editor` - marker list mutations under the group invariants
//! - `groups` - explicit group structure derived from shared group ids
//! - `study` - reveal/lock progression during review
//! - `undo` - bounded snapshot history
//! - `persistence` - storage trait, stores and the background write queue

pub mod constants;
pub mod editor;
pub mod error;
pub mod groups;
pub mod ids;
pub mod logging;
pub mod perf;
pub mod persistence;
pub mod router;
pub mod settings;
pub mod spatial_index;
pub mod study;
pub mod surface;
pub mod transform;
pub mod types;
pub mod undo;

pub use editor::{LinkChange, LinkSession, MarkerEditor};
pub use error::{Rejection, SettingsError, StorageError};
pub use settings::EngineSettings;
pub use study::RevealState;
pub use surface::{OcclusionSurface, SurfaceOutcome, SurfaceResponse};
pub use transform::{Transform, TransformManager};
pub use types::{Contact, DeviceClass, GroupId, ImageId, ImageMetadata, ImageSource, Marker, Point, Rect, SurfaceMode, ToolType};
