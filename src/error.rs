//! Error types for the engine.
//!
//! Only two concerns can fail for real: marker persistence and settings
//! loading. Gesture-precision guards (sub-threshold draws, foreign-group
//! links, etc.) are not errors; they surface as [`Rejection`] values and are
//! otherwise silent.

use crate::types::ImageId;
use thiserror::Error;

/// Errors raised by a [`MarkerStore`](crate::persistence::MarkerStore).
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Marker file could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The writer thread could not be started or has stopped
    #[error("Write queue unavailable: {0}")]
    QueueClosed(String),

    /// Backend-specific failure reported by a host store
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<String> for StorageError {
    fn from(s: String) -> Self {
        StorageError::Backend(s)
    }
}

impl From<&str> for StorageError {
    fn from(s: &str) -> Self {
        StorageError::Backend(s.to_string())
    }
}

/// Errors raised while loading [`EngineSettings`](crate::settings::EngineSettings).
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value parsed but is out of range
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type alias for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Why an editing request was ignored.
///
/// Every variant is a silent no-op for the user; the value exists so callers
/// and tests can tell what happened.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Drawn rectangle did not exceed the minimum size
    #[error("rectangle below minimum marker size")]
    TooSmall,

    /// Marker index does not exist
    #[error("no marker at index {0}")]
    OutOfRange(usize),

    /// A non-anchor group member tried to open a link session
    #[error("marker {index} is a member of the group anchored at {anchor}")]
    NotAnchor { index: usize, anchor: usize },

    /// Link target belongs to a different group
    #[error("marker {0} belongs to another group")]
    ForeignGroup(usize),

    /// Link target lives on another image than the session
    #[error("link session on {session} cannot reach image {target}")]
    CrossImage { session: ImageId, target: ImageId },

    /// No link session is open
    #[error("no link session open")]
    NoSession,

    /// Linking is an editing action and the surface is in study mode
    #[error("link sessions are unavailable in study mode")]
    StudyMode,

    /// Undo history is empty
    #[error("undo history is empty")]
    NothingToUndo,
}
