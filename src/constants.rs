//! Engine-wide constants.
//!
//! Centralizes the thresholds and limits that drive gesture classification,
//! marker validation and history, so settings defaults and tests agree.

// ============================================================================
// Markers
// ============================================================================

/// Minimum marker width and height in content-space units (exclusive).
///
/// A drawn rectangle must exceed this in both dimensions to be committed.
pub const MIN_MARKER_SIZE: f32 = 5.0;

// ============================================================================
// History
// ============================================================================

/// Maximum undo snapshots kept per image
pub const MAX_UNDO_DEPTH: usize = 10;

// ============================================================================
// Zoom & Pan
// ============================================================================

/// Minimum view scale
pub const MIN_SCALE: f32 = 0.1;

/// Maximum view scale
pub const MAX_SCALE: f32 = 8.0;

/// Default view scale
pub const DEFAULT_SCALE: f32 = 1.0;

/// Horizontal padding (view-space pixels) used by fit-to-screen
pub const FIT_PADDING: f32 = 32.0;

/// Pinch distances below this (view-space pixels) are treated as degenerate
pub const MIN_PINCH_DISTANCE: f32 = 1.0;

// ============================================================================
// Gestures
// ============================================================================

/// Maximum view-space movement for a contact to still count as a tap
pub const TAP_SLOP: f32 = 10.0;

// ============================================================================
// Persistence
// ============================================================================

/// Attempts per marker-list write before the failure is surfaced
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Base delay for exponential write retry backoff in milliseconds
pub const RETRY_BASE_DELAY_MS: u64 = 50;

/// Upper bound for a single retry delay in milliseconds
pub const RETRY_MAX_DELAY_MS: u64 = 2_000;

/// File extension used by the JSON marker store
pub const MARKER_FILE_EXTENSION: &str = "json";
