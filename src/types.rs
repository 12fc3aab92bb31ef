//! Core types for the occlusion engine.
//!
//! This module defines the data structures shared by every component:
//! geometry in content and view space, markers and their group ids, image
//! identity and metadata, and the input contacts delivered by the host.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// Geometry
// ============================================================================

/// A 2D point. Whether it is in content or view space depends on context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// An axis-aligned rectangle with non-negative size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a normalized rectangle from two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// True when both dimensions strictly exceed `min_size`.
    #[inline]
    pub fn exceeds(&self, min_size: f32) -> bool {
        self.width > min_size && self.height > min_size
    }

    /// Overlapping area of two rectangles, or `None` when they are disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        if max_x < x || max_y < y {
            return None;
        }
        Some(Rect::new(x, y, max_x - x, max_y - y))
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }
}

// ============================================================================
// Markers
// ============================================================================

/// Identifier shared by every marker of one group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque occlusion rectangle in image-native pixel space.
///
/// Geometry is fixed at creation; only group membership and the lock flag
/// change afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
}

impl Marker {
    /// Create an ungrouped, unlocked marker covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            group_id: None,
            is_locked: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked.unwrap_or(false)
    }

    /// Group id, treating an empty string the same as no group.
    pub fn group(&self) -> Option<&GroupId> {
        self.group_id.as_ref().filter(|id| !id.as_str().is_empty())
    }
}

// ============================================================================
// Images
// ============================================================================

/// Identity of an annotated image, assigned by the storage layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Native pixel dimensions supplied by the image metadata collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: f32,
    pub height: f32,
}

impl ImageMetadata {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Content-space bounds of the image.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Where an image's pixels come from. Resolving it to something displayable
/// is the host's job; the engine only carries it around.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ImageSource {
    /// Raw encoded image bytes, serialized as Base64.
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
    /// A URI the host knows how to fetch.
    Uri(String),
}

impl ImageSource {
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Bytes(_))
    }
}

mod base64_bytes {
    use super::*;
    use base64::Engine as _;

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Input
// ============================================================================

/// Hardware class of a contact, as tagged by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Finger,
    Stylus,
    Mouse,
}

impl DeviceClass {
    /// Stylus and mouse contacts annotate; fingers navigate.
    pub fn is_annotating(self) -> bool {
        matches!(self, Self::Stylus | Self::Mouse)
    }
}

/// A single pointer contact in view space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub device_class: DeviceClass,
    pub is_primary: bool,
}

impl Contact {
    pub fn new(id: u64, x: f32, y: f32, device_class: DeviceClass) -> Self {
        Self {
            id,
            x,
            y,
            device_class,
            is_primary: true,
        }
    }

    pub fn finger(id: u64, x: f32, y: f32) -> Self {
        Self::new(id, x, y, DeviceClass::Finger)
    }

    pub fn stylus(id: u64, x: f32, y: f32) -> Self {
        Self::new(id, x, y, DeviceClass::Stylus)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// ============================================================================
// Tools & Modes
// ============================================================================

/// Active annotation tool in edit mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolType {
    #[default]
    Draw,
    Erase,
}

/// Whether the surface is being edited or reviewed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SurfaceMode {
    #[default]
    Edit,
    Study,
}
