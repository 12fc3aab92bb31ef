//! View transform - pan, pinch-zoom, fit-to-screen and coordinate conversion.
//!
//! The transform maps content space (image-native pixels) to view space:
//! `view = content * scale + translate`. Navigation gestures only ever touch
//! the transform, never the marker list.

use crate::constants::{DEFAULT_SCALE, MAX_SCALE, MIN_PINCH_DISTANCE, MIN_SCALE};
use crate::types::{Point, Rect};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Affine content-to-view mapping with uniform scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl Transform {
    #[inline]
    pub fn to_view_space(&self, content: Point) -> Point {
        Point::new(
            content.x * self.scale + self.translate_x,
            content.y * self.scale + self.translate_y,
        )
    }

    #[inline]
    pub fn to_content_space(&self, view: Point) -> Point {
        Point::new(
            (view.x - self.translate_x) / self.scale,
            (view.y - self.translate_y) / self.scale,
        )
    }

    pub fn rect_to_view_space(&self, rect: Rect) -> Rect {
        let origin = self.to_view_space(Point::new(rect.x, rect.y));
        Rect::new(origin.x, origin.y, rect.width * self.scale, rect.height * self.scale)
    }

    fn translate(&self) -> Point {
        Point::new(self.translate_x, self.translate_y)
    }
}

/// Baseline captured when a navigation gesture starts.
#[derive(Clone, Copy, Debug, PartialEq)]
enum GestureBaseline {
    /// One contact: translate follows its movement
    Pan { last: Point },
    /// Two contacts: scale follows their distance, translate keeps the
    /// content point under the centroid pinned
    Pinch { centroid: Point, distance: f32 },
}

/// Tracks the view transform and applies navigation gestures to it.
#[derive(Debug, Clone)]
pub struct TransformManager {
    transform: Transform,
    min_scale: f32,
    max_scale: f32,
    baseline: Option<GestureBaseline>,
}

impl Default for TransformManager {
    fn default() -> Self {
        Self::new(MIN_SCALE, MAX_SCALE)
    }
}

impl TransformManager {
    /// Bounds that are not positive and ordered fall back to the defaults.
    pub fn new(min_scale: f32, max_scale: f32) -> Self {
        let (min_scale, max_scale) = if min_scale > 0.0 && max_scale >= min_scale {
            (min_scale, max_scale)
        } else {
            warn!(min_scale, max_scale, "invalid scale bounds, using defaults");
            (MIN_SCALE, MAX_SCALE)
        };
        Self {
            transform: Transform {
                scale: DEFAULT_SCALE.clamp(min_scale, max_scale),
                ..Transform::default()
            },
            min_scale,
            max_scale,
            baseline: None,
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Replace the transform, clamping its scale into bounds.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = Transform {
            scale: self.clamp_scale(transform.scale),
            ..transform
        };
    }

    pub fn is_gesture_active(&self) -> bool {
        self.baseline.is_some()
    }

    /// Record the baseline for a pan (one contact) or pinch (two or more;
    /// only the first two count). An empty slice clears the baseline.
    pub fn begin_gesture(&mut self, contacts: &[Point]) {
        self.baseline = match contacts {
            [] => None,
            [only] => Some(GestureBaseline::Pan { last: *only }),
            [a, b, ..] => Some(GestureBaseline::Pinch {
                centroid: a.midpoint(*b),
                distance: a.distance_to(*b),
            }),
        };
    }

    /// Apply contact movement since the last update.
    ///
    /// If the number of contacts no longer matches the baseline (a finger was
    /// added or lifted), the gesture re-baselines without moving.
    pub fn update_gesture(&mut self, contacts: &[Point]) {
        match (self.baseline, contacts) {
            (Some(GestureBaseline::Pan { last }), [current]) => {
                self.transform.translate_x += current.x - last.x;
                self.transform.translate_y += current.y - last.y;
                self.baseline = Some(GestureBaseline::Pan { last: *current });
            }
            (Some(GestureBaseline::Pinch { centroid, distance }), [a, b, ..]) => {
                let new_centroid = a.midpoint(*b);
                let new_distance = a.distance_to(*b);
                self.apply_pinch(centroid, distance, new_centroid, new_distance);
                self.baseline = Some(GestureBaseline::Pinch {
                    centroid: new_centroid,
                    distance: new_distance,
                });
            }
            _ => self.begin_gesture(contacts),
        }
        trace!(?self.transform, "gesture update");
    }

    /// Finish the gesture. The transform keeps its last value.
    pub fn end_gesture(&mut self) {
        self.baseline = None;
    }

    fn apply_pinch(&mut self, old_centroid: Point, old_distance: f32, centroid: Point, distance: f32) {
        let old_scale = self.transform.scale;
        let new_scale = if old_distance < MIN_PINCH_DISTANCE || distance < MIN_PINCH_DISTANCE {
            old_scale
        } else {
            self.clamp_scale(old_scale * (distance / old_distance))
        };
        let ratio = new_scale / old_scale;
        // The content point that sat under the old centroid ends up under the
        // new centroid, which also gives two-finger panning.
        let t = self.transform.translate();
        self.transform.translate_x = centroid.x - (old_centroid.x - t.x) * ratio;
        self.transform.translate_y = centroid.y - (old_centroid.y - t.y) * ratio;
        self.transform.scale = new_scale;
    }

    /// Scale the image to the viewport width minus `padding`, centered
    /// horizontally and aligned to the top edge.
    pub fn fit_to_screen(&mut self, native_width: f32, viewport_width: f32, padding: f32) {
        if native_width <= 0.0 || viewport_width <= 0.0 {
            return;
        }
        let scale = self.clamp_scale((viewport_width - padding) / native_width);
        self.transform = Transform {
            scale,
            translate_x: (viewport_width - native_width * scale) / 2.0,
            translate_y: 0.0,
        };
        self.baseline = None;
    }

    #[inline]
    pub fn to_content_space(&self, view: Point) -> Point {
        self.transform.to_content_space(view)
    }

    #[inline]
    pub fn to_view_space(&self, content: Point) -> Point {
        self.transform.to_view_space(content)
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}
