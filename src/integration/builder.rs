//! Builder for creating DetectionObservation objects from various box formats.

use crate::tracker::{DetectionObservation, Identity, Rect};

/// Builder for creating `DetectionObservation` objects.
///
/// Box coordinates are normalized with a bottom-left origin.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    category: String,
    confidence: f32,
    bbox: Rect,
    identity: Option<Identity>,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the confidence score.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set bounding box from its corners (min_x, min_y, max_x, max_y).
    pub fn min_max(mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        self.bbox = Rect::from_min_max(min_x, min_y, max_x, max_y);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(cx - w / 2.0, cy - h / 2.0, w, h);
        self
    }

    pub fn rect(mut self, bbox: Rect) -> Self {
        self.bbox = bbox;
        self
    }

    /// Use a specific identity instead of minting one.
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Build the final `DetectionObservation`.
    pub fn build(self) -> DetectionObservation {
        DetectionObservation {
            identity: self.identity.unwrap_or_default(),
            category: self.category,
            confidence: self.confidence,
            bbox: self.bbox,
        }
    }
}
