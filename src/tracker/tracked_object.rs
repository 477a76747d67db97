//! Live tracked objects and the ephemeral observations that feed them.

use std::fmt;

use uuid::Uuid;

use crate::tracker::palette::Color;
use crate::tracker::rect::Rect;

/// Opaque identity token naming a track.
///
/// A fresh token is minted for every detector observation; the tracker keeps
/// the token it was seeded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Identity(Uuid);

impl Identity {
    /// Mint a new random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outline style derived from the last update's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ConfidenceStyle {
    /// Confidence above the high-confidence threshold
    #[default]
    Solid,
    /// Confidence at or below the high-confidence threshold
    Dashed,
}

impl ConfidenceStyle {
    pub fn for_confidence(confidence: f32, high_confidence_threshold: f32) -> Self {
        if confidence > high_confidence_threshold {
            Self::Solid
        } else {
            Self::Dashed
        }
    }
}

/// One detector output for a single frame.
#[derive(Debug, Clone)]
pub struct DetectionObservation {
    /// Identity issued by the detector for this observation only
    pub identity: Identity,
    /// Best category reported by the detector
    pub category: String,
    /// Detector confidence for `category`
    pub confidence: f32,
    pub bbox: Rect,
}

impl DetectionObservation {
    pub fn new(category: impl Into<String>, confidence: f32, bbox: Rect) -> Self {
        Self {
            identity: Identity::new(),
            category: category.into(),
            confidence,
            bbox,
        }
    }

    /// Human-readable label, frozen onto any track created from this observation.
    pub fn label(&self) -> String {
        format!("{} {:.1}", self.category, self.confidence * 100.0)
    }
}

/// Result of one single-object tracker update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerUpdate {
    pub bbox: Rect,
    pub confidence: f32,
}

impl TrackerUpdate {
    pub fn new(bbox: Rect, confidence: f32) -> Self {
        Self { bbox, confidence }
    }
}

/// A live track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    pub identity: Identity,
    pub bbox: Rect,
    /// Category plus confidence suffix, fixed at detection time
    pub label: String,
    /// Birth-order number used for on-screen numbering and color selection
    pub display_index: u32,
    pub color: Color,
    pub style: ConfidenceStyle,
    /// Confidence of the last detection or tracker update
    pub confidence: f32,
}

impl TrackedObject {
    /// Create a track from a detection, taking over the detection's identity.
    pub fn from_detection(detection: &DetectionObservation, display_index: u32, color: Color) -> Self {
        Self {
            identity: detection.identity,
            bbox: detection.bbox,
            label: detection.label(),
            display_index,
            color,
            style: ConfidenceStyle::Solid,
            confidence: detection.confidence,
        }
    }

    /// Build the successor of `self` from a matching detection.
    ///
    /// The successor carries the detection's identity, box and label but keeps
    /// this track's display index and color.
    pub fn superseded_by(&self, detection: &DetectionObservation) -> Self {
        Self::from_detection(detection, self.display_index, self.color)
    }

    /// Apply a tracker update; the label and identity are kept.
    pub fn apply_update(&mut self, update: &TrackerUpdate, high_confidence_threshold: f32) {
        self.bbox = update.bbox;
        self.confidence = update.confidence;
        self.style = ConfidenceStyle::for_confidence(update.confidence, high_confidence_threshold);
    }

    pub fn center(&self) -> (f32, f32) {
        self.bbox.center()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::palette::color_at;

    #[test]
    fn test_label_format() {
        let det = DetectionObservation::new("car", 0.875, Rect::new(0.1, 0.1, 0.2, 0.2));
        assert_eq!(det.label(), "car 87.5");
    }

    #[test]
    fn test_style_boundary() {
        assert_eq!(ConfidenceStyle::for_confidence(0.71, 0.7), ConfidenceStyle::Solid);
        assert_eq!(ConfidenceStyle::for_confidence(0.7, 0.7), ConfidenceStyle::Dashed);
        assert_eq!(ConfidenceStyle::for_confidence(0.6, 0.7), ConfidenceStyle::Dashed);
    }

    #[test]
    fn test_apply_update_keeps_label_and_identity() {
        let det = DetectionObservation::new("person", 0.9, Rect::new(0.1, 0.1, 0.2, 0.2));
        let mut obj = TrackedObject::from_detection(&det, 3, color_at(3));
        let identity = obj.identity;

        obj.apply_update(&TrackerUpdate::new(Rect::new(0.12, 0.1, 0.2, 0.2), 0.6), 0.7);

        assert_eq!(obj.identity, identity);
        assert_eq!(obj.label, "person 90.0");
        assert_eq!(obj.style, ConfidenceStyle::Dashed);
        assert!((obj.bbox.x - 0.12).abs() < 1e-6);
    }

    #[test]
    fn test_superseded_by_inherits_index_and_color() {
        let first = DetectionObservation::new("bus", 0.8, Rect::new(0.1, 0.1, 0.3, 0.3));
        let obj = TrackedObject::from_detection(&first, 5, color_at(5));

        let second = DetectionObservation::new("bus", 0.95, Rect::new(0.12, 0.1, 0.3, 0.3));
        let next = obj.superseded_by(&second);

        assert_eq!(next.identity, second.identity);
        assert_ne!(next.identity, obj.identity);
        assert_eq!(next.display_index, 5);
        assert_eq!(next.color, obj.color);
        assert_eq!(next.label, "bus 95.0");
    }
}
