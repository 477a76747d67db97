//! Tunables for the fusion engine and the session loop.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// Traffic-related categories accepted by default.
pub const DEFAULT_CATEGORIES: [&str; 6] = ["person", "bicycle", "car", "motorcycle", "bus", "truck"];

/// Accuracy/speed trade-off requested from the single-object tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingLevel {
    #[default]
    Accurate,
    Fast,
}

/// Configuration for the [`FusionEngine`](crate::FusionEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Detector categories that may become tracks. Empty accepts every category.
    pub allowed_categories: HashSet<String>,
    /// Run the detector every K-th tracked frame.
    pub detection_interval: u32,
    /// Ceiling on live tracks.
    pub max_tracks: usize,
    /// Tracker confidence above which a track is drawn solid.
    pub high_confidence_threshold: f32,
    /// Tracker confidence at or below which a track is dropped.
    pub drop_threshold: f32,
    /// IoU below which a detection/track pair counts as unrelated.
    pub iou_threshold: f32,
    /// Stop the session once the table has been empty after tracking for this
    /// many consecutive frames. `None` keeps running and relies on detection
    /// to re-acquire objects.
    pub max_empty_frames: Option<u32>,
    /// Sleep one nominal frame period after each emitted frame.
    pub pace_to_frame_rate: bool,
    /// Passed to the tracker with every update request.
    pub tracking_level: TrackingLevel,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            allowed_categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            detection_interval: 3,
            max_tracks: 8,
            high_confidence_threshold: 0.7,
            drop_threshold: 0.5,
            iou_threshold: 0.1,
            max_empty_frames: None,
            pace_to_frame_rate: false,
            tracking_level: TrackingLevel::Accurate,
        }
    }
}

impl FusionConfig {
    pub fn with_allowed_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_detection_interval(mut self, interval: u32) -> Self {
        self.detection_interval = interval;
        self
    }

    pub fn with_max_tracks(mut self, max_tracks: usize) -> Self {
        self.max_tracks = max_tracks;
        self
    }

    pub fn with_thresholds(mut self, high_confidence: f32, drop: f32, iou: f32) -> Self {
        self.high_confidence_threshold = high_confidence;
        self.drop_threshold = drop;
        self.iou_threshold = iou;
        self
    }

    pub fn with_max_empty_frames(mut self, frames: Option<u32>) -> Self {
        self.max_empty_frames = frames;
        self
    }

    pub fn with_pacing(mut self, pace: bool) -> Self {
        self.pace_to_frame_rate = pace;
        self
    }

    pub fn with_tracking_level(mut self, level: TrackingLevel) -> Self {
        self.tracking_level = level;
        self
    }

    /// Whether detections of `category` may become tracks.
    pub fn accepts(&self, category: &str) -> bool {
        self.allowed_categories.is_empty() || self.allowed_categories.contains(category)
    }

    pub fn validate(&self) -> Result<()> {
        if self.detection_interval == 0 {
            return Err(FusionError::InvalidConfig(
                "detection_interval must be positive".to_string(),
            ));
        }
        if self.max_tracks == 0 {
            return Err(FusionError::InvalidConfig(
                "max_tracks must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("high_confidence_threshold", self.high_confidence_threshold),
            ("drop_threshold", self.drop_threshold),
            ("iou_threshold", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FusionError::InvalidConfig(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.max_empty_frames == Some(0) {
            return Err(FusionError::InvalidConfig(
                "max_empty_frames must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}
