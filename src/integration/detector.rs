//! Traits for the detection and single-object tracking oracles.

use std::fmt::Display;

use crate::integration::frame::Orientation;
use crate::tracker::{DetectionObservation, Identity, Rect, TrackerUpdate, TrackingLevel};

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the fusion engine.
/// Every returned observation must carry a fresh [`Identity`].
///
/// # Example
///
/// ```ignore
/// use fusetrack_rs::{Detector, DetectionObservation};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl Detector<MyFrame> for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &MyFrame) -> Result<Vec<DetectionObservation>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Detector<F> {
    /// Error type for detection failures.
    type Error: Display;

    /// Run inference on one frame.
    fn detect(&mut self, frame: &F) -> Result<Vec<DetectionObservation>, Self::Error>;
}

/// One tracker update request for a single live track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackRequest {
    pub identity: Identity,
    /// Last known box of the track
    pub prior: Rect,
    /// Orientation of the frame being tracked
    pub orientation: Orientation,
    pub level: TrackingLevel,
}

/// Trait for single-object trackers.
///
/// Called once per live track per frame with the track's last known box.
/// An `Err` marks that object as lost for this frame; it does not affect
/// any other object.
pub trait ObjectTracker<F> {
    /// Error type for tracking failures.
    type Error: Display;

    fn update(&mut self, frame: &F, request: &TrackRequest) -> Result<TrackerUpdate, Self::Error>;

    /// Forget any per-object state. Called when the session restarts.
    fn reset(&mut self) {}
}
