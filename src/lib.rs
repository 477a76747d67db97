//! Fuses periodic object detections with per-frame single-object tracking.
//!
//! A detector runs every few frames and reports categorized boxes; a
//! single-object tracker follows each live object on every frame. The
//! [`FusionEngine`] keeps one [`TrackedObject`] per identity, matches fresh
//! detections to live tracks with an IoU assignment, and reports an
//! [`IdentityRemap`] whenever a detection supersedes a track so consumers can
//! carry per-identity history forward.
//!
//! [`Session`] wraps the engine with a [`FrameSource`], the two oracles and a
//! [`FrameSink`], and owns the seed/run/cancel lifecycle.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{FusionError, Result};
pub use integration::{
    AffineTransform, CancelHandle, DetectionBuilder, Detector, FrameSink, FrameSource, NullSink,
    ObjectTracker, Orientation, Session, SessionState, SessionSummary, TrackRequest,
    TrajectoryStore,
};
pub use tracker::{
    Color, ConfidenceStyle, DetectionObservation, FrameOutput, FrameTimings, FusionConfig,
    FusionEngine, Identity, IdentityRemap, Rect, TrackTable, TrackedObject, TrackerUpdate,
    TrackingLevel,
};
