//! Integration module connecting frame sources, detectors, trackers and
//! renderers to the fusion engine.
//!
//! The detector and single-object tracker are treated as black-box oracles;
//! this module only defines their seams and the session loop that drives them.

mod builder;
mod detector;
mod frame;
mod session;
mod sink;
mod trajectory;

pub use builder::DetectionBuilder;
pub use detector::{Detector, ObjectTracker, TrackRequest};
pub use frame::{AffineTransform, FrameSource, Orientation};
pub use session::{CancelHandle, Session, SessionState, SessionSummary};
pub use sink::{FrameSink, NullSink};
pub use trajectory::TrajectoryStore;
