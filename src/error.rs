//! Error type shared by the fusion engine and the session controller.

use crate::tracker::Identity;

/// Errors raised while fusing detections and tracklets.
///
/// `DetectorInvocationFailed` and `TrackerInvocationFailed` are absorbed by the
/// frame loop: they are logged and reported in the frame output but never
/// returned from [`Session::run`](crate::Session::run).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FusionError {
    /// The frame source could not be opened or restarted.
    #[error("frame source could not be initialized")]
    SourceInitFailed,

    /// The frame source yielded no frames at all.
    #[error("frame source produced no first frame")]
    FirstFrameUnavailable,

    /// One detection pass failed.
    #[error("detector invocation failed: {0}")]
    DetectorInvocationFailed(String),

    /// One object's tracker update failed.
    #[error("tracker invocation failed for {identity}: {reason}")]
    TrackerInvocationFailed { identity: Identity, reason: String },

    /// The track table stayed empty after tracking for too many consecutive frames.
    #[error("all tracked objects lost for {frames} consecutive frames")]
    AllObjectsLost { frames: u32 },

    /// The assignment solver was handed a matrix with no rows or no columns.
    #[error("cannot solve assignment over a {rows}x{cols} matrix")]
    EmptyCostMatrix { rows: usize, cols: usize },

    /// The underlying linear assignment routine rejected the matrix.
    #[error("assignment solver failed: {0}")]
    AssignmentFailed(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An identity was inserted twice into the track table.
    #[error("identity {0} is already tracked")]
    DuplicateIdentity(Identity),

    /// An identity was looked up that the track table does not hold.
    #[error("identity {0} is not tracked")]
    UnknownIdentity(Identity),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FusionError>;
