mod config;
mod fusion;
mod matching;
mod palette;
mod rect;
mod track_table;
mod tracked_object;

pub use config::{DEFAULT_CATEGORIES, FusionConfig, TrackingLevel};
pub use fusion::{FrameOutput, FrameTimings, FusionEngine, IdentityRemap, Reconciliation};
pub use matching::{AssignedPair, Assignment, PairKind, solve_assignment};
pub use palette::{Color, PALETTE, color_at};
pub use rect::{Rect, intersection_over_union, iou_matrix};
pub use track_table::TrackTable;
pub use tracked_object::{
    ConfidenceStyle, DetectionObservation, Identity, TrackedObject, TrackerUpdate,
};
