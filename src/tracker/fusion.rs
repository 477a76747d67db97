//! Per-frame fusion of tracker updates and periodic detections.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::error::{FusionError, Result};
use crate::integration::{Detector, ObjectTracker, Orientation, TrackRequest};
use crate::tracker::config::FusionConfig;
use crate::tracker::matching::{PairKind, solve_assignment};
use crate::tracker::palette::color_at;
use crate::tracker::rect::{Rect, iou_matrix};
use crate::tracker::track_table::TrackTable;
use crate::tracker::tracked_object::{DetectionObservation, Identity, TrackedObject, TrackerUpdate};

/// Map from a detector-issued identity to the identity it superseded.
///
/// Only valid for the frame it was produced in. Consumers that key history by
/// identity re-key `old` entries under `new`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityRemap(HashMap<Identity, Identity>);

impl IdentityRemap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, new: Identity, old: Identity) {
        self.0.insert(new, old);
    }

    /// Identity that `new` replaced this frame, if any.
    pub fn old_identity(&self, new: &Identity) -> Option<&Identity> {
        self.0.get(new)
    }

    /// Iterate `(new, old)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &Identity)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Wall-clock cost of the two oracle phases of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTimings {
    pub tracking: Duration,
    /// `None` when the detector did not run this frame
    pub detection: Option<Duration>,
}

impl FrameTimings {
    pub fn tracking_fps(&self) -> Option<f64> {
        rate(self.tracking)
    }

    pub fn detection_fps(&self) -> Option<f64> {
        self.detection.and_then(rate)
    }
}

fn rate(elapsed: Duration) -> Option<f64> {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { Some(1.0 / secs) } else { None }
}

/// Outcome of reconciling one batch of detections against the table.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub remap: IdentityRemap,
    /// Tracks created from unmatched detections
    pub births: usize,
    /// Tracks superseded by a matching detection
    pub matches: usize,
    /// Detections discarded because the table was full
    pub dropped: usize,
}

/// Rendering-ready result of one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    /// 0 for the seeding frame, then 1, 2, ... for tracked frames
    pub frame_index: u64,
    /// Live tracks in display order
    pub objects: Vec<TrackedObject>,
    pub remap: IdentityRemap,
    pub detection_ran: bool,
    pub births: usize,
    pub matches: usize,
    /// Tracks removed for low confidence or tracker failure
    pub lost: usize,
    pub dropped: usize,
    pub tracker_failures: usize,
    pub detector_failed: bool,
    pub timings: FrameTimings,
}

/// Fuses per-frame tracker updates with periodic detections into stable tracks.
pub struct FusionEngine {
    config: FusionConfig,
    table: TrackTable,
    frame_count: u64,
    consecutive_empty_frames: u32,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table: TrackTable::new(config.max_tracks),
            config,
            frame_count: 0,
            consecutive_empty_frames: 0,
        })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn table(&self) -> &TrackTable {
        &self.table
    }

    /// Number of tracked frames since the last seed.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Consecutive frames that ended Phase A with an empty table.
    pub fn consecutive_empty_frames(&self) -> u32 {
        self.consecutive_empty_frames
    }

    /// Clear all tracks and counters.
    pub fn reset(&mut self) {
        self.table.reset();
        self.frame_count = 0;
        self.consecutive_empty_frames = 0;
    }

    /// Reset and seed the table from first-frame detections.
    pub fn seed(&mut self, detections: Vec<DetectionObservation>) -> FrameOutput {
        self.reset();
        let reconciliation = self.reconcile(detections);
        debug!(
            tracks = self.table.len(),
            dropped = reconciliation.dropped,
            "seeded track table"
        );
        FrameOutput {
            frame_index: 0,
            objects: self.table.snapshot(),
            remap: reconciliation.remap,
            detection_ran: true,
            births: reconciliation.births,
            matches: reconciliation.matches,
            dropped: reconciliation.dropped,
            ..FrameOutput::default()
        }
    }

    /// Run tracking, periodic detection and reconciliation for one frame.
    pub fn process_frame<F, D, T>(
        &mut self,
        frame: &F,
        orientation: Orientation,
        detector: &mut D,
        tracker: &mut T,
    ) -> FrameOutput
    where
        D: Detector<F>,
        T: ObjectTracker<F>,
    {
        self.frame_count += 1;

        // Phase A: one tracker update per live track.
        let started = Instant::now();
        let requests: Vec<(Identity, Rect)> = self
            .table
            .ordered()
            .into_iter()
            .take(self.config.max_tracks)
            .map(|o| (o.identity, o.bbox))
            .collect();

        let mut tracker_failures = 0;
        let mut results = Vec::with_capacity(requests.len());
        for (identity, prior) in requests {
            let request = TrackRequest {
                identity,
                prior,
                orientation,
                level: self.config.tracking_level,
            };
            match tracker.update(frame, &request) {
                Ok(update) => results.push((identity, Some(update))),
                Err(e) => {
                    tracker_failures += 1;
                    let err = FusionError::TrackerInvocationFailed {
                        identity,
                        reason: e.to_string(),
                    };
                    warn!(frame = self.frame_count, error = %err, "dropping track");
                    results.push((identity, None));
                }
            }
        }
        let lost = self.apply_tracker_results(results);
        let tracking = started.elapsed();

        if self.table.is_empty() {
            self.consecutive_empty_frames += 1;
            debug!(
                frame = self.frame_count,
                empty_frames = self.consecutive_empty_frames,
                "no live tracks after tracking"
            );
        } else {
            self.consecutive_empty_frames = 0;
        }

        // Phase B/C: periodic detection and reconciliation.
        let mut reconciliation = Reconciliation::default();
        let mut detection = None;
        let mut detector_failed = false;
        let detection_ran = self.frame_count % u64::from(self.config.detection_interval) == 0;

        if detection_ran {
            let started = Instant::now();
            match detector.detect(frame) {
                Ok(detections) => reconciliation = self.reconcile(detections),
                Err(e) => {
                    detector_failed = true;
                    let err = FusionError::DetectorInvocationFailed(e.to_string());
                    warn!(frame = self.frame_count, error = %err, "skipping detection pass");
                }
            }
            detection = Some(started.elapsed());
        }

        debug!(
            frame = self.frame_count,
            tracks = self.table.len(),
            lost,
            births = reconciliation.births,
            matches = reconciliation.matches,
            "frame processed"
        );

        FrameOutput {
            frame_index: self.frame_count,
            objects: self.table.snapshot(),
            remap: reconciliation.remap,
            detection_ran,
            births: reconciliation.births,
            matches: reconciliation.matches,
            lost,
            dropped: reconciliation.dropped,
            tracker_failures,
            detector_failed,
            timings: FrameTimings {
                tracking,
                detection,
            },
        }
    }

    /// Apply Phase A results. `None` marks a tracker failure.
    ///
    /// Returns the number of tracks removed.
    pub fn apply_tracker_results(&mut self, results: Vec<(Identity, Option<TrackerUpdate>)>) -> usize {
        let mut lost = 0;
        for (identity, update) in results {
            match update {
                Some(update) if update.confidence > self.config.drop_threshold => {
                    if let Some(object) = self.table.get_mut(&identity) {
                        object.apply_update(&update, self.config.high_confidence_threshold);
                    }
                }
                _ => {
                    if self.table.remove(&identity).is_some() {
                        trace!(%identity, "track lost");
                        lost += 1;
                    }
                }
            }
        }
        lost
    }

    /// Reconcile one batch of detections against the live tracks.
    ///
    /// Detections outside the category allow-list are discarded first. With an
    /// empty table every remaining detection is born directly; otherwise
    /// detections and tracks are matched on thresholded IoU.
    pub fn reconcile(&mut self, detections: Vec<DetectionObservation>) -> Reconciliation {
        let detections: Vec<DetectionObservation> = detections
            .into_iter()
            .filter(|d| self.config.accepts(&d.category))
            .collect();

        let mut outcome = Reconciliation::default();
        if detections.is_empty() {
            return outcome;
        }

        if self.table.is_empty() {
            for detection in &detections {
                self.birth(detection, &mut outcome);
            }
            return outcome;
        }

        let tracks: Vec<(Identity, Rect)> = self
            .table
            .ordered()
            .into_iter()
            .map(|o| (o.identity, o.bbox))
            .collect();
        let det_boxes: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
        let track_boxes: Vec<Rect> = tracks.iter().map(|(_, bbox)| *bbox).collect();
        let weights = iou_matrix(&det_boxes, &track_boxes, self.config.iou_threshold);

        debug!(
            rows = weights.nrows(),
            cols = weights.ncols(),
            "solving detection/track assignment"
        );

        let assignment = match solve_assignment(&weights) {
            Ok(assignment) => assignment,
            Err(e) => {
                warn!(error = %e, "assignment failed; keeping tracks unchanged");
                return outcome;
            }
        };

        for pair in &assignment.pairs {
            match pair.kind {
                PairKind::Matched if pair.weight > 0.0 => {
                    let detection = &detections[pair.row];
                    let (old, _) = tracks[pair.col];
                    self.supersede(&old, detection, &mut outcome);
                }
                PairKind::Matched | PairKind::UnmatchedRow => {
                    self.birth(&detections[pair.row], &mut outcome);
                }
                PairKind::UnmatchedColumn => {
                    trace!(track = %tracks[pair.col].0, "no detection for track");
                }
            }
        }

        outcome
    }

    fn supersede(&mut self, old: &Identity, detection: &DetectionObservation, outcome: &mut Reconciliation) {
        let Some(successor) = self.table.get(old).map(|t| t.superseded_by(detection)) else {
            return;
        };
        match self.table.replace(old, successor) {
            Ok(previous) => {
                trace!(
                    old = %old,
                    new = %detection.identity,
                    display_index = previous.display_index,
                    "detection matched track"
                );
                outcome.remap.insert(detection.identity, *old);
                outcome.matches += 1;
            }
            Err(e) => warn!(error = %e, "could not replace matched track"),
        }
    }

    fn birth(&mut self, detection: &DetectionObservation, outcome: &mut Reconciliation) {
        if !self.table.has_capacity() {
            outcome.dropped += 1;
            return;
        }
        if self.table.contains(&detection.identity) {
            warn!(error = %FusionError::DuplicateIdentity(detection.identity), "ignoring detection");
            outcome.dropped += 1;
            return;
        }
        let display_index = self.table.allocate_display_index();
        let object = TrackedObject::from_detection(detection, display_index, color_at(display_index));
        match self.table.insert(object) {
            Ok(()) => {
                trace!(identity = %detection.identity, display_index, "track born");
                outcome.births += 1;
            }
            Err(e) => {
                warn!(error = %e, "ignoring detection");
                outcome.dropped += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::config::TrackingLevel;
    use crate::tracker::tracked_object::ConfidenceStyle;

    fn det(category: &str, x: f32, y: f32) -> DetectionObservation {
        DetectionObservation::new(category, 0.9, Rect::new(x, y, 0.1, 0.1))
    }

    fn engine() -> FusionEngine {
        FusionEngine::new(FusionConfig::default()).unwrap()
    }

    #[test]
    fn test_cold_start_sequential_indices() {
        let mut engine = engine();
        let out = engine.seed(vec![det("car", 0.0, 0.0), det("bus", 0.3, 0.3), det("person", 0.6, 0.6)]);
        assert_eq!(out.births, 3);
        let indices: Vec<u32> = out.objects.iter().map(|o| o.display_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(out.objects[1].color, color_at(1));
    }

    #[test]
    fn test_category_filter() {
        let mut engine = engine();
        let out = engine.seed(vec![det("dog", 0.0, 0.0), det("car", 0.3, 0.3)]);
        assert_eq!(out.objects.len(), 1);
        assert!(out.objects[0].label.starts_with("car"));
    }

    #[test]
    fn test_ceiling_drops_extra_births() {
        let mut engine = engine();
        let dets: Vec<_> = (0..10).map(|i| det("car", i as f32 * 0.09, 0.0)).collect();
        let out = engine.seed(dets);
        assert_eq!(out.objects.len(), 8);
        assert_eq!(out.dropped, 2);
        assert_eq!(engine.table().next_display_index(), 8);
    }

    #[test]
    fn test_ceiling_applies_to_births_after_seeding() {
        let mut engine = engine();
        let seeded: Vec<_> = (0..7).map(|i| det("car", i as f32 * 0.12, 0.0)).collect();
        engine.seed(seeded);
        assert_eq!(engine.table().len(), 7);

        let rec = engine.reconcile(vec![det("car", 0.0, 0.8), det("car", 0.3, 0.8), det("car", 0.6, 0.8)]);

        assert_eq!(rec.births, 1);
        assert_eq!(rec.dropped, 2);
        assert_eq!(rec.matches, 0);
        assert_eq!(engine.table().len(), 8);
        assert_eq!(engine.table().next_display_index(), 8);
    }

    #[test]
    fn test_full_table_still_accepts_genuine_match() {
        let mut engine = engine();
        let seeded: Vec<_> = (0..8).map(|i| det("car", i as f32 * 0.12, 0.0)).collect();
        let out = engine.seed(seeded);
        let old = out.objects[2].clone();

        let moved = det("car", 0.241, 0.0);
        let new_identity = moved.identity;
        let rec = engine.reconcile(vec![moved, det("bus", 0.5, 0.8)]);

        assert_eq!(rec.matches, 1);
        assert_eq!(rec.births, 0);
        assert_eq!(rec.dropped, 1);
        assert_eq!(rec.remap.old_identity(&new_identity), Some(&old.identity));
        assert_eq!(engine.table().get(&new_identity).unwrap().display_index, 2);
        assert_eq!(engine.table().len(), 8);
        assert_eq!(engine.table().next_display_index(), 8);
    }

    struct NoDetections;

    impl Detector<()> for NoDetections {
        type Error = String;

        fn detect(&mut self, _frame: &()) -> std::result::Result<Vec<DetectionObservation>, String> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingTracker {
        requests: Vec<TrackRequest>,
    }

    impl ObjectTracker<()> for RecordingTracker {
        type Error = String;

        fn update(&mut self, _frame: &(), request: &TrackRequest) -> std::result::Result<TrackerUpdate, String> {
            self.requests.push(*request);
            Ok(TrackerUpdate::new(request.prior, 0.9))
        }
    }

    #[test]
    fn test_tracker_receives_level_and_orientation() {
        let config = FusionConfig::default().with_tracking_level(TrackingLevel::Fast);
        let mut engine = FusionEngine::new(config).unwrap();
        let out = engine.seed(vec![det("car", 0.0, 0.0), det("car", 0.5, 0.5)]);

        let mut tracker = RecordingTracker::default();
        engine.process_frame(&(), Orientation::Left, &mut NoDetections, &mut tracker);

        assert_eq!(tracker.requests.len(), 2);
        for (request, object) in tracker.requests.iter().zip(&out.objects) {
            assert_eq!(request.identity, object.identity);
            assert_eq!(request.prior, object.bbox);
            assert_eq!(request.orientation, Orientation::Left);
            assert_eq!(request.level, TrackingLevel::Fast);
        }
    }

    #[test]
    fn test_drop_threshold_is_exclusive() {
        let mut engine = engine();
        let out = engine.seed(vec![det("car", 0.0, 0.0), det("car", 0.5, 0.5)]);
        let a = out.objects[0].identity;
        let b = out.objects[1].identity;

        let lost = engine.apply_tracker_results(vec![
            (a, Some(TrackerUpdate::new(Rect::new(0.01, 0.0, 0.1, 0.1), 0.5))),
            (b, Some(TrackerUpdate::new(Rect::new(0.51, 0.5, 0.1, 0.1), 0.51))),
        ]);

        assert_eq!(lost, 1);
        assert!(!engine.table().contains(&a));
        let survivor = engine.table().get(&b).unwrap();
        assert_eq!(survivor.style, ConfidenceStyle::Dashed);
    }

    #[test]
    fn test_tracker_failure_removes_only_that_track() {
        let mut engine = engine();
        let out = engine.seed(vec![det("car", 0.0, 0.0), det("car", 0.5, 0.5)]);
        let a = out.objects[0].identity;
        let b = out.objects[1].identity;

        engine.apply_tracker_results(vec![
            (a, None),
            (b, Some(TrackerUpdate::new(Rect::new(0.5, 0.5, 0.1, 0.1), 0.9))),
        ]);

        assert_eq!(engine.table().len(), 1);
        assert_eq!(engine.table().get(&b).unwrap().style, ConfidenceStyle::Solid);
    }

    #[test]
    fn test_genuine_match_inherits_index_and_color() {
        let mut engine = engine();
        let out = engine.seed(vec![det("car", 0.0, 0.0), det("car", 0.5, 0.5)]);
        let old = out.objects[1].clone();

        let moved = det("car", 0.51, 0.5);
        let new_identity = moved.identity;
        let rec = engine.reconcile(vec![moved]);

        assert_eq!(rec.matches, 1);
        assert_eq!(rec.births, 0);
        assert_eq!(rec.remap.old_identity(&new_identity), Some(&old.identity));
        let successor = engine.table().get(&new_identity).unwrap();
        assert_eq!(successor.display_index, old.display_index);
        assert_eq!(successor.color, old.color);
        assert!(!engine.table().contains(&old.identity));
        // Unmatched track stays untouched.
        assert_eq!(engine.table().len(), 2);
    }

    #[test]
    fn test_zero_iou_match_is_birth() {
        let mut engine = engine();
        engine.seed(vec![det("car", 0.0, 0.0)]);

        let far = det("truck", 0.8, 0.8);
        let rec = engine.reconcile(vec![far.clone()]);

        assert_eq!(rec.births, 1);
        assert!(rec.remap.is_empty());
        assert_eq!(engine.table().get(&far.identity).unwrap().display_index, 1);
        assert_eq!(engine.table().len(), 2);
    }

    #[test]
    fn test_more_detections_than_tracks() {
        let mut engine = engine();
        engine.seed(vec![det("car", 0.0, 0.0)]);

        let rec = engine.reconcile(vec![det("car", 0.6, 0.6), det("car", 0.005, 0.0), det("bus", 0.3, 0.3)]);

        assert_eq!(rec.matches, 1);
        assert_eq!(rec.births, 2);
        let indices: Vec<u32> = engine.table().ordered().iter().map(|o| o.display_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_reconcile_empty_detections_is_noop() {
        let mut engine = engine();
        engine.seed(vec![det("car", 0.0, 0.0)]);
        let rec = engine.reconcile(vec![det("dog", 0.0, 0.0)]);
        assert_eq!((rec.births, rec.matches), (0, 0));
        assert_eq!(engine.table().len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FusionConfig::default().with_detection_interval(0);
        assert!(matches!(
            FusionEngine::new(config),
            Err(FusionError::InvalidConfig(_))
        ));
    }
}
