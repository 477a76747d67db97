//! Session controller driving the frame loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{FusionError, Result};
use crate::integration::frame::{FrameSource, Orientation};
use crate::integration::sink::FrameSink;
use crate::integration::{Detector, ObjectTracker};
use crate::tracker::{FrameOutput, FusionConfig, FusionEngine};

/// Lifecycle of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing read yet.
    #[default]
    Idle,
    /// First frame detected and the table seeded; `run` continues from frame two.
    Seeding,
    /// Inside the frame loop.
    Running,
    /// Loop exited by cancellation, end of stream or a fatal error.
    Stopped,
}

/// Cloneable handle that asks a running session to stop after the current frame.
///
/// Obtained from [`Session::cancel_handle`] before calling `run`, then
/// triggered from the sink or another thread while the loop holds the session.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// How a `run` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    /// Tracked frames processed after the seeding frame
    pub frames_processed: u64,
    pub detection_passes: u64,
    /// True when the loop exited through a [`CancelHandle`]
    pub cancelled: bool,
}

/// Bundles a frame source, the two oracles and an output sink around one
/// [`FusionEngine`].
///
/// Each session owns its engine; two videos need two sessions.
pub struct Session<S, D, T, K>
where
    S: FrameSource,
    D: Detector<S::Frame>,
    T: ObjectTracker<S::Frame>,
    K: FrameSink<S::Frame>,
{
    source: S,
    detector: D,
    tracker: T,
    sink: K,
    engine: FusionEngine,
    state: SessionState,
    cancel: CancelHandle,
}

impl<S, D, T, K> Session<S, D, T, K>
where
    S: FrameSource,
    D: Detector<S::Frame>,
    T: ObjectTracker<S::Frame>,
    K: FrameSink<S::Frame>,
{
    /// Create a new session. Fails on an invalid configuration.
    pub fn new(source: S, detector: D, tracker: T, sink: K, config: FusionConfig) -> Result<Self> {
        Ok(Self {
            source,
            detector,
            tracker,
            sink,
            engine: FusionEngine::new(config)?,
            state: SessionState::Idle,
            cancel: CancelHandle::default(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Rewind the source, detect on the first frame and seed the track table.
    ///
    /// Resets every track and counter. The seeded frame is emitted to the sink.
    pub fn seed(&mut self) -> Result<FrameOutput> {
        if !self.source.restart() {
            self.state = SessionState::Stopped;
            return Err(FusionError::SourceInitFailed);
        }
        let Some(frame) = self.source.next_frame() else {
            self.state = SessionState::Stopped;
            return Err(FusionError::FirstFrameUnavailable);
        };

        self.tracker.reset();
        let detections = match self.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                let err = FusionError::DetectorInvocationFailed(e.to_string());
                warn!(error = %err, "first-frame detection failed; starting empty");
                Vec::new()
            }
        };
        let output = self.engine.seed(detections);

        let transform = self.source.orientation_transform();
        self.sink.on_frame(&frame, &transform, &output);
        self.state = SessionState::Seeding;
        info!(tracks = output.objects.len(), "session seeded");
        Ok(output)
    }

    /// Run the frame loop until cancellation or end of stream.
    ///
    /// Seeds first unless [`Session::seed`] was called since the last stop.
    /// Clears any earlier cancellation request before starting. The sink is
    /// told the session ended on every exit, a failed seed included.
    pub fn run(&mut self) -> Result<SessionSummary> {
        self.cancel.clear();
        if self.state != SessionState::Seeding {
            if let Err(e) = self.seed() {
                self.sink.on_session_ended();
                return Err(e);
            }
        }
        self.state = SessionState::Running;

        let transform = self.source.orientation_transform();
        let orientation = Orientation::from_transform(&transform);
        let period = frame_period(self.source.frame_rate());
        let mut summary = SessionSummary::default();

        let result = loop {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                info!(frames = summary.frames_processed, "tracking cancelled");
                break Ok(summary);
            }
            let Some(frame) = self.source.next_frame() else {
                info!(frames = summary.frames_processed, "end of stream");
                break Ok(summary);
            };

            let output = self.engine.process_frame(
                &frame,
                orientation,
                &mut self.detector,
                &mut self.tracker,
            );
            summary.frames_processed += 1;
            if output.detection_ran {
                summary.detection_passes += 1;
            }
            self.sink.on_frame(&frame, &transform, &output);

            if let Some(limit) = self.engine.config().max_empty_frames {
                let empty = self.engine.consecutive_empty_frames();
                if empty >= limit {
                    break Err(FusionError::AllObjectsLost { frames: empty });
                }
            }

            if self.engine.config().pace_to_frame_rate {
                if let Some(period) = period {
                    std::thread::sleep(period);
                }
            }
        };

        self.state = SessionState::Stopped;
        self.sink.on_session_ended();
        result
    }

    /// Handle for cancelling from another thread or from inside the sink.
    ///
    /// A request made before `run` is discarded when the loop starts.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn engine(&self) -> &FusionEngine {
        &self.engine
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }
}

fn frame_period(frame_rate: f32) -> Option<Duration> {
    if frame_rate.is_finite() && frame_rate > 0.0 {
        Some(Duration::from_secs_f32(1.0 / frame_rate))
    } else {
        None
    }
}
