//! Output seam towards the rendering layer.

use crate::integration::frame::AffineTransform;
use crate::tracker::FrameOutput;

/// Receives every fused frame and the end-of-session notification.
pub trait FrameSink<F> {
    /// Called once per emitted frame, seeding frame included.
    fn on_frame(&mut self, frame: &F, transform: &AffineTransform, output: &FrameOutput);

    /// Called when the session stops, whether by cancellation, end of stream or error.
    fn on_session_ended(&mut self) {}
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl<F> FrameSink<F> for NullSink {
    fn on_frame(&mut self, _frame: &F, _transform: &AffineTransform, _output: &FrameOutput) {}
}
