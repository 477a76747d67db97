//! Frame source seam and stream orientation.

/// 2D affine transform `[a b; c d] + (tx, ty)` describing the stream's
/// preferred display transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Pure rotation by `degrees`, counter-clockwise.
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Rotation angle encoded in the transform, in degrees within (-180, 180].
    pub fn rotation_degrees(&self) -> f64 {
        self.b.atan2(self.a).to_degrees()
    }
}

/// Image orientation handed to the tracker so it reads frames upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl Orientation {
    /// Derive the orientation from a display transform.
    ///
    /// Only quarter turns are recognized; anything else reads as `Up`.
    pub fn from_transform(transform: &AffineTransform) -> Self {
        let degrees = transform.rotation_degrees().round() as i64;
        match degrees {
            180 | -180 => Self::Down,
            90 => Self::Left,
            -90 => Self::Right,
            _ => Self::Up,
        }
    }
}

/// Sequential reader of decoded frames in presentation order.
pub trait FrameSource {
    /// Decoded image buffer type.
    type Frame;

    /// Next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> Option<Self::Frame>;

    /// Nominal frame rate in frames per second.
    fn frame_rate(&self) -> f32;

    /// Preferred display transform of the stream.
    fn orientation_transform(&self) -> AffineTransform;

    /// Rewind to the first frame. Returns `false` when the stream cannot be (re)opened.
    fn restart(&mut self) -> bool;
}
