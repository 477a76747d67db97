/// Axis-aligned bounding box in normalized image coordinates.
///
/// The origin is the bottom-left corner of the frame, which is the native
/// space of both the detector and the tracker:
/// - `x`, `y`: minimum corner (left, bottom)
/// - `width`, `height`: extents towards the top-right
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from its bottom-left corner and dimensions.
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from its minimum and maximum corners.
    #[inline]
    pub fn from_min_max(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x() + self.max_x()) / 2.0,
            (self.min_y() + self.max_y()) / 2.0,
        )
    }

    /// Get the area of the bounding box, computed from its extents.
    #[inline]
    pub fn area(&self) -> f32 {
        (self.max_x() - self.min_x()) * (self.max_y() - self.min_y())
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    pub fn iou(&self, other: &Rect) -> f32 {
        let x1 = self.min_x().max(other.min_x());
        let y1 = self.min_y().max(other.min_y());
        let x2 = self.max_x().min(other.max_x());
        let y2 = self.max_y().min(other.max_y());

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }
}

/// IoU of two boxes with a hard cutoff folded into the value.
///
/// Returns 0 when the overlap is below `threshold`, so the assignment solver
/// sees unrelated boxes as a true zero weight rather than a small positive one.
pub fn intersection_over_union(a: &Rect, b: &Rect, threshold: f32) -> f32 {
    let iou = a.iou(b);
    if iou < threshold { 0.0 } else { iou }
}

use ndarray::Array2;

/// Calculate the thresholded IoU weight matrix between detections and tracks.
///
/// Returns a matrix of shape (R, C) where R is the length of `detections`
/// and C is the length of `tracks`.
pub fn iou_matrix(detections: &[Rect], tracks: &[Rect], threshold: f32) -> Array2<f64> {
    let mut weights = Array2::zeros((detections.len(), tracks.len()));
    for (i, d) in detections.iter().enumerate() {
        for (j, t) in tracks.iter().enumerate() {
            weights[[i, j]] = intersection_over_union(d, t, threshold) as f64;
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_min_max() {
        let rect = Rect::from_min_max(0.1, 0.2, 0.4, 0.6);
        assert!((rect.width - 0.3).abs() < 1e-6);
        assert!((rect.height - 0.4).abs() < 1e-6);
        assert!((rect.max_x() - 0.4).abs() < 1e-6);
        assert!((rect.max_y() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_center() {
        let rect = Rect::new(0.2, 0.4, 0.2, 0.2);
        let (cx, cy) = rect.center();
        assert!((cx - 0.3).abs() < 1e-6);
        assert!((cy - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_iou() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);

        // Intersection: 5x5 = 25
        // Union: 100 + 100 - 25 = 175
        let iou = a.iou(&b);
        assert!((iou - 25.0 / 175.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = Rect::new(0.0, 0.0, 0.1, 0.1);
        let b = Rect::new(0.5, 0.5, 0.1, 0.1);
        assert_eq!(a.iou(&b), 0.0);
        assert_eq!(intersection_over_union(&a, &b, 0.0), 0.0);
    }

    #[test]
    fn test_iou_touching_edges() {
        let a = Rect::new(0.0, 0.0, 0.5, 0.5);
        let b = Rect::new(0.5, 0.0, 0.5, 0.5);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_same_box() {
        let a = Rect::new(0.1, 0.2, 0.3, 0.4);
        assert!((intersection_over_union(&a, &a, 0.1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_symmetric() {
        let a = Rect::new(0.1, 0.1, 0.4, 0.3);
        let b = Rect::new(0.2, 0.15, 0.5, 0.5);
        assert_eq!(a.iou(&b), b.iou(&a));
        assert_eq!(
            intersection_over_union(&a, &b, 0.1),
            intersection_over_union(&b, &a, 0.1)
        );
    }

    #[test]
    fn test_threshold_is_hard_cutoff() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        // Raw IoU ~0.1428
        assert_eq!(intersection_over_union(&a, &b, 0.2), 0.0);
        let kept = intersection_over_union(&a, &b, 0.1);
        assert!((kept - 25.0 / 175.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_matrix_shape() {
        let dets = [Rect::new(0.0, 0.0, 0.2, 0.2), Rect::new(0.5, 0.5, 0.2, 0.2)];
        let tracks = [
            Rect::new(0.0, 0.0, 0.2, 0.2),
            Rect::new(0.8, 0.8, 0.1, 0.1),
            Rect::new(0.5, 0.5, 0.2, 0.2),
        ];
        let m = iou_matrix(&dets, &tracks, 0.1);
        assert_eq!(m.dim(), (2, 3));
        assert!((m[[0, 0]] - 1.0).abs() < 1e-6);
        assert_eq!(m[[0, 1]], 0.0);
        assert!((m[[1, 2]] - 1.0).abs() < 1e-6);
    }
}
