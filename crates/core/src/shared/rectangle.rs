use serde::{Deserialize, Serialize};

/// Axis-aligned face bounding box in the pixel space of the head crop it
/// was found in (not the full camera frame).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Non-negative origin and strictly positive extents.
    pub fn is_well_formed(&self) -> bool {
        self.x >= 0 && self.y >= 0 && self.width > 0 && self.height > 0
    }

    pub fn iou(&self, other: &Rectangle) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = self.right().min(other.right());
        let iy2 = self.bottom().min(other.bottom());

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.width as f64 * self.height as f64;
        let area_b = other.width as f64 * other.height as f64;
        inter / (area_a + area_b - inter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_iou_identical() {
        let a = Rectangle::new(10, 10, 100, 100);
        assert_relative_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // intersection 50*100, union 15000
        let a = Rectangle::new(0, 0, 100, 100);
        let b = Rectangle::new(50, 0, 100, 100);
        assert_relative_eq!(a.iou(&b), 5000.0 / 15000.0);
    }

    #[test]
    fn test_iou_touching_edges() {
        let a = Rectangle::new(0, 0, 50, 50);
        let b = Rectangle::new(50, 0, 50, 50);
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    #[rstest]
    #[case::regular(Rectangle::new(0, 0, 1, 1), true)]
    #[case::negative_x(Rectangle::new(-1, 0, 5, 5), false)]
    #[case::negative_y(Rectangle::new(0, -3, 5, 5), false)]
    #[case::zero_width(Rectangle::new(2, 2, 0, 5), false)]
    #[case::zero_height(Rectangle::new(2, 2, 5, 0), false)]
    fn test_is_well_formed(#[case] rect: Rectangle, #[case] expected: bool) {
        assert_eq!(rect.is_well_formed(), expected);
    }

    #[test]
    fn test_serializes_with_wire_field_names() {
        let json = serde_json::to_string(&Rectangle::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, r#"{"x":1,"y":2,"width":3,"height":4}"#);
    }
}
