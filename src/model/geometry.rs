//! Page-normalized geometry.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page-normalized coordinates.
///
/// `(x0, y0)` is the top-left corner and `(x1, y1)` the bottom-right corner;
/// y grows downwards, matching OCR output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Check that all coordinates are finite and the box has positive area.
    pub fn is_valid(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
            && self.x0 < self.x1
            && self.y0 < self.y1
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Area of the box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Clamp all coordinates into the unit square.
    pub fn clamped(&self) -> BoundingBox {
        BoundingBox {
            x0: self.x0.clamp(0.0, 1.0),
            y0: self.y0.clamp(0.0, 1.0),
            x1: self.x1.clamp(0.0, 1.0),
            y1: self.y1.clamp(0.0, 1.0),
        }
    }

    /// Horizontal overlap as a fraction of the narrower box (0.0 to 1.0).
    pub fn horizontal_overlap(&self, other: &BoundingBox) -> f32 {
        let overlap = self.x1.min(other.x1) - self.x0.max(other.x0);
        let min_width = self.width().min(other.width());
        if overlap <= 0.0 || min_width <= 0.0 {
            return 0.0;
        }
        overlap / min_width
    }

    /// Vertical overlap as a fraction of the shorter box (0.0 to 1.0).
    pub fn vertical_overlap(&self, other: &BoundingBox) -> f32 {
        let overlap = self.y1.min(other.y1) - self.y0.max(other.y0);
        let min_height = self.height().min(other.height());
        if overlap <= 0.0 || min_height <= 0.0 {
            return 0.0;
        }
        overlap / min_height
    }

    /// Vertical whitespace between the bottom of `self` and the top of `below`.
    ///
    /// Negative when the boxes overlap vertically.
    pub fn vertical_gap_to(&self, below: &BoundingBox) -> f32 {
        below.y0 - self.y1
    }

    /// Check whether two boxes sit at nearly the same position.
    pub fn is_near(&self, other: &BoundingBox, tolerance: f32) -> bool {
        (self.x0 - other.x0).abs() <= tolerance
            && (self.y0 - other.y0).abs() <= tolerance
            && (self.x1 - other.x1).abs() <= tolerance
            && (self.y1 - other.y1).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_validity() {
        assert!(BoundingBox::new(0.1, 0.1, 0.2, 0.2).is_valid());
        assert!(!BoundingBox::new(0.2, 0.1, 0.2, 0.2).is_valid());
        assert!(!BoundingBox::new(0.1, 0.1, f32::NAN, 0.2).is_valid());
        assert!(!BoundingBox::new(0.1, 0.3, 0.2, 0.2).is_valid());
    }

    #[test]
    fn test_overlap_ratios() {
        let a = BoundingBox::new(0.0, 0.0, 0.5, 0.1);
        let b = BoundingBox::new(0.25, 0.05, 0.5, 0.2);
        assert!((a.horizontal_overlap(&b) - 1.0).abs() < 1e-6);
        assert!((a.vertical_overlap(&b) - 0.5).abs() < 1e-6);

        let c = BoundingBox::new(0.6, 0.0, 0.9, 0.1);
        assert_eq!(a.horizontal_overlap(&c), 0.0);
    }

    #[test]
    fn test_union_and_gap() {
        let a = BoundingBox::new(0.1, 0.1, 0.4, 0.2);
        let b = BoundingBox::new(0.2, 0.25, 0.6, 0.3);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(0.1, 0.1, 0.6, 0.3));
        assert!((a.vertical_gap_to(&b) - 0.05).abs() < 1e-6);
    }
}
