//! Rectangle shape.

use super::ShapeGeometry;
use kurbo::{BezPath, Rect, RoundedRect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// A rectangle with optional rounded corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
    /// Corner radius (0 = sharp corners).
    #[serde(default)]
    pub corner_radius: f64,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            corner_radius: 0.0,
        }
    }

    /// Get the rectangle as a kurbo Rect in local space.
    pub fn as_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl ShapeGeometry for Rectangle {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    fn to_path(&self) -> BezPath {
        if self.corner_radius > 0.0 {
            RoundedRect::from_rect(self.as_rect(), self.corner_radius).to_path(0.1)
        } else {
            self.as_rect().to_path(0.1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_creation() {
        let rect = Rectangle::new(100.0, 50.0);
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
        assert_eq!(rect.corner_radius, 0.0);
    }

    #[test]
    fn test_path_bounds() {
        let rect = Rectangle::new(100.0, 50.0);
        let bounds = rect.to_path().bounding_box();
        assert!((bounds.x1 - 100.0).abs() < 1e-9);
        assert!((bounds.y1 - 50.0).abs() < 1e-9);
    }
}
