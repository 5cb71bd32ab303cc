//! Ellipse shape.

use super::ShapeGeometry;
use kurbo::{BezPath, Ellipse as KurboEllipse, Point, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// An ellipse described by its two radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    /// Horizontal radius.
    pub rx: f64,
    /// Vertical radius.
    pub ry: f64,
}

impl Ellipse {
    pub fn new(rx: f64, ry: f64) -> Self {
        Self { rx, ry }
    }
}

impl ShapeGeometry for Ellipse {
    fn size(&self) -> Size {
        Size::new(self.rx * 2.0, self.ry * 2.0)
    }

    fn set_width(&mut self, width: f64) {
        self.rx = width / 2.0;
    }

    fn set_height(&mut self, height: f64) {
        self.ry = height / 2.0;
    }

    fn to_path(&self) -> BezPath {
        KurboEllipse::new(Point::new(self.rx, self.ry), (self.rx, self.ry), 0.0).to_path(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_size() {
        let ellipse = Ellipse::new(30.0, 10.0);
        assert_eq!(ellipse.size(), Size::new(60.0, 20.0));
    }

    #[test]
    fn test_path_within_box() {
        let ellipse = Ellipse::new(30.0, 10.0);
        let bounds = ellipse.to_path().bounding_box();
        assert!(bounds.x0 >= -1e-6 && bounds.x1 <= 60.0 + 1e-6);
        assert!(bounds.y0 >= -1e-6 && bounds.y1 <= 20.0 + 1e-6);
    }
}
