//! Circle shape.

use super::ShapeGeometry;
use kurbo::{BezPath, Circle as KurboCircle, Point, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// A circle, described by its radius. The box is `2r` square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl ShapeGeometry for Circle {
    fn size(&self) -> Size {
        Size::new(self.radius * 2.0, self.radius * 2.0)
    }

    // A circle stays a circle: either dimension drives the radius.
    fn set_width(&mut self, width: f64) {
        self.radius = width / 2.0;
    }

    fn set_height(&mut self, height: f64) {
        self.radius = height / 2.0;
    }

    fn to_path(&self) -> BezPath {
        KurboCircle::new(Point::new(self.radius, self.radius), self.radius).to_path(0.1)
    }
}
