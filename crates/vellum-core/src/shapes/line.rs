//! Line shape.

use super::ShapeGeometry;
use kurbo::{BezPath, Line as KurboLine, Point, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// A straight segment. Endpoints are local to the object's box, so the
/// smaller coordinate on each axis is always 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Line {
    /// Build a line between two points given in the parent's space.
    /// Returns the line and the top-left corner of its box.
    pub fn from_points(start: Point, end: Point) -> (Self, Point) {
        let origin = Point::new(start.x.min(end.x), start.y.min(end.y));
        let line = Self {
            x1: start.x - origin.x,
            y1: start.y - origin.y,
            x2: end.x - origin.x,
            y2: end.y - origin.y,
        };
        (line, origin)
    }

    /// Start point in local space.
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// End point in local space.
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.start(), self.end())
    }
}

/// Rescale one axis of a segment so its extent becomes `target`.
fn rescale_axis(a: &mut f64, b: &mut f64, target: f64) {
    let extent = (*b - *a).abs();
    if extent > f64::EPSILON {
        let factor = target / extent;
        *a *= factor;
        *b *= factor;
    } else if *a <= *b {
        *b = *a + target;
    } else {
        *a = *b + target;
    }
}

impl ShapeGeometry for Line {
    fn size(&self) -> Size {
        Size::new((self.x2 - self.x1).abs(), (self.y2 - self.y1).abs())
    }

    fn set_width(&mut self, width: f64) {
        rescale_axis(&mut self.x1, &mut self.x2, width);
    }

    fn set_height(&mut self, height: f64) {
        rescale_axis(&mut self.y1, &mut self.y2, height);
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_normalizes() {
        let (line, origin) = Line::from_points(Point::new(50.0, 10.0), Point::new(20.0, 40.0));
        assert_eq!(origin, Point::new(20.0, 10.0));
        assert_eq!(line.start(), Point::new(30.0, 0.0));
        assert_eq!(line.end(), Point::new(0.0, 30.0));
        assert_eq!(line.size(), Size::new(30.0, 30.0));
    }

    #[test]
    fn test_set_width_scales_endpoints() {
        let (mut line, _) = Line::from_points(Point::new(0.0, 0.0), Point::new(10.0, 5.0));
        line.set_width(40.0);
        assert!((line.x2 - 40.0).abs() < 1e-9);
        assert_eq!(line.size().height, 5.0);
    }

    #[test]
    fn test_set_width_on_vertical_line() {
        let (mut line, _) = Line::from_points(Point::new(0.0, 0.0), Point::new(0.0, 10.0));
        line.set_width(8.0);
        assert_eq!(line.size(), Size::new(8.0, 10.0));
    }
}
