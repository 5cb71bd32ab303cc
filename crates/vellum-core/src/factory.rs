//! Construction of drawable objects with canonical default attributes.

use crate::object::{DrawableObject, Transform};
use crate::shapes::{
    Circle, Ellipse, Image, Line, Rectangle, SerializableColor, Shape, ShapeKind, ShapeStyle,
    TextBox,
};
use kurbo::Point;

/// A rectangle at the origin.
pub fn rect(width: f64, height: f64) -> DrawableObject {
    DrawableObject::new(Shape::Rect(Rectangle::new(width, height)))
}

/// A circle at the origin; its box is `2 * radius` square.
pub fn circle(radius: f64) -> DrawableObject {
    DrawableObject::new(Shape::Circle(Circle::new(radius)))
}

pub fn ellipse(rx: f64, ry: f64) -> DrawableObject {
    DrawableObject::new(Shape::Ellipse(Ellipse::new(rx, ry)))
}

/// A line between two points in canvas space. The object is positioned at the
/// top-left of the segment's box.
pub fn line(start: Point, end: Point) -> DrawableObject {
    let (shape, origin) = Line::from_points(start, end);
    let mut object = DrawableObject::new(Shape::Line(shape));
    object.transform = Transform::at(origin.x, origin.y);
    object
}

/// A text box with the default font settings and solid black fill.
pub fn textbox(text: impl Into<String>) -> DrawableObject {
    let mut object = DrawableObject::new(Shape::TextBox(TextBox::new(text)));
    object.style.fill = SerializableColor::black();
    object
}

/// An image displayed at its natural size.
pub fn image(src: impl Into<String>, natural_width: u32, natural_height: u32) -> DrawableObject {
    DrawableObject::new(Shape::Image(Image::new(src, natural_width, natural_height)))
}

/// Builds objects of a given kind with the editor's default attributes.
///
/// New shapes start at zero size at the origin; the caller sizes them as the
/// user drags. Text boxes start with placeholder text.
#[derive(Debug, Clone)]
pub struct ShapeFactory {
    /// Style applied to every non-text shape.
    pub style: ShapeStyle,
    /// Placeholder text for new text boxes.
    pub placeholder_text: String,
}

impl Default for ShapeFactory {
    fn default() -> Self {
        Self {
            style: ShapeStyle::default(),
            placeholder_text: TextBox::DEFAULT_TEXT.to_string(),
        }
    }
}

impl ShapeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object of the given kind, or `None` for kinds that cannot be
    /// created directly (groups come from the grouping controller, images need
    /// a source).
    pub fn create(&self, kind: ShapeKind) -> Option<DrawableObject> {
        let mut object = match kind {
            ShapeKind::Rect => rect(0.0, 0.0),
            ShapeKind::Circle => circle(0.0),
            ShapeKind::Ellipse => ellipse(0.0, 0.0),
            ShapeKind::Line => line(Point::ZERO, Point::ZERO),
            ShapeKind::TextBox => return Some(textbox(self.placeholder_text.clone())),
            ShapeKind::Image | ShapeKind::Group => return None,
        };
        object.style = self.style.clone();
        Some(object)
    }

    /// Create an image object with the factory's style.
    pub fn create_image(
        &self,
        src: impl Into<String>,
        natural_width: u32,
        natural_height: u32,
    ) -> DrawableObject {
        let mut object = image(src, natural_width, natural_height);
        object.style = self.style.clone();
        object
    }
}
