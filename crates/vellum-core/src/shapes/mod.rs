//! Shape payloads for drawable objects.
//!
//! A [`Shape`] carries only the kind-specific geometry of an object (its
//! intrinsic size, radii, endpoints, text). Position, rotation and scale live
//! on the owning [`DrawableObject`](crate::object::DrawableObject).

mod circle;
mod ellipse;
mod group;
mod image;
mod line;
mod rectangle;
mod text;

pub use circle::Circle;
pub use ellipse::Ellipse;
pub use group::Group;
pub use image::Image;
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::{TextAlign, TextBox};

use kurbo::{BezPath, Size};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for drawable objects.
pub type ObjectId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn red() -> Self {
        Self::new(255, 0, 0, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Whether the color paints nothing.
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Parse a CSS-style color: `transparent`, `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let color = color.trim();
        if color.eq_ignore_ascii_case("transparent") {
            return Some(Self::transparent());
        }
        let hex = color.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Shape of the stroke at open path ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Shape of the stroke where two segments meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Paint properties of a drawable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Fill color (alpha included).
    pub fill: SerializableColor,
    /// Stroke color (alpha included).
    pub stroke: SerializableColor,
    /// Stroke width in local units.
    pub stroke_width: f64,
    #[serde(default)]
    pub line_cap: LineCap,
    #[serde(default)]
    pub line_join: LineJoin,
    /// Alternating dash/gap lengths; empty means a solid stroke.
    #[serde(default)]
    pub dash: Vec<f64>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke_color(&self) -> Color {
        self.stroke.into()
    }

    /// Get the fill color as a peniko Color, `None` when transparent.
    pub fn fill_color(&self) -> Option<Color> {
        (!self.fill.is_transparent()).then(|| self.fill.into())
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color().map(|color| with_opacity(color, self.opacity))
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        with_opacity(self.stroke_color(), self.opacity)
    }

    /// Whether the stroke is dashed.
    pub fn is_dashed(&self) -> bool {
        self.dash.iter().any(|d| *d > 0.0)
    }
}

fn with_opacity(color: Color, opacity: f64) -> Color {
    let rgba = color.to_rgba8();
    let alpha = (rgba.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, alpha)
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: SerializableColor::transparent(),
            stroke: SerializableColor::black(),
            stroke_width: 2.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            dash: Vec::new(),
            opacity: 1.0,
        }
    }
}

/// Variant tag of a drawable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rect,
    Circle,
    Ellipse,
    Line,
    TextBox,
    Image,
    Group,
}

impl ShapeKind {
    /// Short lowercase tag, used for default object names.
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Rect => "rect",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
            ShapeKind::TextBox => "textbox",
            ShapeKind::Image => "image",
            ShapeKind::Group => "group",
        }
    }
}

/// Geometry shared by every shape payload.
///
/// Sizes are intrinsic (before the owning object's scale is applied) and paths
/// are in the object's local space, with the top-left of the box at the origin.
pub trait ShapeGeometry {
    /// Intrinsic width and height.
    fn size(&self) -> Size;

    /// Set the intrinsic width, keeping the kind's own constraints.
    fn set_width(&mut self, width: f64);

    /// Set the intrinsic height, keeping the kind's own constraints.
    fn set_height(&mut self, height: f64);

    /// Outline in local coordinates.
    fn to_path(&self) -> BezPath;
}

/// Kind-specific payload of a drawable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Rectangle),
    Circle(Circle),
    Ellipse(Ellipse),
    Line(Line),
    TextBox(TextBox),
    Image(Image),
    Group(Group),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rect(_) => ShapeKind::Rect,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
            Shape::Line(_) => ShapeKind::Line,
            Shape::TextBox(_) => ShapeKind::TextBox,
            Shape::Image(_) => ShapeKind::Image,
            Shape::Group(_) => ShapeKind::Group,
        }
    }

    fn geometry(&self) -> &dyn ShapeGeometry {
        match self {
            Shape::Rect(s) => s,
            Shape::Circle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Line(s) => s,
            Shape::TextBox(s) => s,
            Shape::Image(s) => s,
            Shape::Group(s) => s,
        }
    }

    fn geometry_mut(&mut self) -> &mut dyn ShapeGeometry {
        match self {
            Shape::Rect(s) => s,
            Shape::Circle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Line(s) => s,
            Shape::TextBox(s) => s,
            Shape::Image(s) => s,
            Shape::Group(s) => s,
        }
    }

    pub fn size(&self) -> Size {
        self.geometry().size()
    }

    pub fn set_width(&mut self, width: f64) {
        self.geometry_mut().set_width(width.max(0.0));
    }

    pub fn set_height(&mut self, height: f64) {
        self.geometry_mut().set_height(height.max(0.0));
    }

    pub fn to_path(&self) -> BezPath {
        self.geometry().to_path()
    }

    /// Check if this shape is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Shape::Group(_))
    }

    /// Get the group if this shape is a group.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Shape::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Get the mutable group if this shape is a group.
    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Shape::Group(g) => Some(g),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(SerializableColor::from_hex("#000"), Some(SerializableColor::black()));
        assert_eq!(
            SerializableColor::from_hex("#ff000080"),
            Some(SerializableColor::new(255, 0, 0, 128))
        );
        assert_eq!(
            SerializableColor::from_hex("transparent"),
            Some(SerializableColor::transparent())
        );
        assert_eq!(SerializableColor::from_hex("red"), None);
        assert_eq!(SerializableColor::from_hex("#12"), None);
    }

    #[test]
    fn test_color_from_hex_rejects_non_ascii() {
        assert_eq!(SerializableColor::from_hex("#é1"), None);
        assert_eq!(SerializableColor::from_hex("#ffé0"), None);
        assert_eq!(SerializableColor::from_hex("#12345é"), None);
    }

    #[test]
    fn test_color_hex_roundtrip() {
        let color = SerializableColor::new(18, 52, 86, 255);
        assert_eq!(color.to_hex(), "#123456");
        assert_eq!(SerializableColor::from_hex(&color.to_hex()), Some(color));
    }

    #[test]
    fn test_default_style() {
        let style = ShapeStyle::default();
        assert!(style.fill_color().is_none());
        assert_eq!(style.stroke, SerializableColor::black());
        assert!((style.stroke_width - 2.0).abs() < f64::EPSILON);
        assert!(!style.is_dashed());
    }

    #[test]
    fn test_opacity_applied_to_stroke() {
        let style = ShapeStyle {
            opacity: 0.5,
            ..ShapeStyle::default()
        };
        assert_eq!(style.stroke_with_opacity().to_rgba8().a, 127);
    }

    #[test]
    fn test_kind_tags() {
        let rect = Shape::Rect(Rectangle::new(10.0, 20.0));
        assert_eq!(rect.kind(), ShapeKind::Rect);
        assert_eq!(rect.kind().tag(), "rect");
        assert!(!rect.is_group());
        assert_eq!(rect.size(), Size::new(10.0, 20.0));
    }

    #[test]
    fn test_negative_size_clamped() {
        let mut shape = Shape::Rect(Rectangle::new(10.0, 20.0));
        shape.set_width(-5.0);
        assert_eq!(shape.size().width, 0.0);
    }
}
