//! Text box shape.
//!
//! Glyph shaping is done by the rendering surface. The box height here is an
//! estimate from the line count, which is what the scene needs for layout,
//! snapping and alignment.

use super::ShapeGeometry;
use kurbo::{BezPath, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// Horizontal alignment of text within its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// A fixed-width, auto-height block of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// The text content.
    pub text: String,
    /// Box width; text wraps inside it.
    pub width: f64,
    /// Font size in pixels.
    pub font_size: f64,
    /// Font family name, resolved by the surface.
    pub font_family: String,
    #[serde(default)]
    pub text_align: TextAlign,
    /// Line height as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
}

fn default_line_height() -> f64 {
    TextBox::DEFAULT_LINE_HEIGHT
}

impl TextBox {
    pub const DEFAULT_TEXT: &'static str = "Edit Text";
    pub const DEFAULT_WIDTH: f64 = 100.0;
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";
    pub const DEFAULT_LINE_HEIGHT: f64 = 1.16;

    /// Create a text box with the default font settings.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            width: Self::DEFAULT_WIDTH,
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            text_align: TextAlign::default(),
            line_height: Self::DEFAULT_LINE_HEIGHT,
        }
    }

    /// Number of hard lines (an empty text still occupies one line).
    pub fn line_count(&self) -> usize {
        self.text.lines().count().max(1)
    }

    /// Estimated box height.
    pub fn height(&self) -> f64 {
        self.line_count() as f64 * self.font_size * self.line_height
    }
}

impl ShapeGeometry for TextBox {
    fn size(&self) -> Size {
        Size::new(self.width, self.height())
    }

    fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    // Height follows from the content and font size.
    fn set_height(&mut self, _height: f64) {}

    fn to_path(&self) -> BezPath {
        Rect::new(0.0, 0.0, self.width, self.height()).to_path(0.1)
    }
}
