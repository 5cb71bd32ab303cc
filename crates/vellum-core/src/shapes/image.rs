//! Image shape.
//!
//! Decoding belongs to the rendering surface; the scene only keeps a source
//! reference and the display size.

use super::ShapeGeometry;
use kurbo::{BezPath, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// A raster image placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Source reference (URL, data URL or asset key) understood by the surface.
    pub src: String,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Natural width in pixels, if known.
    #[serde(default)]
    pub natural_width: u32,
    /// Natural height in pixels, if known.
    #[serde(default)]
    pub natural_height: u32,
}

impl Image {
    /// Create an image displayed at its natural size.
    pub fn new(src: impl Into<String>, natural_width: u32, natural_height: u32) -> Self {
        Self {
            src: src.into(),
            width: natural_width as f64,
            height: natural_height as f64,
            natural_width,
            natural_height,
        }
    }

    /// Natural aspect ratio (width / height), if known.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.natural_height > 0).then(|| self.natural_width as f64 / self.natural_height as f64)
    }
}

impl ShapeGeometry for Image {
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
        Rect::new(0.0, 0.0, self.width, self.height).to_path(0.1)
    }
}
