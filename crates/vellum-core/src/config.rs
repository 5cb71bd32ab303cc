//! Canvas configuration consumed at session start.

use crate::shapes::SerializableColor;
use crate::snap::SNAP_THRESHOLD;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest allowed canvas dimension.
pub const MIN_CANVAS_DIMENSION: f64 = 1.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid canvas {axis}: {value}")]
    InvalidDimension { axis: &'static str, value: f64 },
    #[error("Invalid snap threshold: {0}")]
    InvalidThreshold(f64),
}

/// Canvas settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    /// Background fill, written as a CSS hex string such as `"#ffffff"`.
    #[serde(with = "hex_color")]
    pub background: SerializableColor,
    /// Drag-snap distance in canvas units.
    pub snap_threshold: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
            background: SerializableColor::white(),
            snap_threshold: SNAP_THRESHOLD,
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (axis, value) in [("width", self.width), ("height", self.height)] {
            if !value.is_finite() || value < MIN_CANVAS_DIMENSION {
                return Err(ConfigError::InvalidDimension { axis, value });
            }
        }
        if !self.snap_threshold.is_finite() || self.snap_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.snap_threshold));
        }
        Ok(())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Resize the canvas, clamping each dimension to at least 1.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = clamp_dimension(width);
        self.height = clamp_dimension(height);
        log::debug!("Canvas resized to {}x{}", self.width, self.height);
    }

    /// Restore the default size and background.
    pub fn reset(&mut self) {
        let threshold = self.snap_threshold;
        *self = Self {
            snap_threshold: threshold,
            ..Self::default()
        };
    }
}

mod hex_color {
    use crate::shapes::SerializableColor;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &SerializableColor, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SerializableColor, D::Error> {
        let text = String::deserialize(deserializer)?;
        SerializableColor::from_hex(&text).ok_or_else(|| D::Error::custom(format!("invalid color {text:?}")))
    }
}

fn clamp_dimension(value: f64) -> f64 {
    if value.is_finite() {
        value.max(MIN_CANVAS_DIMENSION)
    } else {
        MIN_CANVAS_DIMENSION
    }
}
