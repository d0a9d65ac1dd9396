//! Editor configuration.
//!
//! Loaded from JSON; every field has a default so a partial (or empty)
//! document is valid.

use crate::geometry::OverflowPolicy;
use crate::layout::RotationHandle;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Image export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Suggested download file name.
    pub file_name: String,
    /// Raster scale relative to the surface's rendered size.
    pub scale: f32,
    /// Load system fonts into the rasterizer's font database.
    pub load_system_fonts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "book-quote.png".to_string(),
            scale: 1.0,
            load_system_fonts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Vertical distance of each element from the surface centre on reset.
    pub reset_vertical_offset: f64,
    /// Clamp fallback when an element is larger than the surface.
    pub overflow: OverflowPolicy,
    /// Initial surface-relative position of the quote.
    pub quote_start: Point,
    /// Initial surface-relative position of the author line.
    pub author_start: Point,
    pub rotation_handle: RotationHandle,
    pub export: ExportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            reset_vertical_offset: 50.0,
            overflow: OverflowPolicy::PinToOrigin,
            quote_start: Point::new(40.0, 40.0),
            author_start: Point::new(40.0, 150.0),
            rotation_handle: RotationHandle::default(),
            export: ExportConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loading editor config from {}", path.as_ref().display());
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.export.scale.is_finite() && self.export.scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "export.scale must be positive, got {}",
                self.export.scale
            )));
        }
        if self.rotation_handle.radius <= 0.0 {
            return Err(ConfigError::Invalid(
                "rotation_handle.radius must be positive".to_string(),
            ));
        }
        if !self.reset_vertical_offset.is_finite() {
            return Err(ConfigError::Invalid(
                "reset_vertical_offset must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn partial_overrides() {
        let config = EditorConfig::from_json(
            r#"{"overflow":"center","quote_start":{"x":10.0,"y":12.0},"export":{"scale":2.0}}"#,
        )
        .unwrap();
        assert_eq!(config.overflow, OverflowPolicy::Center);
        assert_eq!(config.quote_start, Point::new(10.0, 12.0));
        assert_eq!(config.export.scale, 2.0);
        assert_eq!(config.export.file_name, "book-quote.png");
        assert_eq!(config.reset_vertical_offset, 50.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            EditorConfig::from_json(r#"{"export":{"scale":0.0}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EditorConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            EditorConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
