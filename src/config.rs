use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SCALE_STEP: f32 = 0.1;
pub const DEFAULT_STICKER_FONT_SIZE: f32 = 40.0;

/// Inclusive bounds for a scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
}

impl ScaleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.min.is_finite() || self.min <= 0.0 || self.min > self.max || !self.max.is_finite() {
            return Err(ConfigError::InvalidScaleRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self::new(0.5, 2.0)
    }
}

/// Raster format used when serializing an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
}

impl ExportFormat {
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            ExportFormat::Png => image::ImageFormat::Png,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
        }
    }
}

/// Tunables for an editing session and its exports.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// let config = shape_studio::EditorConfig::from_json_str(r#"{ "scale_step": 0.25 }"#).unwrap();
/// assert_eq!(config.scale_step, 0.25);
/// assert_eq!(config.sticker_base_font_size, 40.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Additive increment applied by one zoom click
    pub scale_step: f32,
    pub base_scale_range: ScaleRange,
    pub sticker_scale_range: ScaleRange,
    /// Glyph size of a sticker at scale 1.0
    pub sticker_base_font_size: f32,
    pub export_format: ExportFormat,
    /// Fill for pixels outside the clip path. `None` leaves them transparent.
    pub background: Option<[u8; 4]>,
    pub sticker_color: [u8; 4],
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scale_step: DEFAULT_SCALE_STEP,
            base_scale_range: ScaleRange::default(),
            sticker_scale_range: ScaleRange::default(),
            sticker_base_font_size: DEFAULT_STICKER_FONT_SIZE,
            export_format: ExportFormat::Png,
            background: None,
            sticker_color: [0, 0, 0, 255],
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded editor config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_scale_range.validate()?;
        self.sticker_scale_range.validate()?;
        if !self.scale_step.is_finite() || self.scale_step <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "scale_step",
                value: self.scale_step,
            });
        }
        if !self.sticker_base_font_size.is_finite() || self.sticker_base_font_size <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "sticker_base_font_size",
                value: self.sticker_base_font_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.scale_step, 0.1);
        assert_eq!(config.base_scale_range, ScaleRange::new(0.5, 2.0));
        assert_eq!(config.sticker_scale_range, ScaleRange::new(0.5, 2.0));
        assert_eq!(config.sticker_base_font_size, 40.0);
        assert_eq!(config.export_format, ExportFormat::Png);
        assert!(config.background.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json_str(
            r#"{ "sticker_scale_range": { "min": 0.25, "max": 4.0 }, "export_format": "png" }"#,
        )
        .unwrap();
        assert_eq!(config.sticker_scale_range, ScaleRange::new(0.25, 4.0));
        assert_eq!(config.base_scale_range, ScaleRange::new(0.5, 2.0));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let result = EditorConfig::from_json_str(r#"{ "base_scale_range": { "min": 3.0, "max": 1.0 } }"#);
        assert!(matches!(result, Err(ConfigError::InvalidScaleRange { .. })));
    }

    #[test]
    fn test_rejects_non_positive_step() {
        let result = EditorConfig::from_json_str(r#"{ "scale_step": 0.0 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue { field: "scale_step", .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        std::fs::write(&path, r#"{ "sticker_base_font_size": 32.0 }"#).unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.sticker_base_font_size, 32.0);
    }
}
