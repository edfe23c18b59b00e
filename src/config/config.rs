//! # Merge Configuration
//!
//! Flat configuration record shared by the CLI and any other front end. It
//! mirrors what a user can type or click, is validated with human-readable
//! messages, and converts into the tagged [`MergeOptions`] the pipeline uses.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Default | Description |
//! |-----------|------|---------|-------------|
//! | `layout` | `LayoutMode` | `horizontal` | Strip or grid arrangement |
//! | `gap` | `u32` | 8 | Pixels between neighbouring images |
//! | `background` | `String` | `#ffffff` | Canvas color (`#rgb`, `#rrggbb`, `#rrggbbaa`) |
//! | `columns` | `Option<u32>` | auto | Grid columns, `ceil(sqrt(n))` when unset |
//! | `target_width` | `Option<f64>` | none | Scale the canvas to this width |
//! | `target_height` | `Option<f64>` | none | Scale the canvas to this height |
//! | `format` | `FormatChoice` | `jpeg` | Output encoding |
//! | `quality` | `f32` | 0.92 | JPEG quality in [0, 1], clamped by the encoder |
//! | `destination` | `Option<PathBuf>` | source parent | Root for the `_merged` directory |
//!
//! ## Examples
//!
//! ```rust
//! use image_merge::config::{LayoutMode, MergeConfig};
//!
//! let config = MergeConfig {
//!     layout: LayoutMode::Grid,
//!     columns: Some(3),
//!     ..MergeConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! let options = config.to_merge_options().unwrap();
//! assert_eq!(options.gap, 8);
//! ```

use std::num::NonZeroU32;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::options::{Arrangement, MergeOptions, OutputFormat, Rgba, TargetSize};
use crate::error::{MergeError, MergeResult};

/// Arrangement choice as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Horizontal,
    Vertical,
    Grid,
}

/// Output format choice as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FormatChoice {
    Png,
    #[value(alias = "jpg")]
    #[serde(alias = "jpg")]
    Jpeg,
}

/// Configuration structure for merge operations.
///
/// Serializable so front ends can persist the last used settings; missing
/// fields fall back to their defaults when loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub layout: LayoutMode,

    /// Spacing between images in natural pixels. Scaled together with the
    /// images when a target size is set.
    pub gap: u32,

    pub background: String,

    /// Grid column count. Ignored for strip layouts.
    pub columns: Option<u32>,

    pub target_width: Option<f64>,
    pub target_height: Option<f64>,

    pub format: FormatChoice,

    /// JPEG quality. Values outside [0, 1] are not rejected; the encoder
    /// clamps them.
    pub quality: f32,

    /// Directory that receives the `<source>_merged` subdirectory. Defaults
    /// to the parent of the source folder.
    pub destination: Option<PathBuf>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Horizontal,
            gap: 8,
            background: "#ffffff".to_string(),
            columns: None,
            target_width: None,
            target_height: None,
            format: FormatChoice::Jpeg,
            quality: 0.92,
            destination: None,
        }
    }
}

fn check_dimension(field: &str, value: Option<f64>) -> MergeResult<()> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(MergeError::config(
            field,
            v.to_string(),
            "must be a positive number",
        )),
        _ => Ok(()),
    }
}

impl MergeConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        self.check().map_err(|e| e.to_string())
    }

    fn check(&self) -> MergeResult<()> {
        if self.columns == Some(0) {
            return Err(MergeError::config("columns", "0", "must be greater than 0"));
        }
        check_dimension("target_width", self.target_width)?;
        check_dimension("target_height", self.target_height)?;
        self.background.parse::<Rgba>()?;
        Ok(())
    }

    /// Convert into the options consumed by the merge pipeline.
    pub fn to_merge_options(&self) -> MergeResult<MergeOptions> {
        self.check()?;

        let arrangement = match self.layout {
            LayoutMode::Horizontal => Arrangement::Horizontal,
            LayoutMode::Vertical => Arrangement::Vertical,
            LayoutMode::Grid => Arrangement::Grid {
                columns: self.columns.and_then(NonZeroU32::new),
            },
        };
        let target = match (self.target_width, self.target_height) {
            (Some(width), Some(height)) => TargetSize::Bounded { width, height },
            (Some(width), None) => TargetSize::Width(width),
            (None, Some(height)) => TargetSize::Height(height),
            (None, None) => TargetSize::Natural,
        };
        let format = match self.format {
            FormatChoice::Png => OutputFormat::Png,
            FormatChoice::Jpeg => OutputFormat::Jpeg {
                quality: self.quality,
            },
        };

        Ok(MergeOptions {
            arrangement,
            gap: self.gap,
            background: self.background.parse()?,
            target,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MergeConfig::default();
        assert_eq!(config.layout, LayoutMode::Horizontal);
        assert_eq!(config.gap, 8);
        assert_eq!(config.format, FormatChoice::Jpeg);

        let options = config.to_merge_options().unwrap();
        assert_eq!(options, MergeOptions::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = MergeConfig::default();
        assert!(config.validate().is_ok());

        config.columns = Some(0);
        assert!(config.validate().is_err());
        config.columns = None;

        config.target_width = Some(0.0);
        assert!(config.validate().is_err());
        config.target_width = Some(f64::NAN);
        assert!(config.validate().is_err());
        config.target_width = Some(640.0);

        config.background = "white".to_string();
        assert!(config.validate().is_err());
        config.background = "#000".to_string();

        // Quality is left to the encoder.
        config.quality = 7.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_columns_only_reach_grids() {
        let config = MergeConfig {
            columns: Some(4),
            ..MergeConfig::default()
        };
        assert_eq!(
            config.to_merge_options().unwrap().arrangement,
            Arrangement::Horizontal
        );

        let config = MergeConfig {
            layout: LayoutMode::Grid,
            columns: Some(4),
            ..MergeConfig::default()
        };
        assert_eq!(
            config.to_merge_options().unwrap().arrangement,
            Arrangement::Grid {
                columns: NonZeroU32::new(4)
            }
        );
    }

    #[test]
    fn test_target_combinations() {
        let both = MergeConfig {
            target_width: Some(100.0),
            target_height: Some(50.0),
            ..MergeConfig::default()
        };
        assert_eq!(
            both.to_merge_options().unwrap().target,
            TargetSize::Bounded {
                width: 100.0,
                height: 50.0
            }
        );

        let png = MergeConfig {
            format: FormatChoice::Png,
            ..MergeConfig::default()
        };
        assert_eq!(png.to_merge_options().unwrap().format, OutputFormat::Png);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let config: MergeConfig =
            serde_json::from_str(r#"{"layout": "grid", "columns": 2, "format": "jpg"}"#).unwrap();
        assert_eq!(config.layout, LayoutMode::Grid);
        assert_eq!(config.columns, Some(2));
        assert_eq!(config.format, FormatChoice::Jpeg);
        assert_eq!(config.gap, 8);
        assert_eq!(config.background, "#ffffff");
    }
}
