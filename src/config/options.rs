//! Validated merge options.
//!
//! Mode-dependent settings live inside the variant they belong to: a column
//! count only exists for grids and a quality only exists for JPEG, so invalid
//! combinations cannot be constructed.

use std::fmt;
use std::str::FromStr;

pub use merge_layout::plan::{Arrangement, TargetSize};

use crate::error::MergeError;

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
}

impl FromStr for Rgba {
    type Err = MergeError;

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MergeError::config("background", s, "expected #rgb, #rrggbb or #rrggbbaa");
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let mut px = [255u8; 4];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                    px[i] = v * 17;
                }
                Ok(Rgba(px))
            }
            6 => Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
            8 => Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

/// Encoding of the merged image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Png,
    /// `quality` is nominally in [0, 1]; the encoder clamps anything outside.
    Jpeg { quality: f32 },
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg { .. } => "jpg",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg { .. } => "JPEG",
        }
    }
}

/// Everything one merge invocation needs besides the images themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOptions {
    pub arrangement: Arrangement,
    /// Pixel spacing between neighbouring images, before target scaling.
    pub gap: u32,
    pub background: Rgba,
    pub target: TargetSize,
    pub format: OutputFormat,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            arrangement: Arrangement::Horizontal,
            gap: 8,
            background: Rgba::WHITE,
            target: TargetSize::Natural,
            format: OutputFormat::Jpeg { quality: 0.92 },
        }
    }
}
