//! Serializes a finished canvas to PNG or JPEG bytes.
//!
//! JPEG has no alpha channel, so the canvas is flattened to RGB by dropping
//! alpha; the background fill is what shows through. Quality is mapped from
//! [0, 1] onto the codec's 1..=100 scale and clamped there rather than
//! validated.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};

use crate::config::OutputFormat;
use crate::error::{MergeError, MergeResult};

/// Codec quality for a [0, 1] quality value.
pub fn jpeg_quality(quality: f32) -> u8 {
    let q = (quality * 100.0).round();
    if q.is_nan() {
        return 1;
    }
    q.clamp(1.0, 100.0) as u8
}

/// Encode `canvas` in `format`.
pub fn encode(canvas: RgbaImage, format: OutputFormat) -> MergeResult<Vec<u8>> {
    let mut out = Vec::new();
    let result = match format {
        OutputFormat::Png => canvas.write_with_encoder(PngEncoder::new(&mut out)),
        OutputFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality)))
        }
    };
    result.map_err(|source| MergeError::Encode {
        format: format.name(),
        source,
    })?;
    Ok(out)
}
