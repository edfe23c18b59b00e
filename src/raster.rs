//! # Raster Loading
//!
//! Decodes raw JPEG/PNG buffers into RGBA8 images held in memory. Decoded
//! pixels belong to a [`LoadedGroup`], which lives exactly as long as one
//! group's pipeline: dropping it releases every image of the group at once,
//! whether the pipeline finished or bailed out early.

use image::RgbaImage;
use merge_layout::plan::Size;
use tracing::debug;

use crate::error::{MergeError, MergeResult};
use crate::grouping::{Group, RawImage};

/// A decoded image ready to be drawn.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub name: String,
    pub pixels: RgbaImage,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size {
            w: self.width(),
            h: self.height(),
        }
    }
}

/// Decode one raw buffer, sniffing the format from its content.
pub fn decode(raw: &RawImage) -> MergeResult<LoadedImage> {
    let decoded = image::load_from_memory(&raw.bytes).map_err(|source| MergeError::Decode {
        name: raw.name.clone(),
        source,
    })?;
    Ok(LoadedImage {
        name: raw.name.clone(),
        pixels: decoded.into_rgba8(),
    })
}

/// Decoded members of one group. Pixels are freed when this is dropped.
#[derive(Debug)]
pub struct LoadedGroup {
    pub key: String,
    pub images: Vec<LoadedImage>,
}

impl LoadedGroup {
    pub fn sizes(&self) -> Vec<Size> {
        self.images.iter().map(LoadedImage::size).collect()
    }

    /// Total bytes of decoded pixels held by the group.
    pub fn decoded_bytes(&self) -> usize {
        self.images.iter().map(|i| i.pixels.as_raw().len()).sum()
    }
}

impl Drop for LoadedGroup {
    fn drop(&mut self) {
        debug!(
            group = %self.key,
            images = self.images.len(),
            bytes = self.decoded_bytes(),
            "released decoded images"
        );
    }
}

/// Decode every member of `group`, consuming the raw buffers.
///
/// Fails on the first member that does not decode; members decoded before it
/// are released immediately.
pub fn load_group(group: Group<RawImage>) -> MergeResult<LoadedGroup> {
    let mut loaded = LoadedGroup {
        key: group.key,
        images: Vec::with_capacity(group.members.len()),
    };
    for raw in group.members {
        loaded.images.push(decode(&raw)?);
    }
    Ok(loaded)
}
