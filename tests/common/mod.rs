//! Common test utilities and helpers for the image-merge tests
//!
//! Fixture images are generated in memory with the `image` crate, and the
//! output side is replaced by an in-memory sink so tests can inspect what a
//! session produced without touching the filesystem.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{ImageFormat, RgbImage, RgbaImage};
use image_merge::{CompositeResult, InputBatch, MergeError, MergeResult, OutputSink, RawImage};

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];

/// Solid-color PNG bytes.
pub fn png(w: u32, h: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(w, h, image::Rgba(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Solid-color JPEG bytes.
pub fn jpeg(w: u32, h: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbImage::from_pixel(w, h, image::Rgb([color[0], color[1], color[2]]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

pub fn raw(name: &str, bytes: Vec<u8>) -> RawImage {
    RawImage::new(name, bytes)
}

pub fn batch(folder: &str, items: Vec<RawImage>) -> InputBatch {
    InputBatch {
        items,
        source_folder_name: folder.to_string(),
        origin: None,
    }
}

/// Decode an encoded result back to RGBA pixels.
pub fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().into_rgba8()
}

/// Assert two pixels match within resampling error.
pub fn assert_near(actual: [u8; 4], expected: [u8; 4]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            a.abs_diff(e) <= 2,
            "pixel {:?} differs from {:?}",
            actual,
            expected
        );
    }
}

/// Mock sink collecting results in memory
#[derive(Clone, Default)]
pub struct MemorySink {
    written: Arc<Mutex<Vec<CompositeResult>>>,
    fail_on: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that rejects the result named `filename`.
    pub fn failing_on(filename: &str) -> Self {
        Self {
            fail_on: Some(filename.to_string()),
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<CompositeResult> {
        self.written.lock().unwrap().clone()
    }

    pub fn get(&self, filename: &str) -> Option<CompositeResult> {
        self.written()
            .into_iter()
            .find(|r| r.filename == filename)
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn write(&self, artifact: &CompositeResult) -> MergeResult<PathBuf> {
        let path = PathBuf::from(&artifact.subdirectory).join(&artifact.filename);
        if self.fail_on.as_deref() == Some(artifact.filename.as_str()) {
            return Err(MergeError::output_sink(
                path,
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ));
        }
        self.written.lock().unwrap().push(artifact.clone());
        Ok(path)
    }
}
