// SPDX-License-Identifier: MIT
// CPU compositing built on fast_image_resize (SIMD-accelerated).
// RGBA8 straight alpha in → RGBA8 straight alpha canvas, source-over blending.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};

use crate::plan::{PixelRect, Size};

#[derive(Debug)]
pub enum DrawError {
    BufferTooSmall,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
}

impl From<fir::ResizeError> for DrawError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for DrawError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::BufferTooSmall => write!(f, "Pixel buffer smaller than its declared size"),
            DrawError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            DrawError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
        }
    }
}

impl std::error::Error for DrawError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DrawError::Fir(e) => Some(e),
            DrawError::ImageBuf(e) => Some(e),
            _ => None,
        }
    }
}

/// Reusable scratch holding the resized source before it is blended.
pub struct Staging {
    pub(crate) buf: Vec<u8>,
}
impl Staging {
    pub fn with_capacity(cap: usize) -> Self { Self { buf: Vec::with_capacity(cap) } }
    pub fn ensure_len(&mut self, len: usize) { if self.buf.len() < len { self.buf.resize(len, 0); } }
    pub fn as_slice(&self) -> &[u8] { &self.buf }
}

#[inline]
fn byte_len(size: Size) -> usize {
    (size.w as usize) * (size.h as usize) * 4
}

/// Fill the whole canvas with one RGBA color.
#[inline]
pub fn fill_rgba(dst: &mut [u8], bg: [u8; 4]) {
    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&bg);
    }
}

/// Draw the full `src` image scaled into `dst_rect` of the canvas.
///
/// The rectangle is clipped to the canvas; a rectangle with zero area, or one
/// entirely outside the canvas, draws nothing.
pub fn draw_scaled_rgba(
    resizer: &mut Resizer,
    src: &[u8],
    src_size: Size,
    canvas: &mut [u8],
    canvas_size: Size,
    dst_rect: PixelRect,
    staging: &mut Staging,
) -> Result<(), DrawError> {
    if src.len() < byte_len(src_size) || canvas.len() < byte_len(canvas_size) {
        return Err(DrawError::BufferTooSmall);
    }
    if dst_rect.w == 0 || dst_rect.h == 0 || src_size.w == 0 || src_size.h == 0 {
        return Ok(());
    }

    let scaled = Size { w: dst_rect.w, h: dst_rect.h };
    let tile: &[u8] = if scaled == src_size {
        &src[..byte_len(src_size)]
    } else {
        let src_view = TypedImageRef::<U8x4>::from_buffer(src_size.w, src_size.h, &src[..byte_len(src_size)])?;
        let len = byte_len(scaled);
        staging.ensure_len(len);
        {
            let mut dst_image = TypedImage::<U8x4>::from_buffer(scaled.w, scaled.h, &mut staging.buf[..len])?;
            let opts = ResizeOptions::new()
                .resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3))
                .use_alpha(true);
            resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &opts)?;
        }
        &staging.buf[..len]
    };

    blend_tile(canvas, canvas_size, tile, scaled, dst_rect.x, dst_rect.y);
    Ok(())
}

/// Source-over blend a tightly packed tile onto the canvas at (x, y), clipped.
fn blend_tile(canvas: &mut [u8], canvas_size: Size, tile: &[u8], tile_size: Size, x: i64, y: i64) {
    let cw = i64::from(canvas_size.w);
    let ch = i64::from(canvas_size.h);
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(tile_size.w)).min(cw);
    let y1 = (y + i64::from(tile_size.h)).min(ch);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let tile_row = (tile_size.w as usize) * 4;
    let canvas_row = (canvas_size.w as usize) * 4;
    let span = ((x1 - x0) as usize) * 4;
    for cy in y0..y1 {
        let ty = (cy - y) as usize;
        let tx = (x0 - x) as usize;
        let s = &tile[ty * tile_row + tx * 4..ty * tile_row + tx * 4 + span];
        let d_off = (cy as usize) * canvas_row + (x0 as usize) * 4;
        let d = &mut canvas[d_off..d_off + span];
        for (dp, sp) in d.chunks_exact_mut(4).zip(s.chunks_exact(4)) {
            blend_over(dp, sp);
        }
    }
}

/// Straight-alpha source-over for one pixel.
#[inline]
fn blend_over(dst: &mut [u8], src: &[u8]) {
    let sa = u32::from(src[3]);
    if sa == 255 {
        dst.copy_from_slice(src);
        return;
    }
    if sa == 0 {
        return;
    }
    let da = u32::from(dst[3]);
    let inv = 255 - sa;
    // Alpha scaled by 255.
    let out_a = sa * 255 + da * inv;
    for c in 0..3 {
        let num = u32::from(src[c]) * sa * 255 + u32::from(dst[c]) * da * inv;
        dst[c] = ((num + out_a / 2) / out_a) as u8;
    }
    dst[3] = ((out_a + 127) / 255) as u8;
}
