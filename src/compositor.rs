//! # Compositing
//!
//! Paints a merge plan onto a canvas. The canvas comes from a
//! [`SurfaceProvider`] handed in by the caller, so the compositor has no
//! hidden dependency on a drawing backend and tests can substitute a surface
//! that simply records what was drawn.
//!
//! ## Algorithm
//!
//! 1. Allocate a surface of the plan's canvas size
//! 2. Fill it with the background color (visible in grid slack and gaps,
//!    and the only backdrop JPEG output gets)
//! 3. Draw each image, in input order, into its placement rounded to whole
//!    pixels at this point and no earlier

use fast_image_resize::Resizer;
use image::RgbaImage;
use merge_layout::cpu::{draw_scaled_rgba, fill_rgba, Staging};
use merge_layout::plan::{MergePlan, PixelRect, Size};
use tracing::debug;

use crate::config::Rgba;
use crate::error::{MergeError, MergeResult};
use crate::raster::LoadedImage;

/// A 2D raster the compositor can paint on.
pub trait Surface {
    fn size(&self) -> Size;

    /// Fill the whole surface with one color.
    fn fill(&mut self, color: Rgba);

    /// Draw all of `image` scaled into `dst`.
    fn draw(&mut self, image: &LoadedImage, dst: PixelRect) -> MergeResult<()>;

    /// Hand over the finished pixels.
    fn into_image(self) -> RgbaImage;
}

/// Allocates surfaces of a requested size.
pub trait SurfaceProvider {
    type Surface: Surface;

    fn allocate(&self, size: Size) -> Self::Surface;
}

/// In-memory RGBA8 surfaces drawn with fast_image_resize.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuSurfaceProvider;

pub struct CpuSurface {
    canvas: RgbaImage,
    resizer: Resizer,
    staging: Staging,
}

impl SurfaceProvider for CpuSurfaceProvider {
    type Surface = CpuSurface;

    fn allocate(&self, size: Size) -> CpuSurface {
        CpuSurface {
            canvas: RgbaImage::new(size.w, size.h),
            resizer: Resizer::new(),
            staging: Staging::with_capacity(0),
        }
    }
}

impl Surface for CpuSurface {
    fn size(&self) -> Size {
        Size {
            w: self.canvas.width(),
            h: self.canvas.height(),
        }
    }

    fn fill(&mut self, color: Rgba) {
        fill_rgba(&mut self.canvas, color.0);
    }

    fn draw(&mut self, image: &LoadedImage, dst: PixelRect) -> MergeResult<()> {
        let canvas_size = self.size();
        draw_scaled_rgba(
            &mut self.resizer,
            image.pixels.as_raw(),
            image.size(),
            &mut self.canvas,
            canvas_size,
            dst,
            &mut self.staging,
        )
        .map_err(|source| MergeError::Draw {
            name: image.name.clone(),
            source,
        })
    }

    fn into_image(self) -> RgbaImage {
        self.canvas
    }
}

/// Paint `images` onto a fresh surface following `plan`.
pub fn composite<P: SurfaceProvider>(
    provider: &P,
    images: &[LoadedImage],
    plan: &MergePlan,
    background: Rgba,
) -> MergeResult<P::Surface> {
    debug!(
        width = plan.canvas.w,
        height = plan.canvas.h,
        scale = plan.scale,
        images = images.len(),
        "compositing"
    );
    let mut surface = provider.allocate(plan.canvas);
    surface.fill(background);
    for (image, placement) in images.iter().zip(&plan.placements) {
        surface.draw(image, placement.to_pixels())?;
    }
    Ok(surface)
}
