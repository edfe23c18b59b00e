// SPDX-License-Identifier: MIT
//! # Merge Plan Computation
//!
//! This module turns a list of image sizes into a complete merge plan: the
//! final canvas size and, per image, the rectangle it is drawn into.
//!
//! ## Two Phases
//!
//! 1. **Natural layout** ([`layout_natural`]): every image gets a cell and an
//!    aspect-preserving content size, in unscaled pixels
//!    - Horizontal: all images take the tallest height, widths follow
//!    - Vertical: all images take the widest width, heights follow
//!    - Grid: per-column max width and per-row max height, content fitted and
//!      centered inside its cell
//! 2. **Global scale** ([`resolve_scale`]): an optional target width and/or
//!    height yields one uniform factor applied to cells, content and gaps
//!
//! A single image is passed through at its native size with no scaling.

use std::fmt;
use std::num::NonZeroU32;

use crate::grid::{self, GridShape};

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Fractional size used during layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeF {
    pub w: f64,
    pub h: f64,
}

/// Fractional rectangle in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Whole-pixel rectangle, produced right before drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub w: u32,
    pub h: u32,
}

impl RectF {
    pub fn scaled(self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
            w: self.w * s,
            h: self.h * s,
        }
    }

    /// Round every edge parameter to the nearest pixel.
    pub fn to_pixels(self) -> PixelRect {
        PixelRect {
            x: self.x.round() as i64,
            y: self.y.round() as i64,
            w: self.w.round().max(0.0) as u32,
            h: self.h.round().max(0.0) as u32,
        }
    }
}

/// How the images of one merge are arranged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arrangement {
    /// One row, left to right, normalized to the tallest image.
    Horizontal,
    /// One column, top to bottom, normalized to the widest image.
    Vertical,
    /// Row-major grid; `None` picks `ceil(sqrt(n))` columns.
    Grid { columns: Option<NonZeroU32> },
}

/// Optional output size constraint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetSize {
    /// Keep the natural canvas size.
    Natural,
    /// Scale so the canvas is this wide.
    Width(f64),
    /// Scale so the canvas is this tall.
    Height(f64),
    /// Largest uniform scale that fits inside both dimensions.
    Bounded { width: f64, height: f64 },
}

/// Placement of one image in the natural layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slot {
    /// The cell reserved for the image.
    pub cell: RectF,
    /// The aspect-preserving size of the image inside the cell.
    pub content: SizeF,
}

impl Slot {
    /// Content rectangle after the global scale, centered in the scaled cell.
    ///
    /// Slack is split evenly and floored, so odd leftovers go to the right and
    /// bottom edges.
    pub fn resolve(&self, scale: f64) -> RectF {
        let cell = self.cell.scaled(scale);
        let w = self.content.w * scale;
        let h = self.content.h * scale;
        let dx = ((cell.w - w).max(0.0) / 2.0).floor();
        let dy = ((cell.h - h).max(0.0) / 2.0).floor();
        RectF {
            x: cell.x + dx,
            y: cell.y + dy,
            w,
            h,
        }
    }
}

/// Unscaled layout of a merge.
#[derive(Clone, Debug, PartialEq)]
pub struct NaturalLayout {
    pub width: f64,
    pub height: f64,
    pub slots: Vec<Slot>,
    /// Shape used when the arrangement is a grid.
    pub grid: Option<GridShape>,
}

/// Complete merge plan: everything the compositor needs.
#[derive(Clone, Debug, PartialEq)]
pub struct MergePlan {
    pub natural: NaturalLayout,
    /// Uniform factor applied to the natural layout.
    pub scale: f64,
    /// Final canvas size in pixels.
    pub canvas: Size,
    /// Per-image destination rectangles after scaling, in input order.
    pub placements: Vec<RectF>,
}

/// Largest canvas, in pixels, a plan may ask for (1 GiB of RGBA8).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Nothing to lay out.
    Empty,
    /// An input reported a zero width or height.
    ZeroSized { index: usize },
    /// A target dimension was zero, negative or not finite.
    InvalidTarget { value: f64 },
    /// The scaled canvas exceeds [`MAX_CANVAS_PIXELS`].
    CanvasTooLarge { width: f64, height: f64 },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Empty => write!(f, "No images to lay out"),
            LayoutError::ZeroSized { index } => {
                write!(f, "Image #{} has a zero width or height", index)
            }
            LayoutError::InvalidTarget { value } => {
                write!(f, "Target dimension must be a positive number, got {}", value)
            }
            LayoutError::CanvasTooLarge { width, height } => write!(
                f,
                "Canvas of {:.0}x{:.0} pixels exceeds the limit of {} pixels",
                width, height, MAX_CANVAS_PIXELS
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Scale `input` by the largest factor that keeps it inside `cell`.
fn fit_within(input: Size, cell: SizeF) -> SizeF {
    let (w, h) = (f64::from(input.w), f64::from(input.h));
    let s = (cell.w / w).min(cell.h / h);
    SizeF { w: w * s, h: h * s }
}

/// Compute the natural layout of `inputs` for the given arrangement and gap.
pub fn layout_natural(
    inputs: &[Size],
    arrangement: Arrangement,
    gap: u32,
) -> Result<NaturalLayout, LayoutError> {
    if inputs.is_empty() {
        return Err(LayoutError::Empty);
    }
    if let Some(index) = inputs.iter().position(|s| s.w == 0 || s.h == 0) {
        return Err(LayoutError::ZeroSized { index });
    }

    if let [only] = inputs {
        let (w, h) = (f64::from(only.w), f64::from(only.h));
        return Ok(NaturalLayout {
            width: w,
            height: h,
            slots: vec![Slot {
                cell: RectF { x: 0.0, y: 0.0, w, h },
                content: SizeF { w, h },
            }],
            grid: None,
        });
    }

    let gap = f64::from(gap);
    let layout = match arrangement {
        Arrangement::Horizontal => {
            let row_h = inputs.iter().map(|s| f64::from(s.h)).fold(0.0, f64::max);
            let mut slots = Vec::with_capacity(inputs.len());
            let mut x = 0.0;
            for s in inputs {
                let w = f64::from(s.w) * (row_h / f64::from(s.h));
                slots.push(Slot {
                    cell: RectF { x, y: 0.0, w, h: row_h },
                    content: SizeF { w, h: row_h },
                });
                x += w + gap;
            }
            let widths: Vec<f64> = slots.iter().map(|s| s.cell.w).collect();
            NaturalLayout {
                width: grid::track_span(&widths, gap),
                height: row_h,
                slots,
                grid: None,
            }
        }
        Arrangement::Vertical => {
            let col_w = inputs.iter().map(|s| f64::from(s.w)).fold(0.0, f64::max);
            let mut slots = Vec::with_capacity(inputs.len());
            let mut y = 0.0;
            for s in inputs {
                let h = f64::from(s.h) * (col_w / f64::from(s.w));
                slots.push(Slot {
                    cell: RectF { x: 0.0, y, w: col_w, h },
                    content: SizeF { w: col_w, h },
                });
                y += h + gap;
            }
            let heights: Vec<f64> = slots.iter().map(|s| s.cell.h).collect();
            NaturalLayout {
                width: col_w,
                height: grid::track_span(&heights, gap),
                slots,
                grid: None,
            }
        }
        Arrangement::Grid { columns } => {
            let shape = grid::choose_shape(inputs.len(), columns);
            let (col_w, row_h) = grid::track_extents(inputs, shape);
            let xs = grid::track_offsets(&col_w, gap);
            let ys = grid::track_offsets(&row_h, gap);
            let slots = inputs
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let (r, c) = shape.cell_of(i);
                    let cell = RectF {
                        x: xs[c],
                        y: ys[r],
                        w: col_w[c],
                        h: row_h[r],
                    };
                    Slot {
                        cell,
                        content: fit_within(*s, SizeF { w: cell.w, h: cell.h }),
                    }
                })
                .collect();
            NaturalLayout {
                width: grid::columns_span(&col_w, shape, gap),
                height: grid::track_span(&row_h, gap),
                slots,
                grid: Some(shape),
            }
        }
    };
    Ok(layout)
}

fn check_target(value: f64) -> Result<f64, LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LayoutError::InvalidTarget { value })
    }
}

/// Uniform scale that maps a natural canvas onto the target constraint.
pub fn resolve_scale(natural_w: f64, natural_h: f64, target: TargetSize) -> Result<f64, LayoutError> {
    let scale = match target {
        TargetSize::Natural => 1.0,
        TargetSize::Width(w) => check_target(w)? / natural_w,
        TargetSize::Height(h) => check_target(h)? / natural_h,
        TargetSize::Bounded { width, height } => {
            (check_target(width)? / natural_w).min(check_target(height)? / natural_h)
        }
    };
    Ok(scale)
}

/// Build the full merge plan for `inputs`.
pub fn build_plan(
    inputs: &[Size],
    arrangement: Arrangement,
    gap: u32,
    target: TargetSize,
) -> Result<MergePlan, LayoutError> {
    let natural = layout_natural(inputs, arrangement, gap)?;
    let scale = if inputs.len() == 1 {
        1.0
    } else {
        resolve_scale(natural.width, natural.height, target)?
    };
    let width = (natural.width * scale).round().max(1.0);
    let height = (natural.height * scale).round().max(1.0);
    // Also rejects infinite or NaN sizes.
    if !(width * height <= MAX_CANVAS_PIXELS as f64) {
        return Err(LayoutError::CanvasTooLarge { width, height });
    }
    let canvas = Size {
        w: width as u32,
        h: height as u32,
    };
    let placements = natural.slots.iter().map(|s| s.resolve(scale)).collect();
    Ok(MergePlan {
        natural,
        scale,
        canvas,
        placements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sz(w: u32, h: u32) -> Size {
        Size { w, h }
    }

    #[test]
    fn test_horizontal_normalizes_to_tallest() {
        let plan = build_plan(
            &[sz(100, 50), sz(60, 30)],
            Arrangement::Horizontal,
            0,
            TargetSize::Natural,
        )
        .unwrap();
        assert_eq!(plan.canvas, sz(200, 50));
        assert_eq!(plan.placements[0], RectF { x: 0.0, y: 0.0, w: 100.0, h: 50.0 });
        assert_eq!(plan.placements[1], RectF { x: 100.0, y: 0.0, w: 100.0, h: 50.0 });
    }

    #[test]
    fn test_horizontal_gap_between_images_only() {
        let plan = build_plan(
            &[sz(100, 100), sz(100, 100)],
            Arrangement::Horizontal,
            10,
            TargetSize::Natural,
        )
        .unwrap();
        assert_eq!(plan.canvas, sz(210, 100));
        assert_eq!(plan.placements[1].x, 110.0);
    }

    #[test]
    fn test_vertical_normalizes_to_widest() {
        let plan = build_plan(
            &[sz(40, 20), sz(80, 10), sz(20, 20)],
            Arrangement::Vertical,
            5,
            TargetSize::Natural,
        )
        .unwrap();
        // Heights: 40, 10, 80
        assert_eq!(plan.canvas, sz(80, 140));
        let ys: Vec<f64> = plan.placements.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0.0, 45.0, 60.0]);
        assert!(plan.placements.iter().all(|p| p.w == 80.0));
    }

    #[test]
    fn test_grid_centers_content_in_cells() {
        // Cells: col widths [100, 50], row heights [100, 40]
        let inputs = [sz(100, 100), sz(50, 25), sz(20, 40)];
        let plan = build_plan(&inputs, Arrangement::Grid { columns: None }, 0, TargetSize::Natural)
            .unwrap();
        assert_eq!(plan.natural.grid, Some(GridShape { columns: 2, rows: 2 }));
        assert_eq!(plan.canvas, sz(150, 140));

        // 50x25 scaled by min(50/50, 100/25) = 1, vertical slack 75 -> 37
        assert_eq!(plan.placements[1], RectF { x: 100.0, y: 37.0, w: 50.0, h: 25.0 });
        // 20x40 in a 100x40 cell: horizontal slack 80 -> 40
        assert_eq!(plan.placements[2], RectF { x: 40.0, y: 100.0, w: 20.0, h: 40.0 });
    }

    #[test]
    fn test_grid_gap_counts_every_column() {
        let inputs = [sz(10, 10), sz(10, 10)];
        let plan = build_plan(
            &inputs,
            Arrangement::Grid { columns: NonZeroU32::new(3) },
            4,
            TargetSize::Natural,
        )
        .unwrap();
        assert_eq!(plan.canvas, sz(28, 10));
    }

    #[test]
    fn test_target_width_scales_everything() {
        let inputs = [sz(100, 100), sz(100, 100)];
        let plan = build_plan(&inputs, Arrangement::Horizontal, 0, TargetSize::Width(100.0)).unwrap();
        assert_eq!(plan.scale, 0.5);
        assert_eq!(plan.canvas, sz(100, 50));
        assert_eq!(plan.placements[1], RectF { x: 50.0, y: 0.0, w: 50.0, h: 50.0 });
    }

    #[test]
    fn test_bounded_target_takes_smaller_ratio() {
        let scale = resolve_scale(200.0, 100.0, TargetSize::Bounded { width: 100.0, height: 100.0 })
            .unwrap();
        assert_eq!(scale, 0.5);
        let scale = resolve_scale(200.0, 100.0, TargetSize::Height(300.0)).unwrap();
        assert_eq!(scale, 3.0);
    }

    #[test]
    fn test_canvas_never_collapses() {
        let plan = build_plan(
            &[sz(10, 10), sz(10, 10)],
            Arrangement::Horizontal,
            0,
            TargetSize::Height(0.01),
        )
        .unwrap();
        assert_eq!(plan.canvas, sz(1, 1));
    }

    #[test]
    fn test_single_image_passes_through() {
        let plan = build_plan(&[sz(37, 21)], Arrangement::Horizontal, 50, TargetSize::Width(10.0))
            .unwrap();
        assert_eq!(plan.canvas, sz(37, 21));
        assert_eq!(plan.scale, 1.0);
        assert_eq!(plan.placements[0], RectF { x: 0.0, y: 0.0, w: 37.0, h: 21.0 });
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert_eq!(
            build_plan(&[], Arrangement::Vertical, 0, TargetSize::Natural),
            Err(LayoutError::Empty)
        );
        assert_eq!(
            build_plan(&[sz(1, 1), sz(0, 4)], Arrangement::Vertical, 0, TargetSize::Natural),
            Err(LayoutError::ZeroSized { index: 1 })
        );
        assert!(matches!(
            build_plan(&[sz(1, 1), sz(1, 1)], Arrangement::Vertical, 0, TargetSize::Width(-3.0)),
            Err(LayoutError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_pixel_rounding() {
        let r = RectF { x: 10.5, y: 0.49, w: 99.5, h: 0.2 };
        assert_eq!(r.to_pixels(), PixelRect { x: 11, y: 0, w: 100, h: 0 });
    }

    #[test]
    fn test_rejects_oversized_canvas() {
        let inputs = [sz(10, 10), sz(10, 10)];
        assert!(matches!(
            build_plan(
                &inputs,
                Arrangement::Horizontal,
                0,
                TargetSize::Bounded { width: 1e10, height: 1e10 }
            ),
            Err(LayoutError::CanvasTooLarge { .. })
        ));
        assert!(matches!(
            build_plan(&inputs, Arrangement::Vertical, u32::MAX, TargetSize::Natural),
            Err(LayoutError::CanvasTooLarge { .. })
        ));

        // Just inside the limit.
        let side = 1u32 << 14;
        let plan = build_plan(
            &inputs,
            Arrangement::Horizontal,
            0,
            TargetSize::Bounded { width: f64::from(side), height: f64::from(side / 2) },
        )
        .unwrap();
        assert_eq!(plan.canvas, sz(side, side / 2));
    }

    #[test]
    fn test_huge_column_count() {
        let inputs = [sz(10, 10), sz(10, 10)];
        let columns = NonZeroU32::new(4_000_000_000);
        let plan = build_plan(&inputs, Arrangement::Grid { columns }, 0, TargetSize::Natural).unwrap();
        assert_eq!(plan.canvas, sz(20, 10));
        assert!(matches!(
            build_plan(&inputs, Arrangement::Grid { columns }, 8, TargetSize::Natural),
            Err(LayoutError::CanvasTooLarge { .. })
        ));
    }
}
