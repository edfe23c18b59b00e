// SPDX-License-Identifier: MIT
//! # merge-layout: Geometry and Pixels for Image Merging
//!
//! This crate computes where every image of a merge lands on the output canvas
//! and provides the CPU primitives that put the pixels there. It performs no
//! I/O and knows nothing about file names or encodings.
//!
//! ## Key Components
//!
//! - [`plan`]: Natural (unscaled) layout for horizontal strips, vertical strips
//!   and grids, plus the global target-size scale and the final placements
//! - [`grid`]: Grid shape selection and per-track extents
//! - [`cpu`]: RGBA8 fill and scaled, alpha-composited draws built on
//!   fast_image_resize
//!
//! ## Coordinate Model
//!
//! Layout is computed in `f64` so that per-image scale factors and gaps do not
//! accumulate rounding error. Rectangles are rounded to whole pixels only at
//! draw time via [`plan::RectF::to_pixels`].
//!
//! ## Usage Example
//!
//! ```rust
//! use merge_layout::plan::{build_plan, Arrangement, Size, TargetSize};
//!
//! let inputs = [Size { w: 100, h: 50 }, Size { w: 60, h: 30 }];
//! let plan = build_plan(&inputs, Arrangement::Horizontal, 0, TargetSize::Natural).unwrap();
//! assert_eq!(plan.canvas, Size { w: 200, h: 50 });
//! ```

pub mod cpu;
pub mod grid;
pub mod plan;
