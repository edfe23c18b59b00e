// SPDX-License-Identifier: MIT
//! # Grid Shape Selection
//!
//! Grid merges assign images to cells in row-major order. Each column is as
//! wide as its widest image and each row as tall as its tallest image, so a
//! single oversized image widens only its own column and heightens only its
//! own row.
//!
//! ## Shape Selection
//!
//! - **Explicit**: the caller's column count is used as-is, even when it
//!   exceeds the number of images (unused columns collapse to zero width but
//!   still contribute their gap). Only occupied columns get a track, so an
//!   absurd column count costs no memory.
//! - **Automatic**: `columns = ceil(sqrt(n))`
//! - **Rows**: always `ceil(n / columns)`

use std::num::NonZeroU32;

use crate::plan::Size;

/// Column and row counts of a grid merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridShape {
    pub columns: u32,
    pub rows: u32,
}

impl GridShape {
    /// Row-major cell of the image at `index` as `(row, column)`.
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        let cols = self.columns as usize;
        (index / cols, index % cols)
    }
}

/// Smallest `c` with `c * c >= n`, computed without floating point.
fn ceil_sqrt(n: u32) -> u32 {
    let mut c = 1u32;
    while c.saturating_mul(c) < n {
        c += 1;
    }
    c
}

/// Pick the grid shape for `n` images.
///
/// `n` must be at least 1; callers reject empty merges before planning.
pub fn choose_shape(n: usize, columns: Option<NonZeroU32>) -> GridShape {
    let n = u32::try_from(n.max(1)).unwrap_or(u32::MAX);
    let columns = columns.map(NonZeroU32::get).unwrap_or_else(|| ceil_sqrt(n));
    let rows = n.div_ceil(columns);
    GridShape { columns, rows }
}

/// Column widths and row heights (natural pixels) for `inputs` laid out in `shape`.
///
/// Column tracks are returned for occupied columns only; see [`columns_span`].
pub fn track_extents(inputs: &[Size], shape: GridShape) -> (Vec<f64>, Vec<f64>) {
    let occupied = (shape.columns as usize).min(inputs.len().max(1));
    let mut col_w = vec![0.0f64; occupied];
    let mut row_h = vec![0.0f64; shape.rows as usize];
    for (i, s) in inputs.iter().enumerate() {
        let (r, c) = shape.cell_of(i);
        col_w[c] = col_w[c].max(f64::from(s.w));
        row_h[r] = row_h[r].max(f64::from(s.h));
    }
    (col_w, row_h)
}

/// Leading offset of every track, with `gap` between consecutive tracks.
pub fn track_offsets(extents: &[f64], gap: f64) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(extents.len());
    let mut at = 0.0;
    for (i, e) in extents.iter().enumerate() {
        offsets.push(at);
        at += e;
        if i + 1 < extents.len() {
            at += gap;
        }
    }
    offsets
}

/// Total length of all tracks plus the gaps between them.
pub fn track_span(extents: &[f64], gap: f64) -> f64 {
    let gaps = extents.len().saturating_sub(1) as f64;
    extents.iter().sum::<f64>() + gap * gaps
}

/// Total grid width: occupied columns plus one gap per column boundary,
/// including boundaries of the empty trailing columns.
pub fn columns_span(col_w: &[f64], shape: GridShape, gap: f64) -> f64 {
    let empty = (shape.columns as usize).saturating_sub(col_w.len());
    track_span(col_w, gap) + gap * empty as f64
}
