// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Escape-time field of the Mandelbrot recurrence `z <- z^2 + c` over a
//! rectangular grid of `c` values.

use fan_out_core::WorkloadError;
use serde::{Deserialize, Serialize};
use std::ops::{Index, Range};

/// |z|^2 at or above this marks escape.
pub const ESCAPE_RADIUS_SQUARED: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub re_min: f64,
    pub im_min: f64,
    pub re_max: f64,
    pub im_max: f64,
}

impl Bounds {
    pub fn new(re_min: f64, im_min: f64, re_max: f64, im_max: f64) -> Self {
        Self {
            re_min,
            im_min,
            re_max,
            im_max,
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(-2.0, -1.5, 1.0, 1.5)
    }
}

/// Columns (`nx`, real axis) by rows (`ny`, imaginary axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub nx: usize,
    pub ny: usize,
}

impl Resolution {
    pub fn new(nx: usize, ny: usize) -> Self {
        Self { nx, ny }
    }
}

/// A validated coordinate grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    bounds: Bounds,
    resolution: Resolution,
}

impl Grid {
    pub fn new(bounds: Bounds, resolution: Resolution) -> Result<Self, WorkloadError> {
        let grid = Self { bounds, resolution };
        grid.validate()?;
        Ok(grid)
    }

    /// Re-checks the invariants, for grids that arrived by deserialization.
    pub fn validate(&self) -> Result<(), WorkloadError> {
        let Bounds {
            re_min,
            im_min,
            re_max,
            im_max,
        } = self.bounds;
        if ![re_min, im_min, re_max, im_max].iter().all(|v| v.is_finite()) {
            return Err(invalid("grid bounds must be finite"));
        }
        if re_max <= re_min {
            return Err(invalid("re_max must be greater than re_min"));
        }
        if im_max <= im_min {
            return Err(invalid("im_max must be greater than im_min"));
        }
        if self.resolution.nx == 0 || self.resolution.ny == 0 {
            return Err(invalid("grid resolution must be positive"));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn d_re(&self) -> f64 {
        (self.bounds.re_max - self.bounds.re_min) / self.resolution.nx as f64
    }

    pub fn d_im(&self) -> f64 {
        (self.bounds.im_max - self.bounds.im_min) / self.resolution.ny as f64
    }

    /// `c` for column `col` and row `row`.
    pub fn point(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.bounds.re_min + self.d_re() * col as f64,
            self.bounds.im_min + self.d_im() * row as f64,
        )
    }
}

fn invalid(reason: &str) -> WorkloadError {
    WorkloadError::InvalidArgument(reason.to_string())
}

/// Row-major 2-D array indexed by `[(row, col)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldArray<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> FieldArray<T> {
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        (row < self.rows && col < self.cols).then(|| &self.data[row * self.cols + col])
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T> Index<(usize, usize)> for FieldArray<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} field",
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

/// Escape counts and final magnitudes for a band of rows starting at
/// `row_offset` of the full grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscapeField {
    pub row_offset: usize,
    pub iterations: FieldArray<u32>,
    pub magnitudes: FieldArray<f64>,
}

/// Iterates `z <- z^2 + c` from `z = 0` until `max_iter` iterations or
/// `|z|^2 >= 4`. Returns the iteration count and the final `|z|^2`.
pub fn escape_time(c_re: f64, c_im: f64, max_iter: u32) -> (u32, f64) {
    let (mut z_re, mut z_im) = (0.0f64, 0.0f64);
    let mut magnitude = 0.0;
    let mut k = 0;
    while k < max_iter && magnitude < ESCAPE_RADIUS_SQUARED {
        let next_re = z_re * z_re - z_im * z_im + c_re;
        z_im = 2.0 * z_re * z_im + c_im;
        z_re = next_re;
        magnitude = z_re * z_re + z_im * z_im;
        k += 1;
    }
    (k, magnitude)
}

/// Escape field of the whole grid.
pub fn compute(grid: &Grid, max_iter: u32) -> Result<EscapeField, WorkloadError> {
    compute_rows(grid, 0..grid.resolution().ny, max_iter)
}

/// Escape field of `rows` only. Coordinates come from the full grid, so bands
/// computed separately concatenate into exactly what [`compute`] returns.
pub fn compute_rows(
    grid: &Grid,
    rows: Range<usize>,
    max_iter: u32,
) -> Result<EscapeField, WorkloadError> {
    grid.validate()?;
    if max_iter == 0 {
        return Err(invalid("max_iter must be positive"));
    }
    if rows.is_empty() || rows.end > grid.resolution().ny {
        return Err(WorkloadError::InvalidArgument(format!(
            "row range {rows:?} outside grid of {} rows",
            grid.resolution().ny
        )));
    }

    let cols = grid.resolution().nx;
    let cells = rows.len() * cols;
    let mut iterations = Vec::with_capacity(cells);
    let mut magnitudes = Vec::with_capacity(cells);

    for row in rows.clone() {
        for col in 0..cols {
            let (c_re, c_im) = grid.point(col, row);
            let (k, magnitude) = escape_time(c_re, c_im, max_iter);
            iterations.push(k);
            magnitudes.push(magnitude);
        }
    }

    Ok(EscapeField {
        row_offset: rows.start,
        iterations: FieldArray {
            rows: rows.len(),
            cols,
            data: iterations,
        },
        magnitudes: FieldArray {
            rows: rows.len(),
            cols,
            data: magnitudes,
        },
    })
}
