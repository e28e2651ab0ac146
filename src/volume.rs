//! Dense 3-D reconstruction of a sorted slice stack. The volume is built
//! once per render request, read-only afterwards, and dropped when the
//! request completes; any caching happens outside this crate.

use crate::enums::Plane;
use crate::error::EngineError;
use crate::slice::{ScalarSlice, sort_slices};
use crate::windowing::WindowLevel;

use log::debug;
use ndarray::Array3;
use rayon::prelude::*;

/// A dense grid of physically calibrated values (Hounsfield Units for CT),
/// stored `(depth, height, width)`, with per-axis spacing in mm.
pub struct ScalarVolume {
    data: Array3<f32>,
    /// (x, y, z) voxel spacing in mm.
    pub spacing: (f32, f32, f32),
    /// Default display window, taken from the first slice of the stack.
    pub window: WindowLevel,
}

impl ScalarVolume {
    /// Assemble a volume from an unordered slice stack.
    ///
    /// Slices are sorted ascending by location (stable on ties), rescaled
    /// sample by sample and copied into their depth layer. Layer writes run
    /// in parallel but are indexed by the sorted position, so ordering is
    /// deterministic.
    ///
    /// # Errors
    ///
    /// [`EngineError::EmptyInput`] when no slices are given,
    /// [`EngineError::DimensionMismatch`] when any slice disagrees with the
    /// first slice's rows/columns.
    pub fn from_slices(slices: Vec<ScalarSlice>) -> Result<Self, EngineError> {
        let sorted = sort_slices(slices)?;

        let rows = sorted[0].rows();
        let columns = sorted[0].columns();
        for slice in &sorted {
            if slice.rows() != rows || slice.columns() != columns {
                return Err(EngineError::DimensionMismatch {
                    expected_rows: rows,
                    expected_columns: columns,
                    rows: slice.rows(),
                    columns: slice.columns(),
                });
            }
        }

        let depth = sorted.len();
        let mut data = Array3::<f32>::zeros((depth, rows, columns));
        data.outer_iter_mut()
            .into_par_iter()
            .zip(sorted.par_iter())
            .for_each(|(mut layer, slice)| {
                for row in 0..rows {
                    for column in 0..columns {
                        layer[[row, column]] = slice.rescaled(row, column);
                    }
                }
            });

        let first = &sorted[0];
        let spacing = (
            first.pixel_spacing.0,
            first.pixel_spacing.1,
            first.slice_thickness,
        );
        let window = first.window.unwrap_or(WindowLevel::SOFT_TISSUE);
        debug!(
            "assembled volume {}x{}x{} (w*h*d), spacing {:?}",
            columns, rows, depth, spacing
        );

        Ok(Self {
            data,
            spacing,
            window,
        })
    }

    /// Dimensions as (width, height, depth).
    pub fn dim(&self) -> (usize, usize, usize) {
        let (d, h, w) = self.data.dim();
        (w, h, d)
    }

    pub fn width(&self) -> usize {
        self.data.dim().2
    }

    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    pub fn depth(&self) -> usize {
        self.data.dim().0
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Voxel value at integer (x, y, z). Callers guarantee bounds.
    #[inline]
    pub fn value(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[[z, y, x]]
    }

    /// Bounds-checked nearest-voxel sample at floating-point coordinates.
    #[inline]
    pub fn sample(&self, x: f32, y: f32, z: f32) -> Option<f32> {
        if x < 0.0 || y < 0.0 || z < 0.0 {
            return None;
        }
        let (xi, yi, zi) = (x as usize, y as usize, z as usize);
        if xi >= self.width() || yi >= self.height() || zi >= self.depth() {
            return None;
        }
        Some(self.value(xi, yi, zi))
    }

    /// Length of the axis a plane iterates over (its normal axis).
    pub fn axis_len(&self, plane: Plane) -> usize {
        match plane {
            Plane::Axial => self.depth(),
            Plane::Sagittal => self.width(),
            Plane::Coronal => self.height(),
        }
    }
}
