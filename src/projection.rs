//! Intensity projections: reduce a sub-range of the volume along a plane's
//! normal axis into a single windowed raster (MIP / MinIP / average).

use crate::enums::{Plane, ProjectionKind};
use crate::error::EngineError;
use crate::mpr::{output_dimensions, plane_voxel};
use crate::slice::ScalarSlice;
use crate::volume::ScalarVolume;
use crate::windowing::{WindowLevel, to_display};

use image::{GrayImage, ImageBuffer, Luma};

/// Inclusive index range along the projection axis.
#[derive(Clone, Copy, Debug)]
pub struct ProjectionRange {
    pub start: usize,
    pub end: usize,
}

impl ProjectionRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Clamp to `[0, axis_len - 1]`. Clamping is a normalization step, not
    /// an error; an inverted range after clamping is.
    fn clamped(self, axis_len: usize) -> Result<ProjectionRange, EngineError> {
        let start = self.start.min(axis_len - 1);
        let end = self.end.min(axis_len - 1);
        if start > end {
            return Err(EngineError::InvalidRange { start, end });
        }
        Ok(ProjectionRange { start, end })
    }
}

/// Project the volume along the plane's normal axis over `range`.
pub fn project(
    volume: &ScalarVolume,
    kind: ProjectionKind,
    plane: Plane,
    range: ProjectionRange,
    window: Option<WindowLevel>,
) -> Result<GrayImage, EngineError> {
    let window = window.unwrap_or(volume.window);
    let range = range.clamped(volume.axis_len(plane))?;
    let count = (range.end - range.start + 1) as f32;
    let (out_w, out_h) = output_dimensions(volume, plane);

    Ok(ImageBuffer::from_fn(out_w, out_h, |px, py| {
        let mut accum = match kind {
            ProjectionKind::Maximum => f32::NEG_INFINITY,
            ProjectionKind::Minimum => f32::INFINITY,
            ProjectionKind::Average => 0.0,
        };
        for index in range.start..=range.end {
            let value = plane_voxel(volume, plane, px as usize, py as usize, index);
            match kind {
                ProjectionKind::Maximum => accum = accum.max(value),
                ProjectionKind::Minimum => accum = accum.min(value),
                ProjectionKind::Average => accum += value,
            }
        }
        if kind == ProjectionKind::Average {
            accum /= count;
        }
        Luma([to_display(accum, window, false)])
    }))
}

/// Assemble a volume from `slices` and project it in one call.
pub fn render_projection(
    slices: Vec<ScalarSlice>,
    kind: ProjectionKind,
    plane: Plane,
    range: ProjectionRange,
    window: Option<WindowLevel>,
) -> Result<GrayImage, EngineError> {
    let volume = ScalarVolume::from_slices(slices)?;
    project(&volume, kind, plane, range, window)
}
