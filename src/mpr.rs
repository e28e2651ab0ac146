//! Multi-planar reconstruction: extract one cardinal slice of the volume as
//! a windowed grayscale raster. Sampling is nearest-voxel; the slice index
//! is clamped to the axis, never an error.

use crate::enums::Plane;
use crate::error::EngineError;
use crate::slice::ScalarSlice;
use crate::volume::ScalarVolume;
use crate::windowing::{WindowLevel, to_display};

use image::{GrayImage, ImageBuffer, Luma};

/// Output raster dimensions for a plane, (width, height).
pub(crate) fn output_dimensions(volume: &ScalarVolume, plane: Plane) -> (u32, u32) {
    let (w, h, d) = volume.dim();
    match plane {
        // Looking down the stack: X is width, Y is height.
        Plane::Axial => (w as u32, h as u32),
        // Looking from the side: the stack axis is width, Y is height.
        Plane::Sagittal => (d as u32, h as u32),
        // Looking from the front: X is width, the stack axis is height.
        Plane::Coronal => (w as u32, d as u32),
    }
}

#[inline]
pub(crate) fn plane_voxel(
    volume: &ScalarVolume,
    plane: Plane,
    px: usize,
    py: usize,
    index: usize,
) -> f32 {
    match plane {
        Plane::Axial => volume.value(px, py, index),
        Plane::Sagittal => volume.value(index, py, px),
        Plane::Coronal => volume.value(px, index, py),
    }
}

/// Extract the slice at `index` along the plane's normal axis.
pub fn reformat(
    volume: &ScalarVolume,
    plane: Plane,
    index: usize,
    window: Option<WindowLevel>,
) -> GrayImage {
    let window = window.unwrap_or(volume.window);
    let index = index.min(volume.axis_len(plane) - 1);
    let (out_w, out_h) = output_dimensions(volume, plane);

    ImageBuffer::from_fn(out_w, out_h, |px, py| {
        let value = plane_voxel(volume, plane, px as usize, py as usize, index);
        Luma([to_display(value, window, false)])
    })
}

/// Assemble a volume from `slices` and reformat it in one call.
pub fn render_reformat(
    slices: Vec<ScalarSlice>,
    plane: Plane,
    index: usize,
    window: Option<WindowLevel>,
) -> Result<GrayImage, EngineError> {
    let volume = ScalarVolume::from_slices(slices)?;
    Ok(reformat(&volume, plane, index, window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn stack() -> Vec<ScalarSlice> {
        (0..4)
            .map(|z| {
                let data = Array2::from_shape_fn((3, 5), |(r, c)| (z * 100 + r * 10 + c) as i32);
                ScalarSlice::new(data).with_location(z as f32)
            })
            .collect()
    }

    #[test]
    fn axial_reformat_reproduces_the_input_slice() {
        let slices = stack();
        let window = WindowLevel::new(128.0, 256.0);
        let expected: Vec<u8> = slices[2]
            .data()
            .iter()
            .map(|&v| to_display(v as f32, window, false))
            .collect();

        let image = render_reformat(slices, Plane::Axial, 2, Some(window)).expect("valid stack");
        assert_eq!(image.dimensions(), (5, 3));
        assert_eq!(image.as_raw(), &expected);
    }

    #[test]
    fn sagittal_and_coronal_dimensions() {
        let volume = ScalarVolume::from_slices(stack()).expect("valid stack");
        assert_eq!(output_dimensions(&volume, Plane::Sagittal), (4, 3));
        assert_eq!(output_dimensions(&volume, Plane::Coronal), (5, 4));
    }

    #[test]
    fn out_of_range_index_clamps_to_last_slice() {
        let volume = ScalarVolume::from_slices(stack()).expect("valid stack");
        let window = WindowLevel::new(128.0, 256.0);
        let clamped = reformat(&volume, Plane::Axial, 99, Some(window));
        let last = reformat(&volume, Plane::Axial, 3, Some(window));
        assert_eq!(clamped.as_raw(), last.as_raw());
    }

    #[test]
    fn sagittal_pixel_maps_stack_axis_to_width() {
        let volume = ScalarVolume::from_slices(stack()).expect("valid stack");
        // Column px of a sagittal image walks through the stack.
        assert_eq!(plane_voxel(&volume, Plane::Sagittal, 3, 1, 2), 312.0);
    }
}
