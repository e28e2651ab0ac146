//! Single-slice enhancement pipeline. Filter order is fixed: denoise,
//! sharpen, edge enhancement, smoothing, then brightness/contrast about the
//! window center, gamma on the normalized value, invert, and finally the
//! geometric flip/rotate. Each step is independently toggled.

use crate::enums::Rotation;
use crate::slice::ScalarSlice;
use crate::windowing::WindowLevel;

use image::imageops;
use image::{GrayImage, ImageBuffer, Luma};
use ndarray::Array2;

/// Fixed blur sigma used inside the unsharp mask.
const UNSHARP_SIGMA: f32 = 2.0;

#[derive(Clone, Copy, Debug)]
pub struct EnhancementParams {
    /// Gaussian noise reduction; kernel size derives from the sigma.
    pub denoise_sigma: Option<f32>,
    /// Unsharp mask amount.
    pub sharpen_amount: Option<f32>,
    /// Sobel gradient magnitude added back with this strength.
    pub edge_strength: Option<f32>,
    /// Final Gaussian smoothing pass.
    pub smooth_sigma: Option<f32>,
    /// Additive offset applied around the window center.
    pub brightness: f32,
    /// Multiplicative contrast about the window center, 0.0 = unchanged.
    pub contrast: f32,
    /// Gamma correction on the normalized windowed value, 1.0 = unchanged.
    pub gamma: f32,
    pub invert: bool,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub rotation: Rotation,
    /// Display window; defaults to the slice's own.
    pub window: Option<WindowLevel>,
}

impl Default for EnhancementParams {
    fn default() -> Self {
        Self {
            denoise_sigma: None,
            sharpen_amount: None,
            edge_strength: None,
            smooth_sigma: None,
            brightness: 0.0,
            contrast: 0.0,
            gamma: 1.0,
            invert: false,
            flip_horizontal: false,
            flip_vertical: false,
            rotation: Rotation::None,
            window: None,
        }
    }
}

/// Clamped-edge sample helper for the convolutions below.
#[inline]
fn at(data: &Array2<f32>, row: isize, column: isize) -> f32 {
    let (rows, columns) = data.dim();
    let r = row.clamp(0, rows as isize - 1) as usize;
    let c = column.clamp(0, columns as isize - 1) as usize;
    data[[r, c]]
}

fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    // Kernel spans sigma * 6, rounded to the next odd size.
    let mut size = (sigma * 6.0).round() as usize;
    if size.is_multiple_of(2) {
        size += 1;
    }
    let size = size.max(3);
    let half = (size / 2) as isize;

    let mut kernel = Vec::with_capacity(size);
    let denom = 2.0 * sigma * sigma;
    for i in -half..=half {
        kernel.push((-(i * i) as f32 / denom).exp());
    }
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Separable Gaussian blur with clamped edges.
fn gaussian_blur(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    let kernel = gaussian_kernel(sigma);
    let half = (kernel.len() / 2) as isize;
    let (rows, columns) = data.dim();

    let horizontal = Array2::from_shape_fn((rows, columns), |(r, c)| {
        kernel
            .iter()
            .enumerate()
            .map(|(i, w)| w * at(data, r as isize, c as isize + i as isize - half))
            .sum()
    });
    Array2::from_shape_fn((rows, columns), |(r, c)| {
        kernel
            .iter()
            .enumerate()
            .map(|(i, w)| w * at(&horizontal, r as isize + i as isize - half, c as isize))
            .sum()
    })
}

/// Sobel gradient magnitude.
fn sobel_magnitude(data: &Array2<f32>) -> Array2<f32> {
    let (rows, columns) = data.dim();
    Array2::from_shape_fn((rows, columns), |(r, c)| {
        let (r, c) = (r as isize, c as isize);
        let gx = -at(data, r - 1, c - 1) + at(data, r - 1, c + 1)
            - 2.0 * at(data, r, c - 1)
            + 2.0 * at(data, r, c + 1)
            - at(data, r + 1, c - 1)
            + at(data, r + 1, c + 1);
        let gy = -at(data, r - 1, c - 1) - 2.0 * at(data, r - 1, c) - at(data, r - 1, c + 1)
            + at(data, r + 1, c - 1)
            + 2.0 * at(data, r + 1, c)
            + at(data, r + 1, c + 1);
        (gx * gx + gy * gy).sqrt()
    })
}

/// Run the enhancement pipeline over one slice and produce a grayscale
/// raster.
pub fn enhance(slice: &ScalarSlice, params: &EnhancementParams) -> GrayImage {
    let window = params
        .window
        .or(slice.window)
        .unwrap_or(WindowLevel::SOFT_TISSUE);
    let (rows, columns) = (slice.rows(), slice.columns());

    let mut data =
        Array2::from_shape_fn((rows, columns), |(r, c)| slice.rescaled(r, c));

    if let Some(sigma) = params.denoise_sigma.filter(|s| *s > 0.0) {
        data = gaussian_blur(&data, sigma);
    }
    if let Some(amount) = params.sharpen_amount.filter(|a| *a > 0.0) {
        let blurred = gaussian_blur(&data, UNSHARP_SIGMA);
        data.zip_mut_with(&blurred, |v, b| *v += amount * (*v - b));
    }
    if let Some(strength) = params.edge_strength.filter(|s| *s > 0.0) {
        let edges = sobel_magnitude(&data);
        data.zip_mut_with(&edges, |v, e| *v += strength * e);
    }
    if let Some(sigma) = params.smooth_sigma.filter(|s| *s > 0.0) {
        data = gaussian_blur(&data, sigma);
    }

    let gamma = if params.gamma > 0.0 { params.gamma } else { 1.0 };
    let raster: ImageBuffer<Luma<u8>, Vec<u8>> =
        ImageBuffer::from_fn(columns as u32, rows as u32, |x, y| {
            let v = data[[y as usize, x as usize]];
            let v = (v - window.center) * (1.0 + params.contrast)
                + window.center
                + params.brightness;
            let mut t = window.normalize(v).powf(1.0 / gamma);
            if params.invert {
                t = 1.0 - t;
            }
            Luma([(t * 255.0) as u8])
        });

    let raster = match params.rotation {
        Rotation::None => raster,
        Rotation::Cw90 => imageops::rotate90(&raster),
        Rotation::Cw180 => imageops::rotate180(&raster),
        Rotation::Cw270 => imageops::rotate270(&raster),
    };
    let raster = if params.flip_horizontal {
        imageops::flip_horizontal(&raster)
    } else {
        raster
    };
    if params.flip_vertical {
        imageops::flip_vertical(&raster)
    } else {
        raster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    fn gradient_slice() -> ScalarSlice {
        let data = Array2::from_shape_fn((8, 8), |(r, c)| (r * 8 + c) as i32 * 4);
        ScalarSlice::new(data).with_window(WindowLevel::new(128.0, 256.0))
    }

    #[test]
    fn default_params_reduce_to_plain_windowing() {
        let slice = gradient_slice();
        let image = enhance(&slice, &EnhancementParams::default());
        let window = slice.window.unwrap();
        for (x, y, pixel) in image.enumerate_pixels() {
            let v = slice.rescaled(y as usize, x as usize);
            assert_eq!(pixel.0[0], (window.normalize(v) * 255.0) as u8);
        }
    }

    #[test]
    fn gaussian_kernel_is_normalized_and_odd() {
        for sigma in [0.5, 1.0, 2.0, 3.7] {
            let kernel = gaussian_kernel(sigma);
            assert_eq!(kernel.len() % 2, 1);
            assert_relative_eq!(kernel.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn blur_preserves_a_constant_field() {
        let data = Array2::from_elem((10, 10), 42.0f32);
        let blurred = gaussian_blur(&data, 1.5);
        for v in blurred.iter() {
            assert_relative_eq!(*v, 42.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn sobel_is_zero_on_flat_and_positive_on_edges() {
        let flat = Array2::from_elem((6, 6), 7.0f32);
        assert!(sobel_magnitude(&flat).iter().all(|v| *v == 0.0));

        let step = arr2(&[
            [0.0f32, 0.0, 100.0, 100.0],
            [0.0, 0.0, 100.0, 100.0],
            [0.0, 0.0, 100.0, 100.0],
            [0.0, 0.0, 100.0, 100.0],
        ]);
        assert!(sobel_magnitude(&step)[[2, 1]] > 0.0);
    }

    #[test]
    fn invert_flips_the_output_ramp() {
        let slice = gradient_slice();
        let plain = enhance(&slice, &EnhancementParams::default());
        let inverted = enhance(
            &slice,
            &EnhancementParams {
                invert: true,
                ..Default::default()
            },
        );
        for (a, b) in plain.pixels().zip(inverted.pixels()) {
            assert!((a.0[0] as i32 + b.0[0] as i32 - 255).abs() <= 1);
        }
    }

    #[test]
    fn rotation_quarter_turn_swaps_dimensions() {
        let data = Array2::from_elem((4, 6), 0);
        let slice = ScalarSlice::new(data);
        let image = enhance(
            &slice,
            &EnhancementParams {
                rotation: Rotation::Cw90,
                ..Default::default()
            },
        );
        assert_eq!(image.dimensions(), (4, 6));
    }

    #[test]
    fn brightness_shifts_the_output_up() {
        let slice = gradient_slice();
        let plain = enhance(&slice, &EnhancementParams::default());
        let brighter = enhance(
            &slice,
            &EnhancementParams {
                brightness: 50.0,
                ..Default::default()
            },
        );
        let sum = |img: &GrayImage| -> u64 { img.pixels().map(|p| p.0[0] as u64).sum() };
        assert!(sum(&brighter) > sum(&plain));
    }
}
