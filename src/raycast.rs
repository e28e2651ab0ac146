//! Direct volume rendering: orthographic per-pixel ray marching through the
//! rotated volume with front-to-back alpha compositing. Each output pixel
//! depends only on the immutable volume and the render parameters, so rows
//! are rendered on the rayon pool with no locking.

use crate::error::EngineError;
use crate::slice::ScalarSlice;
use crate::volume::ScalarVolume;
use crate::windowing::WindowLevel;

use image::RgbaImage;
use log::debug;
use rayon::prelude::*;

/// Intensity-to-color-and-opacity mapping used during compositing. Input is
/// the window-normalized intensity in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransferFunction {
    Bone,
    Skin,
    Muscle,
    Vessels,
    #[default]
    Default,
}

impl TransferFunction {
    /// (r, g, b, a), all in [0, 1].
    pub fn evaluate(&self, t: f32) -> [f32; 4] {
        let t = t.clamp(0.0, 1.0);
        match self {
            TransferFunction::Default => [t, t, t, t],
            TransferFunction::Bone => ramp(t, 0.35, [0.95, 0.93, 0.88], 1.0),
            TransferFunction::Skin => ramp(t, 0.08, [0.87, 0.67, 0.58], 0.35),
            TransferFunction::Muscle => ramp(t, 0.20, [0.65, 0.30, 0.30], 0.60),
            TransferFunction::Vessels => ramp(t, 0.55, [0.85, 0.15, 0.12], 1.0),
        }
    }
}

/// Zero opacity below `threshold`, linear ramp to `max_alpha` above it.
#[inline]
fn ramp(t: f32, threshold: f32, color: [f32; 3], max_alpha: f32) -> [f32; 4] {
    if t < threshold {
        return [0.0; 4];
    }
    let a = (t - threshold) / (1.0 - threshold) * max_alpha;
    [color[0], color[1], color[2], a]
}

/// Parameters for one volume render.
#[derive(Clone, Copy, Debug)]
pub struct RenderParams {
    /// Rotation about (x, y, z) in degrees, composed as `Rz * Ry * Rx`.
    pub rotation_deg: (f32, f32, f32),
    /// Window used to normalize intensities; defaults to the volume window.
    pub window: Option<WindowLevel>,
    pub transfer: TransferFunction,
    /// Global opacity scale in [0, 1].
    pub opacity: f32,
    /// Output raster size (width, height).
    pub output_size: (u32, u32),
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            rotation_deg: (0.0, 0.0, 0.0),
            window: None,
            transfer: TransferFunction::Default,
            opacity: 1.0,
            output_size: (256, 256),
        }
    }
}

type Mat3 = [[f32; 3]; 3];

fn mat_mul(a: Mat3, b: Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

#[inline]
fn mat_apply(m: Mat3, v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn rotation_matrix(degrees: (f32, f32, f32)) -> Mat3 {
    let (rx, ry, rz) = (
        degrees.0.to_radians(),
        degrees.1.to_radians(),
        degrees.2.to_radians(),
    );
    let (sx, cx) = rx.sin_cos();
    let (sy, cy) = ry.sin_cos();
    let (sz, cz) = rz.sin_cos();

    let m_x = [[1.0, 0.0, 0.0], [0.0, cx, -sx], [0.0, sx, cx]];
    let m_y = [[cy, 0.0, sy], [0.0, 1.0, 0.0], [-sy, 0.0, cy]];
    let m_z = [[cz, -sz, 0.0], [sz, cz, 0.0], [0.0, 0.0, 1.0]];
    mat_mul(m_z, mat_mul(m_y, m_x))
}

/// Ray-cast the volume into an RGBA raster.
pub fn raycast(volume: &ScalarVolume, params: &RenderParams) -> RgbaImage {
    let window = params.window.unwrap_or(volume.window);
    let opacity = params.opacity.clamp(0.0, 1.0);
    let (out_w, out_h) = params.output_size;
    let (w, h, d) = volume.dim();

    let rotation = rotation_matrix(params.rotation_deg);
    let longest = w.max(h).max(d) as f32;
    let fit = (out_w.min(out_h)) as f32 / longest;
    let center = [w as f32 / 2.0, h as f32 / 2.0, d as f32 / 2.0];
    let diagonal = ((w * w + h * h + d * d) as f32).sqrt();
    let max_steps = diagonal.ceil() as i32;

    debug!(
        "raycast {}x{} over {}x{}x{} volume, {} steps per ray",
        out_w, out_h, w, h, d, max_steps
    );

    let pixels: Vec<u8> = (0..out_h)
        .into_par_iter()
        .flat_map(|py| {
            let mut row = Vec::with_capacity(out_w as usize * 4);
            for px in 0..out_w {
                let sx = (px as f32 - out_w as f32 / 2.0) / fit;
                let sy = (py as f32 - out_h as f32 / 2.0) / fit;

                let mut accum_c = [0.0f32; 3];
                let mut accum_a = 0.0f32;

                for t in -max_steps / 2..=max_steps / 2 {
                    let p = mat_apply(rotation, [sx, sy, t as f32]);
                    let Some(value) = volume.sample(
                        p[0] + center[0],
                        p[1] + center[1],
                        p[2] + center[2],
                    ) else {
                        continue;
                    };

                    let intensity = window.normalize(value);
                    let [r, g, b, a] = params.transfer.evaluate(intensity);
                    let a = a * opacity;
                    if a <= 0.0 {
                        continue;
                    }

                    let weight = (1.0 - accum_a) * a;
                    accum_c[0] += weight * r;
                    accum_c[1] += weight * g;
                    accum_c[2] += weight * b;
                    accum_a += weight;
                    if accum_a >= 0.99 {
                        break;
                    }
                }

                row.push((accum_c[0].clamp(0.0, 1.0) * 255.0) as u8);
                row.push((accum_c[1].clamp(0.0, 1.0) * 255.0) as u8);
                row.push((accum_c[2].clamp(0.0, 1.0) * 255.0) as u8);
                row.push((accum_a.clamp(0.0, 1.0) * 255.0) as u8);
            }
            row
        })
        .collect();

    RgbaImage::from_raw(out_w, out_h, pixels)
        .unwrap_or_else(|| RgbaImage::new(out_w, out_h))
}

/// Assemble a volume from `slices` and ray-cast it in one call.
pub fn render_volume(
    slices: Vec<ScalarSlice>,
    params: &RenderParams,
) -> Result<RgbaImage, EngineError> {
    let volume = ScalarVolume::from_slices(slices)?;
    Ok(raycast(&volume, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn uniform_stack(fill: i32, n: usize) -> Vec<ScalarSlice> {
        (0..n)
            .map(|z| {
                ScalarSlice::new(Array2::from_elem((8, 8), fill)).with_location(z as f32)
            })
            .collect()
    }

    #[test]
    fn zero_opacity_renders_fully_transparent() {
        let params = RenderParams {
            opacity: 0.0,
            output_size: (16, 16),
            transfer: TransferFunction::Bone,
            ..Default::default()
        };
        let image = render_volume(uniform_stack(2000, 8), &params).expect("valid stack");
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn dense_volume_saturates_alpha() {
        let params = RenderParams {
            window: Some(WindowLevel::new(0.0, 100.0)),
            output_size: (16, 16),
            ..Default::default()
        };
        // Every voxel is far above the window, so each sample is fully
        // opaque and the center pixel must saturate immediately.
        let image = render_volume(uniform_stack(1000, 8), &params).expect("valid stack");
        let center = image.get_pixel(8, 8);
        assert!(center.0[3] >= 252);
    }

    #[test]
    fn identity_rotation_is_identity_matrix() {
        let m = rotation_matrix((0.0, 0.0, 0.0));
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(m[i][j], expected, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn rotation_preserves_length() {
        let m = rotation_matrix((30.0, -45.0, 120.0));
        let v = mat_apply(m, [3.0, -4.0, 12.0]);
        let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert_relative_eq!(len, 13.0, epsilon = 1e-4);
    }

    #[test]
    fn transfer_presets_stay_in_unit_range() {
        for preset in [
            TransferFunction::Bone,
            TransferFunction::Skin,
            TransferFunction::Muscle,
            TransferFunction::Vessels,
            TransferFunction::Default,
        ] {
            for i in 0..=100 {
                let rgba = preset.evaluate(i as f32 / 100.0);
                assert!(rgba.iter().all(|c| (0.0..=1.0).contains(c)));
            }
        }
    }
}
