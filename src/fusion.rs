//! Multi-modality fusion: blend a pseudocolored functional overlay (PET,
//! perfusion) onto an anatomical base image. Each input is windowed with its
//! own parameters before blending.

use crate::colormap::ColorMap;
use crate::slice::ScalarSlice;
use crate::windowing::{WindowLevel, to_display};

use image::{ImageBuffer, Rgba, RgbaImage};

#[derive(Clone, Copy, Debug)]
pub struct FusionParams {
    /// Window for the anatomical base; defaults to the base slice's own.
    pub base_window: Option<WindowLevel>,
    /// Window for the functional overlay; defaults to the overlay's own.
    pub overlay_window: Option<WindowLevel>,
    pub color_map: ColorMap,
    /// Overlay opacity scale in [0, 1].
    pub opacity: f32,
    /// Optional band of overlay *rescaled* values to fuse. Pixels outside
    /// the band pass through as grayscale base only.
    pub threshold: Option<(f32, f32)>,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            base_window: None,
            overlay_window: None,
            color_map: ColorMap::Pet,
            opacity: 0.5,
            threshold: None,
        }
    }
}

fn effective_window(explicit: Option<WindowLevel>, slice: &ScalarSlice) -> WindowLevel {
    explicit.or(slice.window).unwrap_or(WindowLevel::SOFT_TISSUE)
}

/// Fuse `overlay` onto `base` at base resolution. The overlay is
/// nearest-neighbor resampled by the resolution ratio, so the two slices
/// need not match in size.
pub fn render_fusion(
    base: &ScalarSlice,
    overlay: &ScalarSlice,
    params: &FusionParams,
) -> RgbaImage {
    let base_window = effective_window(params.base_window, base);
    let overlay_window = effective_window(params.overlay_window, overlay);
    let opacity = params.opacity.clamp(0.0, 1.0);

    let scale_x = overlay.columns() as f32 / base.columns() as f32;
    let scale_y = overlay.rows() as f32 / base.rows() as f32;

    ImageBuffer::from_fn(base.columns() as u32, base.rows() as u32, |x, y| {
        let gray = to_display(
            base.rescaled(y as usize, x as usize),
            base_window,
            false,
        );

        let ox = ((x as f32 * scale_x) as usize).min(overlay.columns() - 1);
        let oy = ((y as f32 * scale_y) as usize).min(overlay.rows() - 1);
        let raw = overlay.rescaled(oy, ox);

        if let Some((min, max)) = params.threshold
            && (raw < min || raw > max)
        {
            return Rgba([gray, gray, gray, 255]);
        }

        let norm = to_display(raw, overlay_window, false) as f32 / 255.0;
        let alpha = opacity * norm;
        let color = params.color_map.evaluate(norm);

        let blend = |b: u8, c: u8| -> u8 {
            (b as f32 * (1.0 - alpha) + c as f32 * alpha).round() as u8
        };
        Rgba([
            blend(gray, color[0]),
            blend(gray, color[1]),
            blend(gray, color[2]),
            255,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn flat(rows: usize, columns: usize, fill: i32) -> ScalarSlice {
        ScalarSlice::new(Array2::from_elem((rows, columns), fill))
            .with_window(WindowLevel::new(fill as f32, 100.0))
    }

    #[test]
    fn zero_opacity_reduces_to_the_windowed_base() {
        let base = flat(8, 8, 50);
        let overlay = flat(8, 8, 4000);
        let params = FusionParams {
            opacity: 0.0,
            ..Default::default()
        };
        let fused = render_fusion(&base, &overlay, &params);
        let expected = to_display(50.0, base.window.unwrap(), false);
        for pixel in fused.pixels() {
            assert_eq!(pixel.0, [expected, expected, expected, 255]);
        }
    }

    #[test]
    fn thresholded_pixels_pass_through_as_grayscale() {
        let base = flat(4, 4, 100);
        // Overlay value 10 sits below the threshold band.
        let overlay = flat(4, 4, 10);
        let params = FusionParams {
            opacity: 1.0,
            threshold: Some((500.0, 5000.0)),
            ..Default::default()
        };
        let fused = render_fusion(&base, &overlay, &params);
        let expected = to_display(100.0, base.window.unwrap(), false);
        for pixel in fused.pixels() {
            assert_eq!(pixel.0, [expected, expected, expected, 255]);
        }
    }

    #[test]
    fn hot_overlay_at_full_opacity_replaces_the_base() {
        let base = flat(4, 4, 0);
        let overlay = flat(4, 4, 1000);
        let params = FusionParams {
            opacity: 1.0,
            color_map: ColorMap::Hot,
            // Overlay is far above this window, so it normalizes to 1.0.
            overlay_window: Some(WindowLevel::new(0.0, 100.0)),
            ..Default::default()
        };
        let fused = render_fusion(&base, &overlay, &params);
        assert_eq!(fused.get_pixel(2, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn overlay_is_resampled_to_base_resolution() {
        let base = flat(8, 8, 0);
        let overlay = flat(2, 2, 1000);
        let params = FusionParams {
            opacity: 1.0,
            color_map: ColorMap::Hot,
            overlay_window: Some(WindowLevel::new(0.0, 100.0)),
            ..Default::default()
        };
        let fused = render_fusion(&base, &overlay, &params);
        assert_eq!(fused.dimensions(), (8, 8));
        assert_eq!(fused.get_pixel(7, 7).0, [255, 255, 255, 255]);
    }
}
