//! Pseudocolor lookup tables. Each map is a pure function over the
//! window-normalized intensity, keyed by an enum so the set of presets is
//! closed and immutable.

use crate::slice::ScalarSlice;
use crate::windowing::{WindowLevel, to_display};

use image::{ImageBuffer, Rgb, RgbImage};

/// Named pseudocolor presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMap {
    Hot,
    Cool,
    Rainbow,
    Bone,
    Cardiac,
    Pet,
}

#[inline]
fn channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

impl ColorMap {
    /// Map a normalized intensity in [0, 1] to RGB.
    pub fn evaluate(&self, t: f32) -> [u8; 3] {
        let t = t.clamp(0.0, 1.0);
        match self {
            // Black -> red -> yellow -> white.
            ColorMap::Hot => [
                channel(3.0 * t),
                channel(3.0 * t - 1.0),
                channel(3.0 * t - 2.0),
            ],
            // Cyan -> magenta.
            ColorMap::Cool => [channel(t), channel(1.0 - t), 255],
            // Blue -> cyan -> green -> yellow -> red.
            ColorMap::Rainbow => {
                let (r, g, b) = if t < 0.25 {
                    (0.0, t / 0.25, 1.0)
                } else if t < 0.5 {
                    (0.0, 1.0, 1.0 - (t - 0.25) / 0.25)
                } else if t < 0.75 {
                    ((t - 0.5) / 0.25, 1.0, 0.0)
                } else {
                    (1.0, 1.0 - (t - 0.75) / 0.25, 0.0)
                };
                [channel(r), channel(g), channel(b)]
            }
            // Grayscale with a cold cast in the midtones.
            ColorMap::Bone => [
                channel(t * 0.89),
                channel(t * 0.89 + (t * (1.0 - t)) * 0.22),
                channel(t * 0.89 + (1.0 - t) * t * 0.45),
            ],
            // Dark blue -> red -> yellow, tuned for perfusion overlays.
            ColorMap::Cardiac => {
                let (r, g, b) = if t < 0.5 {
                    (t / 0.5, 0.0, 1.0 - t / 0.5)
                } else {
                    (1.0, (t - 0.5) / 0.5, 0.0)
                };
                [channel(r), channel(g), channel(b)]
            }
            // Black -> blue -> magenta -> red -> yellow -> white.
            ColorMap::Pet => {
                let (r, g, b) = if t < 0.2 {
                    (0.0, 0.0, t / 0.2)
                } else if t < 0.4 {
                    ((t - 0.2) / 0.2, 0.0, 1.0)
                } else if t < 0.6 {
                    (1.0, 0.0, 1.0 - (t - 0.4) / 0.2)
                } else if t < 0.8 {
                    (1.0, (t - 0.6) / 0.2, 0.0)
                } else {
                    (1.0, 1.0, (t - 0.8) / 0.2)
                };
                [channel(r), channel(g), channel(b)]
            }
        }
    }
}

/// Render a slice through a pseudocolor lookup table: window each rescaled
/// value to [0, 1], then apply the map.
pub fn apply_lut(slice: &ScalarSlice, map: ColorMap, window: Option<WindowLevel>) -> RgbImage {
    let window = window
        .or(slice.window)
        .unwrap_or(WindowLevel::SOFT_TISSUE);

    ImageBuffer::from_fn(slice.columns() as u32, slice.rows() as u32, |x, y| {
        let value = slice.rescaled(y as usize, x as usize);
        let t = to_display(value, window, false) as f32 / 255.0;
        Rgb(map.evaluate(t))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    const ALL: [ColorMap; 6] = [
        ColorMap::Hot,
        ColorMap::Cool,
        ColorMap::Rainbow,
        ColorMap::Bone,
        ColorMap::Cardiac,
        ColorMap::Pet,
    ];

    #[test]
    fn hot_endpoints_are_black_and_white() {
        assert_eq!(ColorMap::Hot.evaluate(0.0), [0, 0, 0]);
        assert_eq!(ColorMap::Hot.evaluate(1.0), [255, 255, 255]);
    }

    #[test]
    fn rainbow_runs_blue_to_red() {
        assert_eq!(ColorMap::Rainbow.evaluate(0.0), [0, 0, 255]);
        assert_eq!(ColorMap::Rainbow.evaluate(1.0), [255, 0, 0]);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        for map in ALL {
            assert_eq!(map.evaluate(-3.0), map.evaluate(0.0));
            assert_eq!(map.evaluate(7.0), map.evaluate(1.0));
        }
    }

    #[test]
    fn lut_raster_has_slice_dimensions() {
        let slice = ScalarSlice::new(Array2::from_elem((6, 9), 40))
            .with_window(WindowLevel::new(40.0, 400.0));
        let image = apply_lut(&slice, ColorMap::Pet, None);
        assert_eq!(image.dimensions(), (9, 6));
        // Mid-window value maps to the middle of the LUT, not black.
        assert_ne!(image.get_pixel(0, 0).0, [0, 0, 0]);
    }
}
