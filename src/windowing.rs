//! Linear window/level mapping from physical sample values to display bytes.
//! Every grayscale raster producer in this crate funnels through
//! [`to_display`], so window semantics stay identical across renderers.

/// A visualization window. `width` selects the visible intensity band around
/// `center`; values outside clip to black/white.
///
/// Invariant: `width > 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowLevel {
    pub center: f32,
    pub width: f32,
}

impl WindowLevel {
    pub fn new(center: f32, width: f32) -> Self {
        debug_assert!(width > 0.0, "window width must be positive");
        Self { center, width }
    }

    /// Soft tissue CT window, used when input slices carry no window of
    /// their own.
    pub const SOFT_TISSUE: WindowLevel = WindowLevel {
        center: 40.0,
        width: 400.0,
    };

    /// Lower edge of the visible band.
    #[inline]
    pub fn min(&self) -> f32 {
        self.center - self.width / 2.0
    }

    /// Upper edge of the visible band.
    #[inline]
    pub fn max(&self) -> f32 {
        self.center + self.width / 2.0
    }

    /// Normalize a value into [0, 1] against this window.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        ((value - self.min()) / self.width).clamp(0.0, 1.0)
    }
}

/// Map a rescaled sample value to a display byte.
///
/// Values at or below `center - width/2` map to 0, at or above
/// `center + width/2` to 255, linear in between. `invert` flips the ramp
/// (MONOCHROME1-style presentation).
#[inline]
pub fn to_display(value: f32, window: WindowLevel, invert: bool) -> u8 {
    let byte = if value <= window.min() {
        0
    } else if value >= window.max() {
        255
    } else {
        (((value - window.min()) / window.width) * 255.0) as u8
    };
    if invert { 255 - byte } else { byte }
}
