//! Per-slice pixel buffers with their calibration metadata, plus the spatial
//! sort that turns an unordered set of slices into a stack ready for volume
//! assembly.

use crate::error::EngineError;
use crate::windowing::WindowLevel;

use ndarray::Array2;

/// One cross-sectional image as delivered by the catalog layer: raw samples
/// exactly as stored, with rescale and spacing calibration alongside.
/// Immutable once constructed; rescaled values are derived on access.
#[derive(Clone, Debug)]
pub struct ScalarSlice {
    data: Array2<i32>,
    pub rescale_slope: f32,
    pub rescale_intercept: f32,
    pub slice_location: f32,
    /// (x, y) spacing in mm per pixel.
    pub pixel_spacing: (f32, f32),
    pub slice_thickness: f32,
    /// Window carried by the source instance, if any.
    pub window: Option<WindowLevel>,
}

impl ScalarSlice {
    pub fn new(data: Array2<i32>) -> Self {
        Self {
            data,
            rescale_slope: 1.0,
            rescale_intercept: 0.0,
            slice_location: 0.0,
            pixel_spacing: (1.0, 1.0),
            slice_thickness: 1.0,
            window: None,
        }
    }

    pub fn with_rescale(mut self, slope: f32, intercept: f32) -> Self {
        self.rescale_slope = slope;
        self.rescale_intercept = intercept;
        self
    }

    pub fn with_location(mut self, location: f32) -> Self {
        self.slice_location = location;
        self
    }

    pub fn with_spacing(mut self, x: f32, y: f32) -> Self {
        self.pixel_spacing = (x, y);
        self
    }

    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.slice_thickness = thickness;
        self
    }

    pub fn with_window(mut self, window: WindowLevel) -> Self {
        self.window = Some(window);
        self
    }

    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    pub fn columns(&self) -> usize {
        self.data.dim().1
    }

    pub fn data(&self) -> &Array2<i32> {
        &self.data
    }

    /// Raw stored sample at (row, column).
    #[inline]
    pub fn raw(&self, row: usize, column: usize) -> i32 {
        self.data[[row, column]]
    }

    /// Physically calibrated value at (row, column),
    /// `raw * slope + intercept` (Hounsfield Units for CT).
    #[inline]
    pub fn rescaled(&self, row: usize, column: usize) -> f32 {
        self.data[[row, column]] as f32 * self.rescale_slope + self.rescale_intercept
    }

    /// True when (x, y) pixel coordinates land inside the slice extent.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && (x as usize) < self.columns() && (y as usize) < self.rows()
    }
}

/// Order slices ascending by `slice_location`. The sort is stable: slices
/// reporting the same location keep their input order, which is the only
/// tie-break the catalog contract guarantees.
pub fn sort_slices(mut slices: Vec<ScalarSlice>) -> Result<Vec<ScalarSlice>, EngineError> {
    if slices.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    slices.sort_by(|a, b| {
        a.slice_location
            .partial_cmp(&b.slice_location)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn slice_at(location: f32, fill: i32) -> ScalarSlice {
        ScalarSlice::new(Array2::from_elem((2, 2), fill)).with_location(location)
    }

    #[test]
    fn sorts_ascending_by_location() {
        let sorted = sort_slices(vec![slice_at(7.5, 2), slice_at(-3.0, 0), slice_at(1.0, 1)])
            .expect("non-empty input");
        let locations: Vec<f32> = sorted.iter().map(|s| s.slice_location).collect();
        assert_eq!(locations, vec![-3.0, 1.0, 7.5]);
    }

    #[test]
    fn equal_locations_keep_input_order() {
        let sorted = sort_slices(vec![slice_at(5.0, 10), slice_at(5.0, 20), slice_at(5.0, 30)])
            .expect("non-empty input");
        let fills: Vec<i32> = sorted.iter().map(|s| s.raw(0, 0)).collect();
        assert_eq!(fills, vec![10, 20, 30]);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(sort_slices(vec![]), Err(EngineError::EmptyInput)));
    }

    #[test]
    fn rescale_applies_slope_and_intercept() {
        let slice = ScalarSlice::new(arr2(&[[100, 200], [300, 400]])).with_rescale(2.0, -1024.0);
        assert_eq!(slice.rescaled(0, 0), -824.0);
        assert_eq!(slice.rescaled(1, 1), -224.0);
    }
}
