//! Quantitative measurements over calibrated slice and volume data. All
//! physical conversions go through the originating slice's pixel spacing at
//! the point of measurement; display windowing is never applied here.

pub mod clinical;
pub mod geometry;
pub mod roi;
pub mod stats;

pub use clinical::{
    BoneCategory, BoneDensityResult, CardiacResult, HounsfieldResult, SliceContour, TissueKind,
    VolumeResult, bone_density, cardiac, hounsfield, interpret_hu, volume_from_contours,
};
pub use geometry::{
    AngleResult, AreaResult, LandmarkDistances, LandmarkPair, LengthResult, angle,
    landmark_distances, length, polygon_area,
};
pub use roi::{RoiShape, RoiStatistics, roi_statistics};
pub use stats::{HistogramResult, Percentiles, ProfileLineResult, histogram, profile_line};

/// Descriptive statistics shared by the ROI, profile and histogram
/// measurements. Accumulation runs in f64 to keep large regions exact.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Summary {
    pub mean: f32,
    pub std_dev: f32,
    pub variance: f32,
    pub min: f32,
    pub max: f32,
    pub median: f32,
    pub sum: f32,
    pub count: usize,
}

pub(crate) fn summarize(values: &[f32]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut sum = 0.0f64;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v as f64;
    }
    let mean = sum / count as f64;

    let variance = values
        .iter()
        .map(|&v| {
            let diff = v as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = count / 2;
    let median = if count.is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    Some(Summary {
        mean: mean as f32,
        std_dev: variance.sqrt() as f32,
        variance: variance as f32,
        min,
        max,
        median,
        sum: sum as f32,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn summary_of_known_values() {
        let s = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(s.mean, 5.0);
        assert_relative_eq!(s.std_dev, 2.0);
        assert_relative_eq!(s.variance, 4.0);
        assert_relative_eq!(s.median, 4.5);
        assert_eq!(s.count, 8);
        assert_relative_eq!(s.min, 2.0);
        assert_relative_eq!(s.max, 9.0);
        assert_relative_eq!(s.sum, 40.0);
    }

    #[test]
    fn empty_input_yields_no_summary() {
        assert!(summarize(&[]).is_none());
    }
}
