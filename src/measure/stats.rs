//! Profile lines and intensity histograms over rescaled values.

use crate::error::EngineError;
use crate::geom::Point2;
use crate::measure::geometry::{bresenham, length};
use crate::measure::roi::{RoiShape, collect_values};
use crate::measure::summarize;
use crate::slice::ScalarSlice;

/// Number of uniform bins in an intensity histogram.
pub const HISTOGRAM_BINS: usize = 256;

/// Samples along a line segment plus their summary statistics.
#[derive(Clone, Debug)]
pub struct ProfileLineResult {
    /// Rescaled values in segment order, one per Bresenham pixel.
    pub values: Vec<f32>,
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
    pub length_px: f32,
    pub length_mm: f32,
}

/// Sample rescaled values along the segment from `a` to `b`.
///
/// # Errors
///
/// [`EngineError::OutOfBounds`] when either endpoint lies outside the slice.
pub fn profile_line(
    slice: &ScalarSlice,
    a: Point2,
    b: Point2,
) -> Result<ProfileLineResult, EngineError> {
    for endpoint in [a, b] {
        if !slice.contains(endpoint.x, endpoint.y) {
            return Err(EngineError::OutOfBounds {
                x: endpoint.x,
                y: endpoint.y,
            });
        }
    }

    let values: Vec<f32> = bresenham(a, b)
        .into_iter()
        .filter(|&(x, y)| {
            x >= 0 && y >= 0 && (x as usize) < slice.columns() && (y as usize) < slice.rows()
        })
        .map(|(x, y)| slice.rescaled(y as usize, x as usize))
        .collect();
    let summary = summarize(&values).ok_or(EngineError::EmptyResult)?;
    let distance = length(a, b, slice.pixel_spacing);

    Ok(ProfileLineResult {
        values,
        mean: summary.mean,
        std_dev: summary.std_dev,
        min: summary.min,
        max: summary.max,
        length_px: distance.pixels,
        length_mm: distance.mm,
    })
}

#[derive(Clone, Copy, Debug)]
pub struct Percentiles {
    pub p5: f32,
    pub p25: f32,
    pub p50: f32,
    pub p75: f32,
    pub p95: f32,
}

/// 256-bin intensity histogram with summary statistics and percentiles.
#[derive(Clone, Debug)]
pub struct HistogramResult {
    pub bins: Vec<u32>,
    /// Value range covered by the bins.
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub std_dev: f32,
    pub median: f32,
    pub count: usize,
    pub percentiles: Percentiles,
}

fn percentile(sorted: &[f32], p: f32) -> f32 {
    let rank = (p / 100.0 * (sorted.len() - 1) as f32).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

/// Histogram over the whole slice, or over an ROI when one is given.
pub fn histogram(
    slice: &ScalarSlice,
    roi: Option<&RoiShape>,
) -> Result<HistogramResult, EngineError> {
    let values = match roi {
        Some(shape) => collect_values(slice, shape)?,
        None => {
            let (rows, columns) = (slice.rows(), slice.columns());
            let mut all = Vec::with_capacity(rows * columns);
            for r in 0..rows {
                for c in 0..columns {
                    all.push(slice.rescaled(r, c));
                }
            }
            all
        }
    };
    let summary = summarize(&values).ok_or(EngineError::EmptyResult)?;

    let mut bins = vec![0u32; HISTOGRAM_BINS];
    let range = summary.max - summary.min;
    for &v in &values {
        let index = if range == 0.0 {
            0
        } else {
            (((v - summary.min) / range) * HISTOGRAM_BINS as f32) as usize
        };
        bins[index.min(HISTOGRAM_BINS - 1)] += 1;
    }

    let mut sorted = values;
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let percentiles = Percentiles {
        p5: percentile(&sorted, 5.0),
        p25: percentile(&sorted, 25.0),
        p50: percentile(&sorted, 50.0),
        p75: percentile(&sorted, 75.0),
        p95: percentile(&sorted, 95.0),
    };

    Ok(HistogramResult {
        bins,
        min: summary.min,
        max: summary.max,
        mean: summary.mean,
        std_dev: summary.std_dev,
        median: summary.median,
        count: summary.count,
        percentiles,
    })
}
