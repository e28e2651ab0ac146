//! Region-of-interest statistics on rescaled pixel values. The reported
//! area comes from the ROI's geometric extent, not the number of sampled
//! pixels, so it stays consistent with the interactive overlay drawn by the
//! viewer.

use crate::error::EngineError;
use crate::geom::Point2;
use crate::measure::geometry::shoelace;
use crate::measure::summarize;
use crate::slice::ScalarSlice;

/// Region shapes supported by the statistics measurements.
#[derive(Clone, Debug)]
pub enum RoiShape {
    Ellipse {
        center: Point2,
        radius_x: f32,
        radius_y: f32,
    },
    Rectangle {
        origin: Point2,
        width: f32,
        height: f32,
    },
    Freehand(Vec<Point2>),
}

impl RoiShape {
    /// Axis-aligned bounding box as (min_x, min_y, max_x, max_y).
    fn bounding_box(&self) -> (f32, f32, f32, f32) {
        match self {
            RoiShape::Ellipse {
                center,
                radius_x,
                radius_y,
            } => (
                center.x - radius_x,
                center.y - radius_y,
                center.x + radius_x,
                center.y + radius_y,
            ),
            RoiShape::Rectangle {
                origin,
                width,
                height,
            } => (origin.x, origin.y, origin.x + width, origin.y + height),
            RoiShape::Freehand(points) => points.iter().fold(
                (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
                |(min_x, min_y, max_x, max_y), p| {
                    (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
                },
            ),
        }
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        match self {
            RoiShape::Ellipse {
                center,
                radius_x,
                radius_y,
            } => {
                if *radius_x <= 0.0 || *radius_y <= 0.0 {
                    return false;
                }
                let nx = (x - center.x) / radius_x;
                let ny = (y - center.y) / radius_y;
                nx * nx + ny * ny <= 1.0
            }
            RoiShape::Rectangle {
                origin,
                width,
                height,
            } => {
                x >= origin.x && x <= origin.x + width && y >= origin.y && y <= origin.y + height
            }
            RoiShape::Freehand(points) => point_in_polygon(x, y, points),
        }
    }

    /// Geometric area of the region in square millimeters.
    fn area_mm2(&self, spacing: (f32, f32)) -> f32 {
        let pixel_area = match self {
            RoiShape::Ellipse {
                radius_x, radius_y, ..
            } => std::f32::consts::PI * radius_x * radius_y,
            RoiShape::Rectangle { width, height, .. } => width * height,
            RoiShape::Freehand(points) => shoelace(points).abs(),
        };
        pixel_area * spacing.0 * spacing.1
    }
}

/// Even-odd ray casting against the polygon edges.
fn point_in_polygon(x: f32, y: f32, polygon: &[Point2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > y) != (b.y > y) && x < (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Descriptive statistics over the rescaled values inside an ROI.
#[derive(Clone, Debug)]
pub struct RoiStatistics {
    pub mean: f32,
    pub std_dev: f32,
    pub variance: f32,
    pub min: f32,
    pub max: f32,
    pub median: f32,
    pub sum: f32,
    pub count: usize,
    pub area_mm2: f32,
    /// Unit of the sampled values after rescale, HU for CT.
    pub unit: &'static str,
}

/// Rescaled values of every pixel whose center falls inside the shape,
/// clipped to the slice extent.
pub(crate) fn collect_values(
    slice: &ScalarSlice,
    shape: &RoiShape,
) -> Result<Vec<f32>, EngineError> {
    if let RoiShape::Freehand(points) = shape
        && points.len() < 3
    {
        return Err(EngineError::InvalidPolygon(points.len()));
    }

    let (min_x, min_y, max_x, max_y) = shape.bounding_box();
    let x0 = min_x.floor().max(0.0) as usize;
    let y0 = min_y.floor().max(0.0) as usize;
    let x1 = (max_x.ceil().max(0.0) as usize).min(slice.columns().saturating_sub(1));
    let y1 = (max_y.ceil().max(0.0) as usize).min(slice.rows().saturating_sub(1));
    if x0 > x1 || y0 > y1 {
        return Ok(Vec::new());
    }

    let mut values = Vec::new();
    for y in y0..=y1 {
        for x in x0..=x1 {
            if shape.contains(x as f32, y as f32) {
                values.push(slice.rescaled(y, x));
            }
        }
    }
    Ok(values)
}

/// Compute ROI statistics on a slice.
///
/// # Errors
///
/// [`EngineError::InvalidPolygon`] for freehand regions with fewer than 3
/// points, [`EngineError::EmptyResult`] when the region covers no pixels.
pub fn roi_statistics(
    slice: &ScalarSlice,
    shape: &RoiShape,
) -> Result<RoiStatistics, EngineError> {
    let values = collect_values(slice, shape)?;
    let summary = summarize(&values).ok_or(EngineError::EmptyResult)?;

    Ok(RoiStatistics {
        mean: summary.mean,
        std_dev: summary.std_dev,
        variance: summary.variance,
        min: summary.min,
        max: summary.max,
        median: summary.median,
        sum: summary.sum,
        count: summary.count,
        area_mm2: shape.area_mm2(slice.pixel_spacing),
        unit: "HU",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn gradient_slice() -> ScalarSlice {
        // Value equals the column index, so row-independent statistics are
        // easy to predict.
        let data = Array2::from_shape_fn((16, 16), |(_, c)| c as i32);
        ScalarSlice::new(data).with_spacing(0.5, 0.5)
    }

    #[test]
    fn rectangle_statistics_match_the_covered_columns() {
        let slice = gradient_slice();
        let shape = RoiShape::Rectangle {
            origin: Point2::new(2.0, 3.0),
            width: 4.0,
            height: 2.0,
        };
        let stats = roi_statistics(&slice, &shape).unwrap();
        // Columns 2..=6 inclusive, three rows.
        assert_relative_eq!(stats.min, 2.0);
        assert_relative_eq!(stats.max, 6.0);
        assert_relative_eq!(stats.mean, 4.0);
        assert_eq!(stats.count, 15);
        // Geometric extent, not pixel count: 4 * 2 px² at 0.25 mm²/px².
        assert_relative_eq!(stats.area_mm2, 2.0);
        assert_eq!(stats.unit, "HU");
    }

    #[test]
    fn ellipse_membership_uses_the_quadratic_test() {
        let shape = RoiShape::Ellipse {
            center: Point2::new(8.0, 8.0),
            radius_x: 4.0,
            radius_y: 2.0,
        };
        assert!(shape.contains(8.0, 8.0));
        assert!(shape.contains(12.0, 8.0));
        assert!(!shape.contains(12.0, 9.5));
        assert!(!shape.contains(8.0, 10.5));
    }

    #[test]
    fn ellipse_area_is_pi_ab() {
        let slice = gradient_slice();
        let shape = RoiShape::Ellipse {
            center: Point2::new(8.0, 8.0),
            radius_x: 4.0,
            radius_y: 2.0,
        };
        let stats = roi_statistics(&slice, &shape).unwrap();
        assert_relative_eq!(
            stats.area_mm2,
            std::f32::consts::PI * 4.0 * 2.0 * 0.25,
            epsilon = 1e-4
        );
    }

    #[test]
    fn freehand_region_samples_inside_the_polygon() {
        let slice = gradient_slice();
        let triangle = RoiShape::Freehand(vec![
            Point2::new(1.0, 1.0),
            Point2::new(9.0, 1.0),
            Point2::new(1.0, 9.0),
        ]);
        let stats = roi_statistics(&slice, &triangle).unwrap();
        assert!(stats.count > 0);
        assert!(stats.max <= 9.0);
    }

    #[test]
    fn degenerate_freehand_is_invalid() {
        let slice = gradient_slice();
        let line = RoiShape::Freehand(vec![Point2::new(0.0, 0.0), Point2::new(5.0, 5.0)]);
        assert!(matches!(
            roi_statistics(&slice, &line),
            Err(EngineError::InvalidPolygon(2))
        ));
    }

    #[test]
    fn empty_region_reports_empty_result_not_zeros() {
        let slice = gradient_slice();
        let off_image = RoiShape::Rectangle {
            origin: Point2::new(100.0, 100.0),
            width: 5.0,
            height: 5.0,
        };
        assert!(matches!(
            roi_statistics(&slice, &off_image),
            Err(EngineError::EmptyResult)
        ));
    }
}
