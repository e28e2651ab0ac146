//! Clinically interpreted measurements: Hounsfield banding, contour-based
//! volumetry, cardiac function and the simplified bone density estimate.

use crate::error::EngineError;
use crate::geom::Point2;
use crate::measure::geometry::shoelace;
use crate::measure::roi::{RoiShape, RoiStatistics, roi_statistics};
use crate::slice::ScalarSlice;

use std::fmt;

/// Banded interpretation of a mean Hounsfield value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TissueKind {
    Air,
    LungOrFat,
    WaterOrFluid,
    SoftTissue,
    BloodOrMuscle,
    Calcification,
    Bone,
}

impl fmt::Display for TissueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TissueKind::Air => "Air",
            TissueKind::LungOrFat => "Lung/Fat",
            TissueKind::WaterOrFluid => "Water/Fluid",
            TissueKind::SoftTissue => "Soft Tissue",
            TissueKind::BloodOrMuscle => "Blood/Muscle",
            TissueKind::Calcification => "Calcification",
            TissueKind::Bone => "Bone",
        };
        f.write_str(label)
    }
}

/// Map a mean HU value into its tissue band.
pub fn interpret_hu(mean_hu: f32) -> TissueKind {
    if mean_hu < -950.0 {
        TissueKind::Air
    } else if mean_hu < -50.0 {
        TissueKind::LungOrFat
    } else if mean_hu < 20.0 {
        TissueKind::WaterOrFluid
    } else if mean_hu < 70.0 {
        TissueKind::SoftTissue
    } else if mean_hu < 200.0 {
        TissueKind::BloodOrMuscle
    } else if mean_hu < 400.0 {
        TissueKind::Calcification
    } else {
        TissueKind::Bone
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HounsfieldResult {
    pub mean_hu: f32,
    pub sample_count: usize,
    pub tissue: TissueKind,
}

/// Hounsfield measurement at a point, or averaged over a small circular
/// region when `radius > 0`.
///
/// # Errors
///
/// [`EngineError::OutOfBounds`] when the point lies outside the slice,
/// [`EngineError::EmptyResult`] when the region covers no pixels.
pub fn hounsfield(
    slice: &ScalarSlice,
    point: Point2,
    radius: f32,
) -> Result<HounsfieldResult, EngineError> {
    if !slice.contains(point.x, point.y) {
        return Err(EngineError::OutOfBounds {
            x: point.x,
            y: point.y,
        });
    }

    let (mean_hu, sample_count) = if radius > 0.0 {
        let shape = RoiShape::Ellipse {
            center: point,
            radius_x: radius,
            radius_y: radius,
        };
        let stats = roi_statistics(slice, &shape)?;
        (stats.mean, stats.count)
    } else {
        (slice.rescaled(point.y as usize, point.x as usize), 1)
    };

    Ok(HounsfieldResult {
        mean_hu,
        sample_count,
        tissue: interpret_hu(mean_hu),
    })
}

/// One contour drawn on one slice, with the calibration it was drawn
/// against.
#[derive(Clone, Debug)]
pub struct SliceContour {
    pub points: Vec<Point2>,
    /// (x, y) spacing in mm/pixel of the originating slice.
    pub pixel_spacing: (f32, f32),
    pub slice_thickness: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct VolumeResult {
    pub volume_mm3: f32,
    pub volume_ml: f32,
    pub slice_count: usize,
}

/// Volume from per-slice contours: shoelace area times slice thickness,
/// summed over the stack. 1 mL = 1000 mm³.
pub fn volume_from_contours(contours: &[SliceContour]) -> Result<VolumeResult, EngineError> {
    if contours.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let mut volume_mm3 = 0.0;
    for contour in contours {
        if contour.points.len() < 3 {
            return Err(EngineError::InvalidPolygon(contour.points.len()));
        }
        let area_mm2 =
            shoelace(&contour.points).abs() * contour.pixel_spacing.0 * contour.pixel_spacing.1;
        volume_mm3 += area_mm2 * contour.slice_thickness;
    }

    Ok(VolumeResult {
        volume_mm3,
        volume_ml: volume_mm3 / 1000.0,
        slice_count: contours.len(),
    })
}

#[derive(Clone, Copy, Debug)]
pub struct CardiacResult {
    pub edv_ml: f32,
    pub esv_ml: f32,
    pub stroke_volume_ml: f32,
    pub ejection_fraction_pct: f32,
}

/// Cardiac function from end-diastolic and end-systolic contour sets.
pub fn cardiac(
    edv_contours: &[SliceContour],
    esv_contours: &[SliceContour],
) -> Result<CardiacResult, EngineError> {
    let edv = volume_from_contours(edv_contours)?.volume_ml;
    let esv = volume_from_contours(esv_contours)?.volume_ml;
    let stroke = edv - esv;
    let ejection_fraction = if edv > 0.0 { stroke / edv * 100.0 } else { 0.0 };

    Ok(CardiacResult {
        edv_ml: edv,
        esv_ml: esv,
        stroke_volume_ml: stroke,
        ejection_fraction_pct: ejection_fraction,
    })
}

/// Three-bucket bone classification by mean HU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoneCategory {
    Normal,
    Osteopenia,
    Osteoporosis,
}

impl fmt::Display for BoneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoneCategory::Normal => "Normal",
            BoneCategory::Osteopenia => "Osteopenia",
            BoneCategory::Osteoporosis => "Osteoporosis",
        })
    }
}

/// Slope/intercept of the linear HU to BMD mapping. This is a placeholder
/// calibration, NOT a phantom-calibrated QCT conversion; results are for
/// orientation only and must not be used diagnostically.
const BMD_SLOPE: f32 = 0.8;
const BMD_INTERCEPT: f32 = 5.0;

#[derive(Clone, Debug)]
pub struct BoneDensityResult {
    pub statistics: RoiStatistics,
    /// Estimated bone mineral density in mg/cm³ (placeholder mapping).
    pub bmd_mg_cm3: f32,
    pub category: BoneCategory,
}

/// Bone density estimate over a freehand region.
pub fn bone_density(
    slice: &ScalarSlice,
    region: &[Point2],
) -> Result<BoneDensityResult, EngineError> {
    let statistics = roi_statistics(slice, &RoiShape::Freehand(region.to_vec()))?;

    let category = if statistics.mean > 100.0 {
        BoneCategory::Normal
    } else if statistics.mean > -100.0 {
        BoneCategory::Osteopenia
    } else {
        BoneCategory::Osteoporosis
    };

    Ok(BoneDensityResult {
        bmd_mg_cm3: statistics.mean * BMD_SLOPE + BMD_INTERCEPT,
        category,
        statistics,
    })
}
