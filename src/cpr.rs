//! Curved planar reformation: unroll the volume along an arbitrary
//! centerline. Each output column is one arc-length step along the path;
//! rows sample perpendicular to the local tangent.

use crate::error::EngineError;
use crate::geom::Point3;
use crate::slice::ScalarSlice;
use crate::volume::ScalarVolume;
use crate::windowing::{WindowLevel, to_display};

use image::{GrayImage, ImageBuffer, Luma};

const UP: Point3 = Point3 {
    x: 0.0,
    y: 0.0,
    z: 1.0,
};
const UP_FALLBACK: Point3 = Point3 {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};

/// Position and tangent at arc length `s` along the polyline.
fn at_arc_length(centerline: &[Point3], s: f32) -> (Point3, Point3) {
    let mut walked = 0.0;
    for pair in centerline.windows(2) {
        let segment = pair[1].sub(pair[0]);
        let len = segment.norm();
        if walked + len >= s && len > 0.0 {
            let u = (s - walked) / len;
            let position = pair[0].add(segment.scale(u));
            let tangent = segment.scale(1.0 / len);
            return (position, tangent);
        }
        walked += len;
    }
    // Past the end: clamp to the final point and keep the last direction.
    let last = centerline[centerline.len() - 1];
    let tangent = last
        .sub(centerline[centerline.len() - 2])
        .normalized()
        .unwrap_or(UP_FALLBACK);
    (last, tangent)
}

/// In-plane perpendicular to the tangent, via cross product with a fixed
/// up-vector. Falls back to a second up-vector when the tangent is nearly
/// parallel to the first.
fn perpendicular(tangent: Point3) -> Point3 {
    tangent
        .cross(UP)
        .normalized()
        .or_else(|| tangent.cross(UP_FALLBACK).normalized())
        .unwrap_or(UP_FALLBACK)
}

/// Sample a ribbon surface following `centerline` through the volume.
///
/// Output width is the centerline's total arc length in integer pixels;
/// output height is `max(volume width, volume height) / 2`. Samples outside
/// the volume render black.
pub fn curved_reformat(
    volume: &ScalarVolume,
    centerline: &[Point3],
    window: Option<WindowLevel>,
) -> Result<GrayImage, EngineError> {
    if centerline.len() < 2 {
        return Err(EngineError::InvalidPath(centerline.len()));
    }
    let window = window.unwrap_or(volume.window);

    let total_length: f32 = centerline
        .windows(2)
        .map(|pair| pair[1].sub(pair[0]).norm())
        .sum();
    let out_w = (total_length as u32).max(1);
    let out_h = (volume.width().max(volume.height()) as u32 / 2).max(1);

    Ok(ImageBuffer::from_fn(out_w, out_h, |px, py| {
        let (position, tangent) = at_arc_length(centerline, px as f32);
        let perp = perpendicular(tangent);
        let offset = py as f32 - out_h as f32 / 2.0;
        let sample = position.add(perp.scale(offset));
        let byte = volume
            .sample(sample.x, sample.y, sample.z)
            .map_or(0, |value| to_display(value, window, false));
        Luma([byte])
    }))
}

/// Assemble a volume from `slices` and reformat along `centerline`.
pub fn render_cpr(
    slices: Vec<ScalarSlice>,
    centerline: &[Point3],
    window: Option<WindowLevel>,
) -> Result<GrayImage, EngineError> {
    let volume = ScalarVolume::from_slices(slices)?;
    curved_reformat(&volume, centerline, window)
}
