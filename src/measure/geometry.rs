//! Distance, angle and polygon measurements. Coordinates are pixel-space;
//! millimeter outputs combine the per-axis spacing at the point of
//! measurement.

use crate::error::EngineError;
use crate::geom::Point2;

/// Euclidean distance between two points, in pixels and millimeters.
#[derive(Clone, Copy, Debug)]
pub struct LengthResult {
    pub pixels: f32,
    pub mm: f32,
}

pub fn length(a: Point2, b: Point2, spacing: (f32, f32)) -> LengthResult {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    LengthResult {
        pixels: (dx * dx + dy * dy).sqrt(),
        mm: ((dx * spacing.0).powi(2) + (dy * spacing.1).powi(2)).sqrt(),
    }
}

/// Angle at a vertex between two rays.
#[derive(Clone, Copy, Debug)]
pub struct AngleResult {
    pub degrees: f32,
    pub radians: f32,
}

pub fn angle(vertex: Point2, p1: Point2, p2: Point2) -> AngleResult {
    let v1 = (p1.x - vertex.x, p1.y - vertex.y);
    let v2 = (p2.x - vertex.x, p2.y - vertex.y);
    let n1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let n2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    let radians = if n1 == 0.0 || n2 == 0.0 {
        0.0
    } else {
        let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / (n1 * n2)).clamp(-1.0, 1.0);
        cos.acos()
    };
    AngleResult {
        degrees: radians.to_degrees(),
        radians,
    }
}

/// Polygon area (shoelace) and perimeter, in pixel and physical units.
/// Reported area is always the magnitude regardless of winding.
#[derive(Clone, Copy, Debug)]
pub struct AreaResult {
    pub area_px: f32,
    pub area_mm2: f32,
    pub perimeter_px: f32,
    pub perimeter_mm: f32,
}

/// Signed shoelace area in square pixels.
pub(crate) fn shoelace(points: &[Point2]) -> f32 {
    let mut doubled = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        doubled += a.x * b.y - b.x * a.y;
    }
    doubled / 2.0
}

pub fn polygon_area(points: &[Point2], spacing: (f32, f32)) -> Result<AreaResult, EngineError> {
    if points.len() < 3 {
        return Err(EngineError::InvalidPolygon(points.len()));
    }

    let area_px = shoelace(points).abs();
    let mut perimeter_px = 0.0;
    let mut perimeter_mm = 0.0;
    for i in 0..points.len() {
        let segment = length(points[i], points[(i + 1) % points.len()], spacing);
        perimeter_px += segment.pixels;
        perimeter_mm += segment.mm;
    }

    Ok(AreaResult {
        area_px,
        area_mm2: area_px * spacing.0 * spacing.1,
        perimeter_px,
        perimeter_mm,
    })
}

/// One named pairwise distance.
#[derive(Clone, Debug)]
pub struct LandmarkPair {
    pub from: String,
    pub to: String,
    pub mm: f32,
    pub cm: f32,
}

/// All pairwise distances among named landmark points.
#[derive(Clone, Debug)]
pub struct LandmarkDistances {
    pub pairs: Vec<LandmarkPair>,
}

pub fn landmark_distances(
    landmarks: &[(String, Point2)],
    spacing: (f32, f32),
) -> Result<LandmarkDistances, EngineError> {
    if landmarks.len() < 2 {
        return Err(EngineError::EmptyInput);
    }

    let mut pairs = Vec::with_capacity(landmarks.len() * (landmarks.len() - 1) / 2);
    for i in 0..landmarks.len() {
        for j in i + 1..landmarks.len() {
            let mm = length(landmarks[i].1, landmarks[j].1, spacing).mm;
            pairs.push(LandmarkPair {
                from: landmarks[i].0.clone(),
                to: landmarks[j].0.clone(),
                mm,
                cm: mm / 10.0,
            });
        }
    }
    Ok(LandmarkDistances { pairs })
}

/// Integer pixel coordinates along the segment from `a` to `b`, endpoints
/// included (Bresenham).
pub(crate) fn bresenham(a: Point2, b: Point2) -> Vec<(i32, i32)> {
    let (mut x0, mut y0) = (a.x.round() as i32, a.y.round() as i32);
    let (x1, y1) = (b.x.round() as i32, b.y.round() as i32);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut points = Vec::new();
    loop {
        points.push((x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x0 += sx;
        }
        if doubled <= dx {
            err += dx;
            y0 += sy;
        }
    }
    points
}
