use thiserror::Error;

/// Typed failures reported by the reconstruction, rendering and measurement
/// operations. None of these are swallowed into zeroed results; callers are
/// expected to match on the kind they care about.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no input slices or points given")]
    EmptyInput,

    #[error("slice dimensions differ: expected {expected_rows}x{expected_columns}, got {rows}x{columns}")]
    DimensionMismatch {
        expected_rows: usize,
        expected_columns: usize,
        rows: usize,
        columns: usize,
    },

    #[error("projection range [{start}, {end}] is empty after clamping")]
    InvalidRange { start: usize, end: usize },

    #[error("centerline needs at least 2 points, got {0}")]
    InvalidPath(usize),

    #[error("polygon needs at least 3 points, got {0}")]
    InvalidPolygon(usize),

    #[error("sample point ({x:.1}, {y:.1}) lies outside the image extent")]
    OutOfBounds { x: f32, y: f32 },

    #[error("region of interest contains no pixels, statistics are undefined")]
    EmptyResult,
}
