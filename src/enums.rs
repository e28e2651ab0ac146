/// Cardinal reformation plane. Determines which voxel axis is fixed and
/// which two span the output image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
    Axial,
    Sagittal,
    Coronal,
}

/// Reduction applied along the projection axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionKind {
    Maximum,
    Minimum,
    Average,
}

/// Clockwise raster rotation applied at the end of the enhancement pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}
