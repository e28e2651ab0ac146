//! # volumetrics
//!
//! Volumetric reconstruction, rendering and quantitative measurement core
//! for radiology viewers.
//!
//! The crate turns an ordered stack of 2-D cross-sectional images into a
//! dense 3-D scalar volume and derives clinically meaningful views and
//! numbers from it. Inputs are decoded per-slice pixel buffers
//! ([`ScalarSlice`]) carrying their own spacing, rescale and window
//! metadata; file formats, catalogs and transport are the caller's concern.
//! Outputs are `image` rasters (the caller encodes them) and immutable
//! measurement records with physical units.
//!
//! Rendering families:
//!  - planar reformation (MPR) along the Axial, Sagittal and Coronal axes
//!  - intensity projections (MIP / MinIP / average) over a sub-range
//!  - direct volume rendering with transfer functions and alpha compositing
//!  - curved planar reformation along an arbitrary centerline
//!  - multi-modality fusion with pseudocolor lookup tables
//!  - a single-slice enhancement pipeline
//!
//! The volume built for a render request is read-only for the lifetime of
//! that request and dropped afterwards; the ray caster parallelizes across
//! output rows on the rayon pool.
//!
//! # Examples
//!
//! Reformat a stack of slices sagittally at its midline:
//!
//! ```no_run
//! # use volumetrics::{Plane, ScalarSlice, ScalarVolume, reformat};
//! # let slices: Vec<ScalarSlice> = Vec::new();
//! let volume = ScalarVolume::from_slices(slices)?;
//! let image = reformat(&volume, Plane::Sagittal, volume.width() / 2, None);
//! image.save("sagittal.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod colormap;
pub mod cpr;
pub mod enhance;
pub mod enums;
pub mod error;
pub mod fusion;
pub mod geom;
pub mod measure;
pub mod mpr;
pub mod projection;
pub mod raycast;
pub mod slice;
pub mod volume;
pub mod windowing;

pub use colormap::{ColorMap, apply_lut};
pub use cpr::{curved_reformat, render_cpr};
pub use enhance::{EnhancementParams, enhance};
pub use enums::{Plane, ProjectionKind, Rotation};
pub use error::EngineError;
pub use fusion::{FusionParams, render_fusion};
pub use geom::{Point2, Point3};
pub use mpr::{reformat, render_reformat};
pub use projection::{ProjectionRange, project, render_projection};
pub use raycast::{RenderParams, TransferFunction, raycast, render_volume};
pub use slice::{ScalarSlice, sort_slices};
pub use volume::ScalarVolume;
pub use windowing::{WindowLevel, to_display};
