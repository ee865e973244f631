//! Maprec Core - map record reader/writer
//!
//! A map record describes how a raster image maps onto ground coordinates:
//! a set of ground control points (GCPs), the spatial reference system (SRS)
//! they resolve into, and an optional clipping polygon (cutline). This crate
//! validates records, fits pixel ↔ ground transforms from the GCPs, and
//! projects and densifies the cutline into the record SRS.
//!
//! # Module Structure
//!
//! - `geometry` - Points, bounding boxes, ring closing and densification
//! - `interpolate` - Scattered-data interpolation (thin-plate spline)
//! - `projection` - SRS conversion (PROJ.4 strings via `proj4rs`)
//! - `record` - The record model, validation, read/write and fingerprints
//! - `path` - Lexical path resolution for image and mask paths

pub mod geometry;
pub mod interpolate;
pub mod path;
pub mod projection;
pub mod record;

pub use geometry::{densify, BoundingBox, Point};
pub use interpolate::{InterpolationError, Interpolator, PointTransform, ThinPlateSpline, TpsInterpolator};
pub use projection::{Proj4Projector, ProjectionError, Projector};
pub use record::{
    Cutline, CutlineSrs, FormatError, Gcp, RawGcp, Record, RecordData, RecordError, RAW_SRS,
};
