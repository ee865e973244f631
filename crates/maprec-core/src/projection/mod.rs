//! Conversion of coordinates between spatial reference systems.
//!
//! Records name their SRS with a free-form identifier (a PROJ.4 definition
//! string in practice). Everything that needs to move points between frames
//! goes through the [`Projector`] trait:
//!
//! - [`Projector::project`] takes a single lon/lat point on the datum of a
//!   named SRS into that SRS; this is how GCPs flagged `is_projected: false`
//!   are resolved.
//! - [`Projector::convert`] moves a batch of points from one named SRS into
//!   another; this is how a cutline declared in a third SRS is brought into
//!   the record's working SRS.
//!
//! The default implementation is [`Proj4Projector`].

mod proj4;

pub use proj4::{Proj4Projector, WGS84_LONGLAT_SRS};

use crate::geometry::Point;
use thiserror::Error;

/// Errors raised by a [`Projector`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    /// The SRS identifier could not be parsed.
    #[error("Invalid SRS '{srs}': {reason}")]
    InvalidSrs { srs: String, reason: String },

    /// The coordinate conversion itself failed.
    #[error("Coordinate transformation failed: {0}")]
    TransformFailed(String),
}

/// Converts points between named spatial reference systems.
pub trait Projector {
    /// Project a lon/lat point into `srs`.
    ///
    /// The point is taken on the geodetic datum of `srs` itself, so this is
    /// the forward map projection alone with no datum shift.
    fn project(&self, srs: &str, point: Point) -> Result<Point, ProjectionError>;

    /// Convert `points` from SRS `from` to SRS `to`, preserving order.
    fn convert(&self, from: &str, to: &str, points: &[Point]) -> Result<Vec<Point>, ProjectionError>;
}
