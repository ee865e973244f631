//! Scattered-data interpolation between two planar frames.
//!
//! A record fits two transforms from its control points: pixel → ground and
//! ground → pixel. Both go through the [`Interpolator`] seam so the fitting
//! algorithm can be swapped (tests use exact affine doubles); the default is
//! a thin-plate spline.
//!
//! ## Contract
//!
//! - A transform is fit once from the full correspondence list and never
//!   refit.
//! - Evaluation is deterministic and infallible.
//! - Degenerate input (fewer than 3 points, duplicates, all points on one
//!   line) is reported by the interpolator as an [`InterpolationError`].

mod tps;

pub use tps::{ThinPlateSpline, TpsInterpolator};

use crate::geometry::Point;
use thiserror::Error;

/// Errors raised while fitting a transform.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpolationError {
    /// Not enough correspondences to fit the affine part.
    #[error("Too few control points: expected at least 3, got {0}")]
    TooFewPoints(usize),

    /// Control points are duplicated or collinear.
    #[error("Control points do not determine a unique transform")]
    Singular,
}

/// A fitted 2D → 2D transform.
pub trait PointTransform {
    /// Map a point from the input frame to the output frame.
    fn transform(&self, point: Point) -> Point;

    /// Map every point of a slice, preserving order.
    fn transform_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.transform(p)).collect()
    }
}

impl<F> PointTransform for F
where
    F: Fn(Point) -> Point,
{
    fn transform(&self, point: Point) -> Point {
        self(point)
    }
}

/// Builds a transform from `(input, output)` correspondences.
pub trait Interpolator {
    type Transform: PointTransform;

    fn fit(&self, correspondences: &[(Point, Point)]) -> Result<Self::Transform, InterpolationError>;
}
