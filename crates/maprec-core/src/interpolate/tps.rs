//! Thin-plate spline interpolation.
//!
//! Each output coordinate is modeled independently as
//!
//! ```text
//! f(p) = a0 + a1 * x + a2 * y + Σ w_i * U(|p - c_i|),   U(r) = r² ln r
//! ```
//!
//! The spline passes exactly through every control point and minimizes
//! bending energy between them. When the control points are related by an
//! affine map the radial weights vanish and the spline is that affine map.
//!
//! # Conditioning
//!
//! Inputs are shifted to their bounding-box center and scaled by the larger
//! side before the system is assembled. Ground coordinates in projected
//! frames are often in the millions, and the `r² ln r` kernel is badly
//! conditioned at that magnitude.

use super::{InterpolationError, Interpolator, PointTransform};
use crate::geometry::{BoundingBox, Point};
use nalgebra::DMatrix;

/// Below this the normalized control points are treated as collinear.
const COLLINEAR_EPSILON: f64 = 1e-10;

/// Fitted thin-plate spline.
#[derive(Debug, Clone)]
pub struct ThinPlateSpline {
    /// Control points in normalized input coordinates.
    centers: Vec<Point>,
    /// Radial weights, one `[wx, wy]` pair per control point.
    weights: Vec<[f64; 2]>,
    /// Affine coefficients `[a0, a1, a2]` for x and y outputs.
    affine: [[f64; 3]; 2],
    origin: Point,
    scale: f64,
}

/// Default [`Interpolator`]: fits a [`ThinPlateSpline`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TpsInterpolator;

impl Interpolator for TpsInterpolator {
    type Transform = ThinPlateSpline;

    fn fit(&self, correspondences: &[(Point, Point)]) -> Result<ThinPlateSpline, InterpolationError> {
        ThinPlateSpline::fit(correspondences)
    }
}

/// Radial basis `r² ln r`, written in terms of the squared distance.
#[inline]
fn radial_basis(r2: f64) -> f64 {
    if r2 <= 0.0 {
        0.0
    } else {
        0.5 * r2 * r2.ln()
    }
}

#[inline]
fn distance_sq(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// True when the points contain a duplicate or all lie on one line.
fn is_degenerate(points: &[Point]) -> bool {
    for (i, a) in points.iter().enumerate() {
        if points[i + 1..].iter().any(|b| distance_sq(*a, *b) < COLLINEAR_EPSILON) {
            return true;
        }
    }

    let base = points[0];
    let Some(far) = points
        .iter()
        .copied()
        .max_by(|a, b| distance_sq(base, *a).total_cmp(&distance_sq(base, *b)))
    else {
        return true;
    };
    let (ux, uy) = (far.x - base.x, far.y - base.y);
    let max_cross = points
        .iter()
        .map(|p| (ux * (p.y - base.y) - uy * (p.x - base.x)).abs())
        .fold(0.0, f64::max);
    max_cross < COLLINEAR_EPSILON
}

impl ThinPlateSpline {
    /// Fit a spline mapping each `input` onto its `output`.
    ///
    /// # Errors
    ///
    /// - [`InterpolationError::TooFewPoints`] for fewer than 3 pairs
    /// - [`InterpolationError::Singular`] when inputs repeat or are collinear
    pub fn fit(correspondences: &[(Point, Point)]) -> Result<Self, InterpolationError> {
        let n = correspondences.len();
        if n < 3 {
            return Err(InterpolationError::TooFewPoints(n));
        }

        let inputs: Vec<Point> = correspondences.iter().map(|(input, _)| *input).collect();
        let bb = BoundingBox::from_points(&inputs).ok_or(InterpolationError::TooFewPoints(0))?;
        let origin = Point::new((bb.min_x + bb.max_x) / 2.0, (bb.min_y + bb.max_y) / 2.0);
        let scale = bb.width().max(bb.height());
        if !(scale.is_finite() && scale > 0.0) {
            return Err(InterpolationError::Singular);
        }

        let centers: Vec<Point> = inputs
            .iter()
            .map(|p| Point::new((p.x - origin.x) / scale, (p.y - origin.y) / scale))
            .collect();
        if is_degenerate(&centers) {
            return Err(InterpolationError::Singular);
        }

        // | K   P | |w|   |v|
        // | P^T 0 | |a| = |0|
        let size = n + 3;
        let mut system = DMatrix::<f64>::zeros(size, size);
        let mut rhs = DMatrix::<f64>::zeros(size, 2);
        for (i, ci) in centers.iter().enumerate() {
            for (j, cj) in centers.iter().enumerate() {
                system[(i, j)] = radial_basis(distance_sq(*ci, *cj));
            }
            system[(i, n)] = 1.0;
            system[(i, n + 1)] = ci.x;
            system[(i, n + 2)] = ci.y;
            system[(n, i)] = 1.0;
            system[(n + 1, i)] = ci.x;
            system[(n + 2, i)] = ci.y;

            let output = correspondences[i].1;
            rhs[(i, 0)] = output.x;
            rhs[(i, 1)] = output.y;
        }

        let solution = system
            .lu()
            .solve(&rhs)
            .ok_or(InterpolationError::Singular)?;
        if solution.iter().any(|v| !v.is_finite()) {
            return Err(InterpolationError::Singular);
        }

        let weights = (0..n)
            .map(|i| [solution[(i, 0)], solution[(i, 1)]])
            .collect();
        let affine = [
            [solution[(n, 0)], solution[(n + 1, 0)], solution[(n + 2, 0)]],
            [solution[(n, 1)], solution[(n + 1, 1)], solution[(n + 2, 1)]],
        ];

        log::trace!("Fitted thin-plate spline on {} control points", n);

        Ok(Self {
            centers,
            weights,
            affine,
            origin,
            scale,
        })
    }

    /// Number of control points the spline was fit from.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

impl PointTransform for ThinPlateSpline {
    fn transform(&self, point: Point) -> Point {
        let p = Point::new(
            (point.x - self.origin.x) / self.scale,
            (point.y - self.origin.y) / self.scale,
        );

        let [ax, ay] = self.affine;
        let mut x = ax[0] + ax[1] * p.x + ax[2] * p.y;
        let mut y = ay[0] + ay[1] * p.x + ay[2] * p.y;
        for (c, w) in self.centers.iter().zip(&self.weights) {
            let u = radial_basis(distance_sq(p, *c));
            x += w[0] * u;
            y += w[1] * u;
        }
        Point::new(x, y)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
