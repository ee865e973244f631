//! Segment densification.
//!
//! Inserts colinear points along each segment of a polyline so that no
//! sub-segment is longer than a threshold. The shape is unchanged; only the
//! sampling gets finer, which keeps straight edges close to straight after a
//! nonlinear transform is applied point by point.
//!
//! # Threshold
//!
//! The default threshold is derived once from the whole point set:
//!
//! ```text
//! threshold = min(bbox_width, bbox_height) / DENSIFY_DIVISOR
//! ```
//!
//! so the sampling density follows the overall extent of the shape rather
//! than the length of any single edge.

use super::{BoundingBox, Point};

/// Divisor applied to the smaller bounding-box side to get the threshold.
pub const DENSIFY_DIVISOR: f64 = 20.0;

/// Compute the densification threshold for a point set.
///
/// Returns 0.0 for an empty set or when the bounding box is flat in either
/// direction.
pub fn densify_threshold(points: &[Point]) -> f64 {
    match BoundingBox::from_points(points) {
        Some(bb) => bb.width().min(bb.height()) / DENSIFY_DIVISOR,
        None => 0.0,
    }
}

/// Densify a polyline using the extent-derived threshold.
///
/// # Example
///
/// ```ignore
/// use maprec_core::geometry::{densify, Point};
///
/// let square = vec![
///     Point::new(0.0, 0.0),
///     Point::new(0.0, 10.0),
///     Point::new(10.0, 10.0),
///     Point::new(10.0, 0.0),
///     Point::new(0.0, 0.0),
/// ];
/// // threshold = 10 / 20 = 0.5, each edge gains 19 interior points
/// assert_eq!(densify(&square).len(), 4 * 20 + 1);
/// ```
pub fn densify(points: &[Point]) -> Vec<Point> {
    densify_with_threshold(points, densify_threshold(points))
}

/// Densify a polyline so that no sub-segment exceeds `threshold`.
///
/// For each segment `(p0, p1)` the start point is emitted, followed by points
/// at `p0 + k * threshold` along the segment direction for every `k >= 1`
/// with `k * threshold` strictly less than the segment length. The last input
/// point is emitted once at the end.
///
/// A threshold that is zero, negative or not finite leaves the input as is:
/// every segment is treated as already dense.
pub fn densify_with_threshold(points: &[Point], threshold: f64) -> Vec<Point> {
    let Some(&last) = points.last() else {
        return Vec::new();
    };
    if !(threshold.is_finite() && threshold > 0.0) {
        return points.to_vec();
    }

    let mut result = Vec::with_capacity(points.len());
    for pair in points.windows(2) {
        let (p0, p1) = (pair[0], pair[1]);
        result.push(p0);

        let length = p0.distance(&p1);
        if length <= threshold {
            continue;
        }
        let ux = (p1.x - p0.x) / length;
        let uy = (p1.y - p0.y) / length;

        // Multiples of the threshold rather than a running sum, so the
        // inserted points don't drift on long segments.
        let mut k = 1.0;
        while k * threshold < length {
            let t = k * threshold;
            result.push(Point::new(p0.x + ux * t, p0.y + uy * t));
            k += 1.0;
        }
    }
    result.push(last);
    result
}


// ============================================================================
// Property-Based Tests
// ============================================================================
