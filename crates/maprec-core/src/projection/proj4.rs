//! PROJ.4-string projector backed by `proj4rs` (pure Rust).
//!
//! `proj4rs` works in radians for geographic frames. This wrapper takes and
//! returns degrees for any SRS whose definition is `+proj=longlat` (or one of
//! its aliases), and passes projected coordinates through untouched.
//!
//! Single points given to [`Projector::project`] are lon/lat on the target
//! SRS's own datum, so only the map projection runs and no datum shift is
//! applied. [`Proj4Projector::with_geographic`] pins the source frame instead.

use super::{ProjectionError, Projector};
use crate::geometry::Point;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

/// Lon/lat on WGS84.
pub const WGS84_LONGLAT_SRS: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Parameters that define the geodetic datum of a PROJ.4 string. The prime
/// meridian is left out: input longitudes are always from Greenwich.
const DATUM_PARAMS: [&str; 9] = ["datum", "ellps", "a", "b", "rf", "f", "R", "towgs84", "nadgrids"];

/// [`super::Projector`] for PROJ.4 definition strings.
#[derive(Debug, Clone, Default)]
pub struct Proj4Projector {
    geographic: Option<String>,
}

impl Proj4Projector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `srs` as the lon/lat frame for [`Projector::project`], whatever
    /// the target datum. Points are datum-shifted when the two differ.
    pub fn with_geographic(srs: impl Into<String>) -> Self {
        Self {
            geographic: Some(srs.into()),
        }
    }

    /// The pinned lon/lat frame, if any.
    pub fn geographic(&self) -> Option<&str> {
        self.geographic.as_deref()
    }
}

/// The `+proj=longlat` frame sharing the datum of `srs`.
fn geographic_frame_of(srs: &str) -> String {
    let mut def = String::from("+proj=longlat");
    for token in srs.split_whitespace() {
        let param = token.trim_start_matches('+');
        let key = param.split('=').next().unwrap_or_default();
        if DATUM_PARAMS.contains(&key) {
            def.push_str(" +");
            def.push_str(param);
        }
    }
    def.push_str(" +no_defs");
    def
}

/// A parsed SRS plus whether it takes degrees.
struct Frame {
    proj: Proj,
    is_geographic: bool,
}

impl Frame {
    fn parse(srs: &str) -> Result<Self, ProjectionError> {
        let proj = Proj::from_proj_string(srs).map_err(|e| ProjectionError::InvalidSrs {
            srs: srs.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(Self {
            proj,
            is_geographic: is_geographic(srs),
        })
    }
}

/// True for `+proj=longlat` definitions and their aliases.
fn is_geographic(srs: &str) -> bool {
    srs.split_whitespace().any(|token| {
        matches!(
            token.trim_start_matches('+'),
            "proj=longlat" | "proj=latlong" | "proj=lonlat" | "proj=latlon"
        )
    })
}

fn convert_point(src: &Frame, dst: &Frame, point: Point) -> Result<Point, ProjectionError> {
    let mut xyz = if src.is_geographic {
        (point.x.to_radians(), point.y.to_radians(), 0.0)
    } else {
        (point.x, point.y, 0.0)
    };

    transform(&src.proj, &dst.proj, &mut xyz)
        .map_err(|e| ProjectionError::TransformFailed(format!("{e:?}")))?;

    let out = if dst.is_geographic {
        Point::new(xyz.0.to_degrees(), xyz.1.to_degrees())
    } else {
        Point::new(xyz.0, xyz.1)
    };
    if !(out.x.is_finite() && out.y.is_finite()) {
        return Err(ProjectionError::TransformFailed(format!(
            "non-finite result for ({}, {})",
            point.x, point.y
        )));
    }
    Ok(out)
}

impl Projector for Proj4Projector {
    fn project(&self, srs: &str, point: Point) -> Result<Point, ProjectionError> {
        let source = match &self.geographic {
            Some(geographic) => geographic.clone(),
            None => geographic_frame_of(srs),
        };
        if source == srs {
            return Ok(point);
        }
        let src = Frame::parse(&source)?;
        let dst = Frame::parse(srs)?;
        convert_point(&src, &dst, point)
    }

    fn convert(&self, from: &str, to: &str, points: &[Point]) -> Result<Vec<Point>, ProjectionError> {
        if from == to {
            return Ok(points.to_vec());
        }
        let src = Frame::parse(from)?;
        let dst = Frame::parse(to)?;
        points.iter().map(|&p| convert_point(&src, &dst, p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MERCATOR: &str = "+proj=merc +datum=WGS84 +units=m +no_defs";
    const UTM_37N: &str = "+proj=utm +zone=37 +datum=WGS84 +units=m +no_defs";
    const SK42_TM39: &str = "+proj=tmerc +lat_0=0 +lon_0=39 +k=1 +x_0=0 +y_0=0 +ellps=krass \
        +towgs84=23.92,-141.27,-80.9,0,0.35,0.82,-0.12 +units=m +no_defs";

    #[test]
    fn test_is_geographic() {
        assert!(is_geographic(WGS84_LONGLAT_SRS));
        assert!(is_geographic("+proj=latlong +ellps=krass"));
        assert!(!is_geographic(MERCATOR));
    }

    #[test]
    fn test_project_lonlat_to_mercator() {
        let p = Proj4Projector::new()
            .project(MERCATOR, Point::new(10.0, 0.0))
            .unwrap();
        // x = a * lon_rad on the equator
        assert!((p.x - 1_113_194.9079).abs() < 0.01, "x = {}", p.x);
        assert!(p.y.abs() < 0.01, "y = {}", p.y);
    }

    #[test]
    fn test_project_central_meridian_utm() {
        let p = Proj4Projector::new()
            .project(UTM_37N, Point::new(39.0, 0.0))
            .unwrap();
        assert!((p.x - 500_000.0).abs() < 0.01, "x = {}", p.x);
        assert!(p.y.abs() < 0.01, "y = {}", p.y);
    }

    #[test]
    fn test_convert_roundtrip() {
        let projector = Proj4Projector::new();
        let lonlat = vec![Point::new(37.5, 55.7), Point::new(38.0, 56.0)];
        let merc = projector
            .convert(WGS84_LONGLAT_SRS, MERCATOR, &lonlat)
            .unwrap();
        let back = projector
            .convert(MERCATOR, WGS84_LONGLAT_SRS, &merc)
            .unwrap();
        for (a, b) in lonlat.iter().zip(&back) {
            assert!((a.x - b.x).abs() < 1e-7);
            assert!((a.y - b.y).abs() < 1e-7);
        }
    }

    #[test]
    fn test_convert_same_srs_is_identity() {
        let pts = vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        let out = Proj4Projector::new().convert(MERCATOR, MERCATOR, &pts).unwrap();
        assert_eq!(out, pts);
    }

    #[test]
    fn test_invalid_srs() {
        let err = Proj4Projector::new()
            .project("+proj=doesnotexist", Point::new(0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidSrs { .. }));
    }

    #[test]
    fn test_custom_geographic_frame() {
        let projector = Proj4Projector::with_geographic("+proj=longlat +ellps=WGS84 +no_defs");
        assert_eq!(projector.geographic(), Some("+proj=longlat +ellps=WGS84 +no_defs"));
        let p = projector.project(UTM_37N, Point::new(39.0, 0.0)).unwrap();
        assert!((p.x - 500_000.0).abs() < 0.01);
    }

    #[test]
    fn test_geographic_frame_of() {
        assert_eq!(
            geographic_frame_of(SK42_TM39),
            "+proj=longlat +ellps=krass +towgs84=23.92,-141.27,-80.9,0,0.35,0.82,-0.12 +no_defs"
        );
        assert_eq!(geographic_frame_of(UTM_37N), "+proj=longlat +datum=WGS84 +no_defs");
        assert_eq!(geographic_frame_of("+proj=merc"), "+proj=longlat +no_defs");
    }

    #[test]
    fn test_project_keeps_target_datum() {
        // Central meridian on the equator of a Krassovsky/towgs84 frame
        let p = Proj4Projector::new().project(SK42_TM39, Point::new(39.0, 0.0)).unwrap();
        assert!(p.x.abs() < 1e-3, "x = {}", p.x);
        assert!(p.y.abs() < 1e-3, "y = {}", p.y);
    }

    #[test]
    fn test_pinned_geographic_frame_shifts_datum() {
        let p = Proj4Projector::with_geographic(WGS84_LONGLAT_SRS)
            .project(SK42_TM39, Point::new(39.0, 0.0))
            .unwrap();
        assert!(p.x.hypot(p.y) > 50.0, "p = {p:?}");
    }

    #[test]
    fn test_project_into_geographic_srs_is_identity() {
        let p = Proj4Projector::new().project(WGS84_LONGLAT_SRS, Point::new(37.5, 55.7)).unwrap();
        assert!((p.x - 37.5).abs() < 1e-9);
        assert!((p.y - 55.7).abs() < 1e-9);
    }
}
