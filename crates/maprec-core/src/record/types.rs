//! Core types for map records.

use crate::geometry::Point;
use crate::interpolate::InterpolationError;
use crate::projection::ProjectionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Minimum number of GCPs a record must carry.
pub const MIN_GCPS: usize = 3;

/// Minimum number of cutline points (before closing the ring).
pub const MIN_CUTLINE_POINTS: usize = 3;

/// Cutline SRS sentinel meaning "image pixel coordinates".
pub const RAW_SRS: &str = "RAW";

/// Structural problems in record data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    /// Fewer than [`MIN_GCPS`] control points.
    #[error("Too few gcps: expected at least 3, got {0}")]
    TooFewGcps(usize),

    /// A GCP is not `{ground: {x, y}, is_projected, pixel: {x, y}}`.
    #[error("Wrong gcp format at index {index}: {detail}")]
    MalformedGcp { index: usize, detail: String },

    /// The cutline has no SRS (use `RAW` for pixel coordinates).
    #[error("Cutline must have srs or RAW for pixel coordinates")]
    MissingCutlineSrs,

    /// Fewer than [`MIN_CUTLINE_POINTS`] cutline points.
    #[error("Too few points in cutline: expected at least 3, got {0}")]
    TooFewCutlinePoints(usize),

    /// A cutline point is not exactly `{x, y}`.
    #[error("Wrong cutline format at point {index}")]
    MalformedCutlinePoint { index: usize },

    /// The document root is not a mapping.
    #[error("Map record must be a mapping")]
    NotAMapping,

    /// A required top-level key is absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A value has the wrong type (e.g. a non-numeric coordinate).
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Errors raised by [`super::Record`] operations.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    /// A path that cannot be stored in a record file.
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

pub type Result<T> = std::result::Result<T, RecordError>;

/// SRS a cutline is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CutlineSrs {
    /// Image pixel coordinates; projected through the GCP transform.
    Raw,
    /// A named SRS; projected with the projection service.
    Srs(String),
}

impl CutlineSrs {
    /// True for a named SRS with an empty identifier.
    pub fn is_empty(&self) -> bool {
        matches!(self, CutlineSrs::Srs(s) if s.is_empty())
    }
}

impl From<String> for CutlineSrs {
    fn from(value: String) -> Self {
        if value == RAW_SRS {
            CutlineSrs::Raw
        } else {
            CutlineSrs::Srs(value)
        }
    }
}

impl From<&str> for CutlineSrs {
    fn from(value: &str) -> Self {
        CutlineSrs::from(value.to_string())
    }
}

impl From<CutlineSrs> for String {
    fn from(value: CutlineSrs) -> Self {
        match value {
            CutlineSrs::Raw => RAW_SRS.to_string(),
            CutlineSrs::Srs(s) => s,
        }
    }
}

/// A control point as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawGcp {
    /// Ground coordinate, in the record SRS when `is_projected`, else lon/lat.
    pub ground: Point,
    pub is_projected: bool,
    /// Image pixel coordinate.
    pub pixel: Point,
}

impl RawGcp {
    pub fn new(pixel: Point, ground: Point, is_projected: bool) -> Self {
        Self {
            ground,
            is_projected,
            pixel,
        }
    }
}

/// A control point with its ground coordinate in the record SRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gcp {
    pub pixel: Point,
    pub ground: Point,
}

/// Clipping polygon as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cutline {
    pub points: Vec<Point>,
    pub srs: CutlineSrs,
}

impl Cutline {
    pub fn new(points: Vec<Point>, srs: impl Into<CutlineSrs>) -> Self {
        Self {
            points,
            srs: srs.into(),
        }
    }
}

/// Validated contents of a map record file.
///
/// Fields are declared in key order so the written file is sorted the same
/// way regardless of how the record was built. Unknown top-level keys are
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutline: Option<Cutline>,
    pub gcps: Vec<RawGcp>,
    /// Image path, relative to the record file's directory (or absolute).
    pub image_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_path: Option<String>,
    pub srs: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl RecordData {
    /// Build record data without a cutline or mask.
    pub fn new(image_path: impl Into<String>, srs: impl Into<String>, gcps: Vec<RawGcp>) -> Self {
        Self {
            cutline: None,
            gcps,
            image_path: image_path.into(),
            mask_path: None,
            srs: srs.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_cutline(mut self, cutline: Cutline) -> Self {
        self.cutline = Some(cutline);
        self
    }

    pub fn with_mask_path(mut self, mask_path: impl Into<String>) -> Self {
        self.mask_path = Some(mask_path.into());
        self
    }
}
