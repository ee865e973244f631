//! Parse-and-check of raw record documents.
//!
//! Loading happens in one step: the generic YAML value is checked for shape
//! (key sets, counts), converted into [`RecordData`], and the typed value is
//! checked again. Data built in code skips the first stage and goes through
//! [`RecordData::validate`] only.
//!
//! Checks run in a fixed order so a document with several problems always
//! reports the same one first:
//!
//! 1. GCP count
//! 2. GCP key sets (`ground`, `is_projected`, `pixel`; `x`, `y`)
//! 3. Cutline SRS present and non-empty
//! 4. Cutline point count
//! 5. Cutline point key sets

use super::types::{FormatError, RecordData, MIN_CUTLINE_POINTS, MIN_GCPS};
use serde_yaml::Value;

const GCP_KEYS: [&str; 3] = ["ground", "is_projected", "pixel"];
const POINT_KEYS: [&str; 2] = ["x", "y"];
const REQUIRED_FIELDS: [&str; 3] = ["image_path", "srs", "gcps"];

/// True when `value` is a mapping whose keys are exactly `expected`.
///
/// `expected` must be sorted.
fn has_exact_keys(value: &Value, expected: &[&str]) -> bool {
    let Some(map) = value.as_mapping() else {
        return false;
    };
    let mut keys = Vec::with_capacity(map.len());
    for key in map.keys() {
        match key.as_str() {
            Some(k) => keys.push(k),
            None => return false,
        }
    }
    keys.sort_unstable();
    keys == expected
}

fn check_gcps(gcps: &Value) -> Result<(), FormatError> {
    let gcps = gcps
        .as_sequence()
        .ok_or_else(|| FormatError::InvalidValue("gcps must be a sequence".to_string()))?;
    if gcps.len() < MIN_GCPS {
        return Err(FormatError::TooFewGcps(gcps.len()));
    }

    for (index, gcp) in gcps.iter().enumerate() {
        if !has_exact_keys(gcp, &GCP_KEYS) {
            return Err(FormatError::MalformedGcp {
                index,
                detail: "expected keys ground, is_projected, pixel".to_string(),
            });
        }
        for field in ["ground", "pixel"] {
            let ok = gcp.get(field).is_some_and(|v| has_exact_keys(v, &POINT_KEYS));
            if !ok {
                return Err(FormatError::MalformedGcp {
                    index,
                    detail: format!("{field} must have exactly x and y"),
                });
            }
        }
    }
    Ok(())
}

fn check_cutline(cutline: &Value) -> Result<(), FormatError> {
    let srs = cutline.get("srs").and_then(Value::as_str).unwrap_or_default();
    if srs.is_empty() {
        return Err(FormatError::MissingCutlineSrs);
    }

    let points = cutline
        .get("points")
        .and_then(Value::as_sequence)
        .ok_or_else(|| FormatError::InvalidValue("cutline points must be a sequence".to_string()))?;
    if points.len() < MIN_CUTLINE_POINTS {
        return Err(FormatError::TooFewCutlinePoints(points.len()));
    }
    if let Some(index) = points.iter().position(|p| !has_exact_keys(p, &POINT_KEYS)) {
        return Err(FormatError::MalformedCutlinePoint { index });
    }
    Ok(())
}

/// Shape checks on the untyped document.
fn check_shape(value: &Value) -> Result<(), FormatError> {
    let root = value.as_mapping().ok_or(FormatError::NotAMapping)?;
    for field in REQUIRED_FIELDS {
        if !root.contains_key(field) {
            return Err(FormatError::MissingField(field));
        }
    }

    check_gcps(root.get("gcps").unwrap_or(&Value::Null))?;
    match root.get("cutline") {
        Some(cutline) if !cutline.is_null() => check_cutline(cutline),
        _ => Ok(()),
    }
}

impl RecordData {
    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormatError`] found, in the order listed in the
    /// module docs. Values of the wrong type surface as
    /// [`FormatError::InvalidValue`].
    pub fn from_value(value: Value) -> Result<Self, FormatError> {
        check_shape(&value)?;
        let data: RecordData =
            serde_yaml::from_value(value).map_err(|e| FormatError::InvalidValue(e.to_string()))?;
        data.validate()?;
        Ok(data)
    }

    /// Check counts and the cutline SRS of typed data.
    ///
    /// Key-set checks are not needed here: the types already guarantee them.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.gcps.len() < MIN_GCPS {
            return Err(FormatError::TooFewGcps(self.gcps.len()));
        }
        if let Some(cutline) = &self.cutline {
            if cutline.srs.is_empty() {
                return Err(FormatError::MissingCutlineSrs);
            }
            if cutline.points.len() < MIN_CUTLINE_POINTS {
                return Err(FormatError::TooFewCutlinePoints(cutline.points.len()));
            }
        }
        Ok(())
    }
}
