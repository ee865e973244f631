//! Record fingerprints.
//!
//! A fingerprint identifies the georeferencing of a record together with the
//! current state of its image. It is the SHA-1 (hex) of a JSON payload made
//! of the record data with `image_path` removed, plus the image size in bytes
//! and its modification time in seconds since the Unix epoch.
//!
//! Moving or renaming the record or image keeps the fingerprint; editing the
//! GCPs, SRS or cutline, or touching the image, changes it. The JSON object
//! keys are sorted, so the payload does not depend on field order.

use super::types::{RecordData, Result};
use sha1::{Digest, Sha1};
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Compute the fingerprint of `data` whose image resolves to `image_path`.
pub(crate) fn compute(data: &RecordData, image_path: &Path) -> Result<String> {
    let metadata = fs::metadata(image_path)?;
    let mtime = match metadata.modified()?.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    };

    let mut payload = serde_json::to_value(data)?;
    if let Some(map) = payload.as_object_mut() {
        map.remove("image_path");
        map.insert("image_size".to_string(), metadata.len().into());
        map.insert("image_mtime".to_string(), mtime.into());
    }

    let mut hasher = Sha1::new();
    hasher.update(serde_json::to_vec(&payload)?);
    let fingerprint = hex::encode(hasher.finalize());

    log::trace!("Fingerprint of {}: {}", image_path.display(), fingerprint);
    Ok(fingerprint)
}
