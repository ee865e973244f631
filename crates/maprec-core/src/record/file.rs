//! Reading and writing record files.

use super::types::{RecordData, Result};
use std::fs;
use std::path::Path;

impl RecordData {
    /// Parse and validate a YAML record document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        Ok(Self::from_value(value)?)
    }

    /// Serialize to the on-disk YAML form.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Load and validate the record at `path`.
pub(crate) fn read_data(path: &Path) -> Result<RecordData> {
    let text = fs::read_to_string(path)?;
    match RecordData::from_yaml_str(&text) {
        Ok(data) => {
            log::debug!(
                "Loaded map record {} ({} gcps, cutline: {})",
                path.display(),
                data.gcps.len(),
                data.cutline.is_some()
            );
            Ok(data)
        }
        Err(e) => {
            log::debug!("Rejected map record {}: {}", path.display(), e);
            Err(e)
        }
    }
}

/// Write `data` to `path` as YAML, replacing any existing file.
pub(crate) fn write_data(path: &Path, data: &RecordData) -> Result<()> {
    let text = data.to_yaml_string()?;
    fs::write(path, text)?;
    log::debug!("Wrote map record {}", path.display());
    Ok(())
}
