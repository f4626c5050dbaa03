use super::{StorageError, write_atomically};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct AxisFile {
    values: Vec<f64>,
}

/// Reads the coordinate values persisted in a manifest axis file.
pub fn read_axis(path: &Path) -> Result<Vec<f64>, StorageError> {
    let content = std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    let file: AxisFile = toml::from_str(&content).map_err(|e| StorageError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(file.values)
}

/// Persists axis values. TOML floats are written in their shortest round-trip form, so reading
/// the file back yields bit-identical values.
pub fn write_axis(path: &Path, values: &[f64]) -> Result<(), StorageError> {
    let content = toml::to_string(&AxisFile {
        values: values.to_vec(),
    })
    .map_err(|e| StorageError::TomlWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_atomically(path, |f| {
        f.write_all(content.as_bytes())
            .map_err(|e| StorageError::io(path, e))
    })
}
