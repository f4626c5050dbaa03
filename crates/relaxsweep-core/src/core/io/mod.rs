//! On-disk formats of a sweep manifest.
//!
//! A manifest is a plain directory: two TOML axis files plus one CSV record per completed grid
//! point. Every file is written through a temporary sibling and renamed into place, so a reader
//! never observes a half-written file and the existence of a record is its completion marker.

pub mod axis;
pub mod naming;
pub mod record;

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}", path = path.display())]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("TOML serialization error for '{path}': {source}", path = path.display())]
    TomlWrite {
        path: PathBuf,
        source: toml::ser::Error,
    },

    #[error("CSV error for '{path}': {source}", path = path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Malformed record '{path}': {reason}", path = path.display())]
    RecordCorrupt { path: PathBuf, reason: String },
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Writes a file by filling a temporary file in the same directory and renaming it over
/// `path` once `fill` succeeds.
pub(crate) fn write_atomically<F>(path: &Path, fill: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut NamedTempFile) -> Result<(), StorageError>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
    fill(&mut tmp)?;
    tmp.flush().map_err(|e| StorageError::io(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StorageError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| StorageError::io(path, e.error))?;
    Ok(())
}
