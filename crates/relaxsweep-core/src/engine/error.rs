use super::config::ConfigError;
use crate::core::io::StorageError;
use crate::core::models::grid::GridError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Manifest '{dir}' is corrupt: {reason}", dir = dir.display())]
    ManifestCorrupt { dir: PathBuf, reason: String },

    #[error("Storage failure: {source}")]
    Storage {
        #[from]
        source: StorageError,
    },

    #[error("Invalid grid: {source}")]
    Grid {
        #[from]
        source: GridError,
    },

    #[error("Axis-B index {index} is out of range for an axis of {len} value(s)")]
    SelectionOutOfRange { index: usize, len: usize },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
