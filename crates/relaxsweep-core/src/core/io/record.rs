use super::{StorageError, write_atomically};
use crate::core::models::record::ResultRecord;
use std::path::Path;

/// Persists a record as headerless CSV, one row per condition.
pub fn write_record(path: &Path, record: &ResultRecord) -> Result<(), StorageError> {
    let csv_error = |source: csv::Error| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    };
    write_atomically(path, |f| {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(f);
        for row in record.rows() {
            writer.serialize(row).map_err(csv_error)?;
        }
        writer
            .flush()
            .map_err(|e| StorageError::io(path, e))
    })
}

pub fn read_record(path: &Path) -> Result<ResultRecord, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| StorageError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    let rows = reader
        .deserialize::<Vec<f64>>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    ResultRecord::from_rows(rows).map_err(|e| StorageError::RecordCorrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
