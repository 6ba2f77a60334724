//! Compatibility checks for existing Parquet files
//!
//! A file is supported when this crate can read it back as canonical rows.
//! Files written by [`AuditedWriter`](crate::writer::AuditedWriter) carry an
//! audit record and are probed by reading one row; other files are judged by
//! their column storage kinds.

use crate::audit::{ConvertResult, CONVERT_RESULT_KEY, DETAIL_MESSAGE_KEY};
use crate::error::Result;
use crate::reader::RowReader;
use crate::schema::{column_kind, key_value_map, storage_type_name};
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Whether the file at `path` can be read by this crate.
///
/// Failing to open the file is an error. Any fault after that makes the file
/// unsupported.
pub fn is_supported(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let file = File::open(path)?;

    match check(path, file) {
        Ok(supported) => Ok(supported),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Compatibility check failed");
            Ok(false)
        }
    }
}

/// Columns whose storage kind this crate cannot decode, as `(name, storage type)`
pub fn unsupported_columns(path: impl AsRef<Path>) -> Result<Vec<(String, String)>> {
    let reader = SerializedFileReader::new(File::open(path.as_ref())?)?;
    let descr = reader.metadata().file_metadata().schema_descr_ptr();
    Ok(descr
        .columns()
        .iter()
        .filter(|c| column_kind(c).is_none())
        .map(|c| (c.name().to_string(), storage_type_name(c)))
        .collect())
}

fn check(path: &Path, file: File) -> Result<bool> {
    let reader = SerializedFileReader::new(file)?;
    let file_metadata = reader.metadata().file_metadata();
    let metadata = key_value_map(file_metadata);

    if !metadata.contains_key(CONVERT_RESULT_KEY) {
        let descr = file_metadata.schema_descr();
        let unsupported = descr.columns().iter().find(|c| column_kind(c).is_none());
        if let Some(column) = unsupported {
            debug!(
                path = %path.display(),
                column = column.name(),
                storage = %storage_type_name(column),
                "Unsupported column"
            );
            return Ok(false);
        }
        return Ok(true);
    }

    // A missing detail record skips the probe; an unreadable one is a fault
    let total_count = match metadata.get(DETAIL_MESSAGE_KEY) {
        Some(json) => ConvertResult::from_json(json)?.total_count,
        None => 0,
    };
    if total_count == 0 {
        return Ok(true);
    }

    drop(reader);
    let mut rows = RowReader::open(path)?;
    let probe = rows.next(1)?;
    rows.close();
    Ok(probe.len() == 1)
}
