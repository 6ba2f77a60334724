//! Bulk conversions between canonical CSV streams and Parquet files

use crate::audit::ConvertResult;
use crate::config::ConversionConfig;
use crate::error::{Error, Result};
use crate::reader::RowReader;
use crate::schema::{key_value_map, FieldMetadata};
use crate::source::CsvRowReader;
use crate::writer::AuditedWriter;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};

/// Rows read back per batch when exporting
const EXPORT_BATCH_SIZE: usize = 1024;

/// Outcome of a canonical to Parquet conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Rows persisted, including rows with field failures
    pub rows_written: u64,
    /// Audit record, `None` when auditing is disabled
    pub result: Option<ConvertResult>,
}

/// Convert canonical CSV rows into a Parquet file at `path`.
///
/// The header row is skipped when configured. Blank lines are skipped. When
/// the schema has more than one field, every single-field record is skipped
/// as well; a one-field schema writes its single-field records. The writer is
/// closed on every path.
pub fn canonical_to_parquet<R: BufRead>(
    input: R,
    fields: &[FieldMetadata],
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionSummary> {
    config.validate()?;
    let path = path.as_ref();
    let started = Instant::now();

    let mut writer = AuditedWriter::create(fields, path, config.writer.clone())?;
    let rows = CsvRowReader::with_delimiter(input, config.delimiter);
    let outcome = write_records(&mut writer, rows, config.has_header, fields.len());
    let closed = writer.close();

    let rows_written = outcome.inspect_err(|e| {
        error!(path = %path.display(), error = %e, "Conversion to parquet failed");
    })?;
    let result = closed?;

    info!(
        path = %path.display(),
        rows = rows_written,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Converted canonical rows to parquet"
    );
    Ok(ConversionSummary {
        rows_written,
        result,
    })
}

/// [`canonical_to_parquet`] reading from a file
pub fn canonical_file_to_parquet(
    source: impl AsRef<Path>,
    fields: &[FieldMetadata],
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionSummary> {
    let source = source.as_ref();
    if !source.exists() {
        return Err(Error::FileNotFound {
            path: source.display().to_string(),
        });
    }
    let input = BufReader::new(File::open(source)?);
    canonical_to_parquet(input, fields, path, config)
}

fn write_records<R: BufRead>(
    writer: &mut AuditedWriter,
    mut rows: CsvRowReader<R>,
    has_header: bool,
    field_count: usize,
) -> Result<u64> {
    if has_header && rows.read_row()?.is_some() {
        debug!("Skipped header row");
    }

    let mut written = 0;
    for row in rows {
        let row = row?;
        let blank = row.len() == 1 && row[0].is_empty();
        if blank || (row.len() == 1 && field_count > 1) {
            continue;
        }
        written += writer.write(&row)?;
    }
    Ok(written)
}

/// Write the rows of a Parquet file to `out` as canonical CSV lines.
///
/// `max_rows` limits the rows written and `max_columns` keeps only the leading
/// columns. Returns the number of rows written.
pub fn parquet_to_canonical<W: Write>(
    path: impl AsRef<Path>,
    mut out: W,
    max_rows: Option<u64>,
    max_columns: Option<usize>,
) -> Result<u64> {
    let path = path.as_ref();
    let mut reader = RowReader::open(path)?;
    let mut rows = 0u64;

    loop {
        let batch_size = match max_rows {
            Some(limit) => {
                let remaining = limit.saturating_sub(rows);
                if remaining == 0 {
                    break;
                }
                usize::try_from(remaining).map_or(EXPORT_BATCH_SIZE, |r| r.min(EXPORT_BATCH_SIZE))
            }
            None => EXPORT_BATCH_SIZE,
        };

        let batch = reader.next(batch_size)?;
        if batch.is_empty() {
            break;
        }
        for row in &batch {
            let columns = max_columns.map_or(row.len(), |max| max.min(row.len()));
            writeln!(out, "{}", row[..columns].join(","))?;
        }
        rows += batch.len() as u64;
    }

    out.flush()?;
    reader.close();
    debug!(path = %path.display(), rows, "Exported parquet rows");
    Ok(rows)
}

/// File level key/value metadata.
///
/// Any failure is reported as [`Error::MetadataFetch`].
pub fn read_metadata(path: impl AsRef<Path>) -> Result<BTreeMap<String, String>> {
    let path = path.as_ref();
    let fetch = || -> Result<BTreeMap<String, String>> {
        let reader = SerializedFileReader::new(File::open(path)?)?;
        Ok(key_value_map(reader.metadata().file_metadata()))
    };

    fetch().map_err(|e| {
        error!(path = %path.display(), error = %e, "Unable to fetch metadata");
        Error::metadata_fetch(path.display().to_string(), e.to_string())
    })
}
