//! Audited row writer

use super::buffer::ColumnBuffer;
use crate::audit::{
    AuditLog, AuditSnapshot, ConvertResult, CONVERT_RESULT_KEY, DETAIL_MESSAGE_KEY,
    FORMAT_VERSION, FORMAT_VERSION_KEY, PHYSICAL_SCHEMA_KEY,
};
use crate::codec::{encode_field, Value};
use crate::config::WriterConfig;
use crate::error::{Error, Result};
use crate::schema::{derive_schema, to_message_type, FieldMetadata, PhysicalSchema};
use parquet::file::writer::SerializedFileWriter;
use parquet::format::KeyValue;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of a writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Created, nothing written yet
    Open,
    /// At least one row written
    Writing,
    /// Finalizing the file
    Closing,
    /// File finalized or abandoned; no further writes
    Closed,
}

/// Writes canonical rows into a typed Parquet file, recording per-field
/// conversion failures instead of aborting.
///
/// A field that fails to convert is stored as null and reported in the
/// audit record under its row index and field id. The row itself is always
/// written.
pub struct AuditedWriter {
    path: PathBuf,
    fields: Vec<FieldMetadata>,
    schema: PhysicalSchema,
    config: WriterConfig,
    inner: Option<SerializedFileWriter<File>>,
    buffers: Vec<ColumnBuffer>,
    buffered_rows: usize,
    rows_written: u64,
    audit: AuditLog,
    summary: Option<ConvertResult>,
    close_failed: bool,
    state: WriterState,
}

impl AuditedWriter {
    /// Create the file at `path`, replacing any existing file
    pub fn create(
        fields: &[FieldMetadata],
        path: impl AsRef<Path>,
        config: WriterConfig,
    ) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();
        let schema = derive_schema(fields);
        let message = to_message_type(&schema)?;

        let file = File::create(&path)?;
        let props = Arc::new(config.build_properties());
        let inner = SerializedFileWriter::new(file, message, props)?;

        debug!(
            path = %path.display(),
            columns = schema.len(),
            row_group_size = config.row_group_size(),
            "Opened parquet writer"
        );

        let buffers = schema
            .fields()
            .iter()
            .map(|f| ColumnBuffer::for_kind(f.kind))
            .collect();

        Ok(Self {
            path,
            fields: fields.to_vec(),
            schema,
            config,
            inner: Some(inner),
            buffers,
            buffered_rows: 0,
            rows_written: 0,
            audit: AuditLog::new(),
            summary: None,
            close_failed: false,
            state: WriterState::Open,
        })
    }

    /// Declared fields this writer was created with
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    pub fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Rows persisted so far, including rows with field failures
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Write one canonical row. Returns the number of rows written.
    ///
    /// A row whose length differs from the field count is rejected with
    /// [`Error::RowShapeMismatch`]; nothing is written and the writer stays
    /// usable.
    pub fn write<S: AsRef<str>>(&mut self, row: &[S]) -> Result<u64> {
        if matches!(self.state, WriterState::Closing | WriterState::Closed) {
            return Err(Error::WriterClosed);
        }
        if row.len() != self.schema.len() {
            return Err(Error::row_shape(self.schema.len(), row.len()));
        }

        let mut field_errors = BTreeMap::new();
        let values: Vec<Value> = self
            .schema
            .fields()
            .iter()
            .zip(row)
            .map(|(field, raw)| {
                encode_field(field, raw.as_ref()).unwrap_or_else(|e| {
                    field_errors.insert(field.id.clone(), e.to_string());
                    Value::Null
                })
            })
            .collect();

        for (buffer, value) in self.buffers.iter_mut().zip(values) {
            buffer.push(value)?;
        }

        if field_errors.is_empty() {
            self.audit.record_success();
        } else {
            debug!(row = self.rows_written, errors = field_errors.len(), "Row has field errors");
            self.audit.record_failure(self.rows_written, field_errors);
        }

        self.rows_written += 1;
        self.buffered_rows += 1;
        self.state = WriterState::Writing;

        if self.buffered_rows >= self.config.row_group_size() {
            self.flush_row_group()?;
        }
        Ok(1)
    }

    /// Write rows in order, stopping at the first fatal error
    pub fn write_rows<R, S>(&mut self, rows: &[R]) -> Result<u64>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut written = 0;
        for row in rows {
            written += self.write(row.as_ref())?;
        }
        Ok(written)
    }

    /// Failure count and percentage of rows processed so far
    pub fn error_statistics(&self) -> AuditSnapshot {
        self.audit.snapshot()
    }

    /// Finalize the file. Idempotent; the storage handle is released on every path.
    ///
    /// Returns the audit record when auditing is enabled. Once a close has
    /// failed, later calls fail with [`Error::WriterClosed`].
    pub fn close(&mut self) -> Result<Option<ConvertResult>> {
        if self.state == WriterState::Closed {
            if self.close_failed {
                return Err(Error::WriterClosed);
            }
            return Ok(self.summary.clone());
        }

        self.state = WriterState::Closing;
        let outcome = self.finish();
        self.inner = None;
        self.state = WriterState::Closed;
        self.close_failed = outcome.is_err();

        let summary = outcome?;
        self.summary.clone_from(&summary);
        Ok(summary)
    }

    fn finish(&mut self) -> Result<Option<ConvertResult>> {
        self.flush_row_group()?;
        let mut inner = self.inner.take().ok_or(Error::WriterClosed)?;

        let mut metadata = BTreeMap::new();
        let summary = if self.config.is_audit_enabled() {
            let summary = self.audit.finalize(self.rows_written);
            metadata.insert(CONVERT_RESULT_KEY.to_string(), summary.status().to_string());
            metadata.insert(DETAIL_MESSAGE_KEY.to_string(), summary.to_json()?);
            Some(summary)
        } else {
            None
        };

        // Caller entries win over the audit keys
        metadata.extend(self.config.key_value_metadata().clone());
        metadata.insert(FORMAT_VERSION_KEY.to_string(), FORMAT_VERSION.to_string());
        metadata.insert(PHYSICAL_SCHEMA_KEY.to_string(), self.schema.to_json()?);

        for (key, value) in metadata {
            inner.append_key_value_metadata(KeyValue::new(key, value));
        }
        inner.close()?;

        match &summary {
            Some(s) => info!(
                path = %self.path.display(),
                rows = self.rows_written,
                failures = s.failure_count,
                status = %s.status(),
                "Closed parquet writer"
            ),
            None => info!(path = %self.path.display(), rows = self.rows_written, "Closed parquet writer"),
        }
        Ok(summary)
    }

    fn flush_row_group(&mut self) -> Result<()> {
        if self.buffered_rows == 0 {
            return Ok(());
        }
        let inner = self.inner.as_mut().ok_or(Error::WriterClosed)?;

        let mut row_group = inner.next_row_group()?;
        let mut buffers = self.buffers.iter_mut();
        while let Some(mut column) = row_group.next_column()? {
            let buffer = buffers
                .next()
                .ok_or_else(|| Error::Other("row group has more columns than the schema".into()))?;
            buffer.write_to(&mut column)?;
            column.close()?;
        }
        row_group.close()?;

        debug!(rows = self.buffered_rows, "Flushed row group");
        self.buffered_rows = 0;
        Ok(())
    }
}

impl Drop for AuditedWriter {
    fn drop(&mut self) {
        if self.state != WriterState::Closed {
            if let Err(e) = self.close() {
                warn!(path = %self.path.display(), error = %e, "Failed to close parquet writer");
            }
        }
    }
}
