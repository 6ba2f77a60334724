//! Audited Parquet writer
//!
//! [`AuditedWriter`] converts canonical rows field by field, buffers them per
//! column and flushes a row group every `row_group_size` rows. On close it
//! persists the audit record, the physical schema, the format version and any
//! caller metadata in the file footer.

mod audited;
mod buffer;

pub use audited::{AuditedWriter, WriterState};
