//! Parquet readers
//!
//! - [`ColumnStreamReader`] - one column, one value at a time, across row groups
//! - [`RowReader`] - whole rows in batches, decoded to canonical strings
//!
//! Both use the physical schema persisted by the writer when present, so
//! time-of-day and default-scale columns decode exactly as they were written.

mod column;
mod rows;

pub use column::ColumnStreamReader;
pub use rows::RowReader;
