//! Row and metadata sources
//!
//! - [`CsvRowReader`] - streaming canonical CSV records
//! - [`published_fields`] / [`input_fields`] - ordered `(name, declared type)`
//!   pairs from a type-options XML document

mod csv;
mod type_options;
mod xml;

pub use csv::CsvRowReader;
pub use type_options::{input_fields, input_table_name, load_type_options, published_fields};
pub use xml::{parse_xml, XmlElement};

#[cfg(test)]
mod tests;
