//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::codec::decode_field;
use crate::compat::{is_supported, unsupported_columns};
use crate::config::ConversionConfig;
use crate::convert::{canonical_file_to_parquet, parquet_to_canonical, read_metadata};
use crate::error::{Error, Result};
use crate::reader::{ColumnStreamReader, RowReader};
use crate::schema::{derive_schema, FieldMetadata, PhysicalSchema};
use crate::source;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::ToParquet {
                input,
                output,
                type_options,
                input_fields,
                table,
                header,
                delimiter,
                compression,
                row_group_size,
                no_audit,
                metadata,
            } => {
                let mut config = self.load_config()?;
                if *header {
                    config.has_header = true;
                }
                if let Some(delimiter) = delimiter {
                    config.delimiter = *delimiter;
                }
                if table.is_some() {
                    config.table.clone_from(table);
                }
                if let Some(codec) = compression {
                    config.writer = config.writer.with_compression(*codec);
                }
                if let Some(size) = row_group_size {
                    config.writer = config.writer.with_row_group_size(*size);
                }
                if *no_audit {
                    config.writer = config.writer.with_audit(false);
                }
                for (key, value) in metadata {
                    config.writer = config.writer.with_metadata(key, value);
                }

                let fields = Self::load_fields(type_options, *input_fields, config.table.as_deref())?;
                self.to_parquet(input, output, &fields, &config)
            }
            Commands::ToCsv {
                input,
                output,
                max_rows,
                max_columns,
            } => {
                let config = self.load_config()?;
                self.to_csv(
                    input,
                    output.as_deref(),
                    max_rows.or(config.max_rows),
                    max_columns.or(config.max_columns),
                )
            }
            Commands::Metadata { input } => self.metadata(input),
            Commands::Check { input } => self.check(input),
            Commands::Schema {
                type_options,
                parquet,
                input_fields,
                table,
            } => self.schema(
                type_options.as_deref(),
                parquet.as_deref(),
                *input_fields,
                table.as_deref(),
            ),
            Commands::Column {
                input,
                column,
                limit,
            } => self.column(input, column, *limit),
        }
    }

    /// Load the conversion config, defaults when no file is given
    fn load_config(&self) -> Result<ConversionConfig> {
        match &self.cli.config {
            Some(path) => ConversionConfig::from_file(path),
            None => Ok(ConversionConfig::default()),
        }
    }

    /// Declared fields from a type-options file
    fn load_fields(path: &Path, input_only: bool, table: Option<&str>) -> Result<Vec<FieldMetadata>> {
        let doc = source::load_type_options(path)?;
        if input_only || table.is_some() {
            source::input_fields(&doc, table)
        } else {
            source::published_fields(&doc)
        }
    }

    /// Convert canonical CSV to Parquet
    fn to_parquet(
        &self,
        input: &Path,
        output: &Path,
        fields: &[FieldMetadata],
        config: &ConversionConfig,
    ) -> Result<()> {
        let started = Instant::now();
        let summary = canonical_file_to_parquet(input, fields, output, config)?;

        let mut report = json!({
            "type": "CONVERSION",
            "conversion": {
                "input": input.display().to_string(),
                "output": output.display().to_string(),
                "rows": summary.rows_written,
                "duration_ms": started.elapsed().as_millis() as u64,
            }
        });

        if let Some(result) = &summary.result {
            report["conversion"]["status"] = json!(result.status().as_str());
            report["conversion"]["failure_count"] = json!(result.failure_count);
            report["conversion"]["success_count"] = json!(result.success_count);
            if self.cli.verbose {
                report["conversion"]["errors"] = serde_json::to_value(&result.errors)?;
            }
        }

        self.output_message(&report);
        Ok(())
    }

    /// Export Parquet rows as canonical CSV
    fn to_csv(
        &self,
        input: &Path,
        output: Option<&Path>,
        max_rows: Option<u64>,
        max_columns: Option<usize>,
    ) -> Result<()> {
        match output {
            Some(path) => {
                let out = BufWriter::new(File::create(path)?);
                let rows = parquet_to_canonical(input, out, max_rows, max_columns)?;
                self.output_message(&json!({
                    "type": "EXPORT",
                    "export": {
                        "input": input.display().to_string(),
                        "output": path.display().to_string(),
                        "rows": rows,
                    }
                }));
            }
            None => {
                let stdout = io::stdout();
                parquet_to_canonical(input, stdout.lock(), max_rows, max_columns)?;
            }
        }
        Ok(())
    }

    /// Show key/value metadata
    fn metadata(&self, input: &Path) -> Result<()> {
        let metadata = read_metadata(input)?;
        self.output_message(&json!({
            "type": "METADATA",
            "metadata": metadata,
        }));
        Ok(())
    }

    /// Check readability
    fn check(&self, input: &Path) -> Result<()> {
        let supported = is_supported(input)?;

        let mut report = json!({
            "type": "COMPATIBILITY",
            "compatibility": {
                "path": input.display().to_string(),
                "supported": supported,
            }
        });
        if !supported {
            // A corrupt file has no columns to list
            if let Ok(columns) = unsupported_columns(input) {
                report["compatibility"]["unsupported_columns"] = json!(columns
                    .into_iter()
                    .map(|(name, storage)| json!({ "name": name, "storage_type": storage }))
                    .collect::<Vec<_>>());
            }
        }

        self.output_message(&report);
        Ok(())
    }

    /// Show a physical schema
    fn schema(
        &self,
        type_options: Option<&Path>,
        parquet: Option<&Path>,
        input_only: bool,
        table: Option<&str>,
    ) -> Result<()> {
        let schema: PhysicalSchema = match (type_options, parquet) {
            (Some(path), _) => derive_schema(&Self::load_fields(path, input_only, table)?),
            (None, Some(path)) => {
                let mut reader = RowReader::open(path)?;
                let schema = reader.schema().clone();
                reader.close();
                schema
            }
            (None, None) => {
                return Err(Error::config("either --type-options or --parquet is required"))
            }
        };

        let fields = schema
            .fields()
            .iter()
            .map(|f| {
                json!({
                    "id": f.id,
                    "source_name": f.source_name,
                    "kind": f.kind.storage_name(),
                    "declared_type": f.declared_type(),
                })
            })
            .collect::<Vec<_>>();

        self.output_message(&json!({
            "type": "SCHEMA",
            "schema": { "fields": fields },
        }));
        Ok(())
    }

    /// Print one column's values
    fn column(&self, input: &Path, column: &str, limit: Option<u64>) -> Result<()> {
        let mut reader = ColumnStreamReader::open(input, column)?;
        let field = reader.field().cloned();

        let mut values = Vec::new();
        while reader.has_next() && limit.map_or(true, |max| reader.rows_read() < max) {
            let value = reader.next_value()?;
            values.push(match &field {
                Some(field) if !value.is_null() => Value::String(decode_field(field, &value)),
                _ => Value::Null,
            });
        }
        reader.close();

        self.output_message(&json!({
            "type": "COLUMN",
            "column": {
                "name": column,
                "kind": field.as_ref().map(|f| f.kind.storage_name()),
                "total_rows": reader.total_rows(),
                "values": values,
            }
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
