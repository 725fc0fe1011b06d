//! Output formatting for captured tables.
//!
//! Table mode pretty-prints the batch; JSON mode emits one object per row
//! (JSON Lines), with the capture time rendered RFC3339 and the payload
//! hex-encoded so the output stays line-oriented text.

use std::io::Write;

use anyhow::{Context, Result};
use arrow::array::{
    Array, BinaryArray, StringArray, TimestampMicrosecondArray, UInt16Array,
};
use arrow::record_batch::RecordBatch;
use clap::ValueEnum;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use tabcap_core::schema;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table (default)
    Table,
    /// JSON Lines (one object per row)
    Json,
}

/// Write a batch to `writer` in the requested format.
pub fn write<W: Write>(batch: &RecordBatch, format: OutputFormat, writer: &mut W) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(batch, writer),
        OutputFormat::Json => write_json(batch, writer),
    }
}

fn write_table<W: Write>(batch: &RecordBatch, writer: &mut W) -> Result<()> {
    let rendered = arrow::util::pretty::pretty_format_batches(std::slice::from_ref(batch))
        .context("format table")?;
    writeln!(writer, "{rendered}").context("write table")
}

fn write_json<W: Write>(batch: &RecordBatch, writer: &mut W) -> Result<()> {
    let batch_schema = batch.schema();
    for row in 0..batch.num_rows() {
        let mut obj = serde_json::Map::new();
        for (idx, field) in batch_schema.fields().iter().enumerate() {
            let value = cell_value(field.name(), batch.column(idx), row)?;
            obj.insert(field.name().clone(), value);
        }
        writeln!(writer, "{}", serde_json::Value::Object(obj)).context("write row")?;
    }
    Ok(())
}

fn cell_value(
    name: &str,
    column: &std::sync::Arc<dyn Array>,
    row: usize,
) -> Result<serde_json::Value> {
    if column.is_null(row) {
        return Ok(serde_json::Value::Null);
    }

    let value = match name {
        schema::TIME => {
            let times = downcast::<TimestampMicrosecondArray>(column, name)?;
            let micros = times.value(row);
            match rfc3339_micros(micros) {
                Some(rendered) => serde_json::Value::String(rendered),
                None => serde_json::Value::Number(micros.into()),
            }
        }
        schema::SRC_PORT | schema::DST_PORT => {
            let ports = downcast::<UInt16Array>(column, name)?;
            serde_json::Value::Number(ports.value(row).into())
        }
        schema::PAYLOAD => {
            let payloads = downcast::<BinaryArray>(column, name)?;
            serde_json::Value::String(hex::encode(payloads.value(row)))
        }
        _ => {
            let strings = downcast::<StringArray>(column, name)?;
            serde_json::Value::String(strings.value(row).to_string())
        }
    };
    Ok(value)
}

fn downcast<'a, A: 'static>(column: &'a std::sync::Arc<dyn Array>, name: &str) -> Result<&'a A> {
    column
        .as_any()
        .downcast_ref::<A>()
        .with_context(|| format!("unexpected array type for column {name}"))
}

fn rfc3339_micros(micros: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000)
        .ok()?
        .format(&Rfc3339)
        .ok()
}
