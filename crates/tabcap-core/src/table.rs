//! Table materialization.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BinaryBuilder, StringBuilder, TimestampMicrosecondBuilder, UInt16Builder,
};
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::record::Record;
use crate::schema;

/// Materialize collected records into a batch matching `schema` exactly.
///
/// Column order and types come from the schema, never from the records; zero
/// records produce an empty batch with the full typed column set.
pub fn materialize(schema: &SchemaRef, records: &[Record]) -> Result<RecordBatch, ArrowError> {
    let include_payload = schema
        .fields()
        .iter()
        .any(|field| field.name() == schema::PAYLOAD);

    let mut time = TimestampMicrosecondBuilder::with_capacity(records.len());
    let mut src_host = StringBuilder::new();
    let mut src_port = UInt16Builder::with_capacity(records.len());
    let mut dst_host = StringBuilder::new();
    let mut dst_port = UInt16Builder::with_capacity(records.len());
    let mut protocol = StringBuilder::new();
    let mut payload = BinaryBuilder::new();

    for record in records {
        time.append_value(record.time);
        src_host.append_value(&record.src_host);
        src_port.append_option(record.src_port);
        dst_host.append_value(&record.dst_host);
        dst_port.append_option(record.dst_port);
        protocol.append_value(&record.protocol);
        if include_payload {
            match &record.payload {
                Some(bytes) => payload.append_value(bytes),
                None => payload.append_null(),
            }
        }
    }

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(time.finish()),
        Arc::new(src_host.finish()),
        Arc::new(src_port.finish()),
        Arc::new(dst_host.finish()),
        Arc::new(dst_port.finish()),
        Arc::new(protocol.finish()),
    ];
    if include_payload {
        columns.push(Arc::new(payload.finish()));
    }

    RecordBatch::try_new(schema.clone(), columns)
}
