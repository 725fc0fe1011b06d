//! The declared column schema of packet tables.
//!
//! The schema is fixed once, at stream construction, from the payload flag
//! alone. Every record a stream produces and the final materialized table
//! use exactly this column set, in this order.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};

pub const TIME: &str = "time";
pub const SRC_HOST: &str = "src_host";
pub const SRC_PORT: &str = "src_port";
pub const DST_HOST: &str = "dst_host";
pub const DST_PORT: &str = "dst_port";
pub const PROTOCOL: &str = "protocol";
pub const PAYLOAD: &str = "payload";

/// Build the table schema for a stream.
///
/// `include_payload` decides, once, whether the trailing `payload` column
/// exists. All columns are nullable; `time` carries microsecond precision.
///
/// # Examples
/// ```
/// use tabcap_core::table_schema;
///
/// let schema = table_schema(false);
/// assert_eq!(schema.fields().len(), 6);
/// assert_eq!(schema.field(0).name(), "time");
/// ```
pub fn table_schema(include_payload: bool) -> SchemaRef {
    let mut fields = vec![
        Field::new(TIME, DataType::Timestamp(TimeUnit::Microsecond, None), true),
        Field::new(SRC_HOST, DataType::Utf8, true),
        Field::new(SRC_PORT, DataType::UInt16, true),
        Field::new(DST_HOST, DataType::Utf8, true),
        Field::new(DST_PORT, DataType::UInt16, true),
        Field::new(PROTOCOL, DataType::Utf8, true),
    ];
    if include_payload {
        fields.push(Field::new(PAYLOAD, DataType::Binary, true));
    }
    Arc::new(Schema::new(fields))
}
