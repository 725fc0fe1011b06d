//! Core library for tabulating captured IP traffic.
//!
//! This crate implements the decoding and tabulation pipeline behind the
//! CLI: a capture source (live interface or saved file) delivers raw frames
//! with kernel timestamps, the packet layer decodes IP and transport
//! headers, the record layer turns each frame into a schema-conformant row,
//! and the stream layer aggregates rows into a typed Arrow table. Parsing is
//! byte-oriented and side-effect free; all I/O is isolated in `stream`
//! sources.
//!
//! Invariants:
//! - Every table a stream produces matches its declared schema exactly,
//!   including the zero-row case.
//! - Records keep capture arrival order.
//! - A malformed frame drops that frame only; source failures abort the run.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use tabcap_core::OfflineStream;
//!
//! let mut stream = OfflineStream::offline(Path::new("capture.pcap"), Some("tcp"), false)?;
//! let table = stream.to_dataframe(100)?;
//! println!("{} rows", table.num_rows());
//! # Ok::<(), tabcap_core::StreamError>(())
//! ```

mod filter;
mod packet;
mod record;
pub mod schema;
mod stream;
mod table;

pub use filter::bpf_expression;
pub use packet::{LinkLayer, MalformedHeaderError, ParsedHeader, parse_ip_packet};
pub use record::{RawFrame, Record, build_record, timestamp_micros};
pub use schema::table_schema;
pub use stream::{
    CaptureSource, FileSource, LiveConfig, LiveSource, LiveStream, OfflineStream, PacketStream,
    SourceError, StreamError,
};
pub use table::materialize;
