//! Capture stream aggregation.
//!
//! `PacketStream` drives the pull loop over a capture source: apply the
//! filter, read frames, build records, and materialize the table. The two
//! source variants (live interface, saved file) differ only in how the
//! source is acquired; everything after acquisition is shared.

mod error;
mod source;

pub use error::{SourceError, StreamError};
pub use source::{CaptureSource, FileSource, LiveConfig, LiveSource};

use std::path::Path;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::filter::bpf_expression;
use crate::record::{Record, build_record};
use crate::schema::table_schema;
use crate::table;

/// A configured packet stream over an exclusively-owned capture source.
///
/// The filter expression and column schema are fixed at construction; the
/// capture itself runs when [`PacketStream::to_dataframe`] is called.
pub struct PacketStream<S> {
    source: S,
    filter: String,
    schema: SchemaRef,
    include_payload: bool,
}

/// Live interface stream.
pub type LiveStream = PacketStream<LiveSource>;
/// Saved capture file stream.
pub type OfflineStream = PacketStream<FileSource>;

impl<S: CaptureSource> PacketStream<S> {
    /// Wrap an already-open capture source.
    pub fn new(source: S, protocol: Option<&str>, include_payload: bool) -> Self {
        Self {
            source,
            filter: bpf_expression(protocol),
            schema: table_schema(include_payload),
            include_payload,
        }
    }

    /// The declared column schema of every table this stream produces.
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// The BPF filter expression applied to the source.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Capture up to `limit` frames and materialize them as a table.
    ///
    /// A negative `limit` reads until the source is exhausted. Frames whose
    /// headers cannot be decoded are dropped (logged at debug level) and the
    /// loop continues; source and filter failures abort the whole run.
    ///
    /// Calling this again on the same stream reapplies the filter and
    /// resumes the source: an exhausted file source yields an empty table
    /// with the full schema, a live source keeps capturing.
    pub fn to_dataframe(&mut self, limit: i64) -> Result<RecordBatch, StreamError> {
        debug!(filter = %self.filter, limit, "starting capture run");
        self.source.set_filter(&self.filter)?;
        let records = self.collect(limit)?;
        Ok(table::materialize(&self.schema, &records)?)
    }

    /// Pull loop: one frame per iteration, records in arrival order.
    ///
    /// `limit` counts processed frames, so a dropped frame still consumes
    /// one unit, matching the capture collaborator's loop-count contract.
    fn collect(&mut self, limit: i64) -> Result<Vec<Record>, StreamError> {
        let link = self.source.link_layer();
        let mut records = Vec::new();
        let mut processed: i64 = 0;

        while limit < 0 || processed < limit {
            let frame = match self.source.next_frame()? {
                Some(frame) => frame,
                None => break,
            };
            processed += 1;
            match build_record(&frame, link, self.include_payload) {
                Ok(record) => records.push(record),
                Err(reason) => debug!(%reason, "dropping undecodable frame"),
            }
        }
        Ok(records)
    }
}

impl PacketStream<LiveSource> {
    /// Open a live stream on `interface`.
    ///
    /// The interface is opened eagerly (promiscuous, with the configured
    /// snapshot length and read timeout); open failures surface here, not at
    /// the first read.
    pub fn live(
        interface: &str,
        protocol: Option<&str>,
        include_payload: bool,
        config: &LiveConfig,
    ) -> Result<Self, StreamError> {
        let source = LiveSource::open(interface, config)?;
        Ok(Self::new(source, protocol, include_payload))
    }
}

impl PacketStream<FileSource> {
    /// Open a stream over a previously saved capture file.
    ///
    /// The file is opened eagerly; unreadable or unrecognized files surface
    /// here, not at the first read.
    pub fn offline(
        path: &Path,
        protocol: Option<&str>,
        include_payload: bool,
    ) -> Result<Self, StreamError> {
        let source = FileSource::open(path)?;
        Ok(Self::new(source, protocol, include_payload))
    }
}
