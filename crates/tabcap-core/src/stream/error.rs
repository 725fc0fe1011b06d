use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised by a capture source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("capture error: {0}")]
    Capture(#[from] pcap::Error),
    #[error("unsupported link type: {name}")]
    UnsupportedLinkType { name: String },
}

/// Stream-level failures.
///
/// Unlike a malformed frame, any of these aborts the capture run; no partial
/// table is returned.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("table error: {0}")]
    Table(#[from] ArrowError),
}
