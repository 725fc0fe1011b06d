use thiserror::Error;

/// Errors returned by IP header decoding.
///
/// Any of these means the whole frame is undecodable; the stream layer drops
/// the frame and keeps reading.
#[derive(Debug, Error)]
pub enum MalformedHeaderError {
    #[error("frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("unsupported IP version: {version}")]
    UnsupportedVersion { version: u8 },
    #[error("invalid IPv4 header length: {length} bytes")]
    InvalidHeaderLength { length: usize },
    #[error("not an IP frame: ethertype {ethertype:#06x}")]
    NonIpFrame { ethertype: u16 },
}
