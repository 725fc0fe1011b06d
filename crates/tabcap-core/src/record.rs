//! Per-frame record construction.

use serde::Serialize;

use crate::packet::{LinkLayer, MalformedHeaderError, parse_ip_packet};

/// One captured frame as delivered by the capture source: the kernel
/// timestamp split into seconds and microseconds, plus the raw bytes.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub ts_sec: i64,
    pub ts_usec: i64,
    pub data: Vec<u8>,
}

/// One schema-conformant row derived from one frame.
///
/// `payload` is populated only for streams constructed with payload capture;
/// ports only for TCP/UDP. Field order matches the declared column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Capture time in microseconds since the Unix epoch.
    pub time: i64,
    pub src_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_port: Option<u16>,
    pub dst_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<u16>,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<u8>>,
}

/// Combine the capture timestamp halves into microseconds since the epoch.
///
/// Exact: no rounding beyond the source's own microsecond resolution.
pub fn timestamp_micros(ts_sec: i64, ts_usec: i64) -> i64 {
    ts_sec * 1_000_000 + ts_usec
}

/// Build one record from a captured frame.
///
/// Decoding failures propagate; the caller decides whether a failed frame is
/// dropped (the stream loop) or fatal.
pub fn build_record(
    frame: &RawFrame,
    link: LinkLayer,
    include_payload: bool,
) -> Result<Record, MalformedHeaderError> {
    let parsed = parse_ip_packet(link, &frame.data)?;
    Ok(Record {
        time: timestamp_micros(frame.ts_sec, frame.ts_usec),
        src_host: parsed.src_host.to_string(),
        src_port: parsed.src_port,
        dst_host: parsed.dst_host.to_string(),
        dst_port: parsed.dst_port,
        protocol: parsed.protocol,
        payload: include_payload.then(|| parsed.payload.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::{RawFrame, build_record, timestamp_micros};
    use crate::packet::LinkLayer;

    fn udp_frame(ts_sec: i64, ts_usec: i64, body: &[u8]) -> RawFrame {
        let builder = etherparse::PacketBuilder::ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .udp(4000, 4001);
        let mut data = Vec::with_capacity(builder.size(body.len()));
        builder.write(&mut data, body).unwrap();
        RawFrame {
            ts_sec,
            ts_usec,
            data,
        }
    }

    #[test]
    fn timestamp_micros_is_exact() {
        assert_eq!(timestamp_micros(0, 0), 0);
        assert_eq!(timestamp_micros(1, 500_000), 1_500_000);
        assert_eq!(timestamp_micros(1_609_459_200, 123_456), 1_609_459_200_123_456);
    }

    #[test]
    fn build_record_without_payload() {
        let frame = udp_frame(1, 500_000, &[1, 2, 3]);
        let record = build_record(&frame, LinkLayer::Raw, false).unwrap();

        assert_eq!(record.time, 1_500_000);
        assert_eq!(record.src_host, "10.0.0.1");
        assert_eq!(record.dst_host, "10.0.0.2");
        assert_eq!(record.src_port, Some(4000));
        assert_eq!(record.dst_port, Some(4001));
        assert_eq!(record.protocol, "udp");
        assert_eq!(record.payload, None);
    }

    #[test]
    fn build_record_with_payload_keeps_raw_bytes() {
        let frame = udp_frame(0, 0, &[9, 9, 9]);
        let record = build_record(&frame, LinkLayer::Raw, true).unwrap();

        let payload = record.payload.expect("payload requested");
        // Everything after the port words, so the UDP length and checksum
        // fields precede the datagram body.
        assert_eq!(payload.len(), 4 + 3);
        assert_eq!(&payload[4..], &[9, 9, 9]);
    }

    #[test]
    fn build_record_propagates_parse_failure() {
        let frame = RawFrame {
            ts_sec: 0,
            ts_usec: 0,
            data: vec![0x45, 0x00],
        };
        assert!(build_record(&frame, LinkLayer::Raw, false).is_err());
    }

    #[test]
    fn serialized_record_omits_absent_fields() {
        let builder = etherparse::PacketBuilder::ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .icmpv4_echo_request(1, 1);
        let mut data = Vec::with_capacity(builder.size(0));
        builder.write(&mut data, &[]).unwrap();
        let frame = RawFrame {
            ts_sec: 7,
            ts_usec: 0,
            data,
        };

        let record = build_record(&frame, LinkLayer::Raw, false).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["protocol"], "icmp");
        assert!(value.get("src_port").is_none());
        assert!(value.get("payload").is_none());
    }
}
