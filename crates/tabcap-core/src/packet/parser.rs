use std::net::IpAddr;

use super::LinkLayer;
use super::error::MalformedHeaderError;
use super::layout;
use super::reader::HeaderReader;

/// Decoded IP and transport fields of a single captured frame.
///
/// Ports are present only for TCP and UDP; `payload` borrows the bytes after
/// the IP header (and after the port words when ports were read).
#[derive(Debug)]
pub struct ParsedHeader<'a> {
    pub version: u8,
    pub src_host: IpAddr,
    pub dst_host: IpAddr,
    pub protocol: String,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
    pub payload: &'a [u8],
}

/// Parse the IP and transport headers of a captured frame.
///
/// `link` selects how many leading link-layer bytes to strip before the IP
/// version nibble. Truncated or unrecognizable input is a hard failure; no
/// partial decode is produced.
pub fn parse_ip_packet(
    link: LinkLayer,
    data: &[u8],
) -> Result<ParsedHeader<'_>, MalformedHeaderError> {
    let ip = strip_link_header(link, data)?;
    let reader = HeaderReader::new(ip);

    let version = reader.read_u8(layout::VERSION_OFFSET)? >> 4;
    match version {
        4 => parse_ipv4(&reader),
        6 => parse_ipv6(&reader),
        version => Err(MalformedHeaderError::UnsupportedVersion { version }),
    }
}

fn strip_link_header(link: LinkLayer, data: &[u8]) -> Result<&[u8], MalformedHeaderError> {
    let reader = HeaderReader::new(data);
    match link {
        LinkLayer::Ethernet => {
            let ethertype = reader.read_u16_be(layout::ETHERTYPE_RANGE.start)?;
            if ethertype != layout::ETHERTYPE_IPV4 && ethertype != layout::ETHERTYPE_IPV6 {
                return Err(MalformedHeaderError::NonIpFrame { ethertype });
            }
            reader.rest(layout::ETHERNET_HEADER_LEN)
        }
        LinkLayer::Null => reader.rest(layout::NULL_HEADER_LEN),
        LinkLayer::Raw => Ok(data),
    }
}

fn parse_ipv4<'a>(reader: &HeaderReader<'a>) -> Result<ParsedHeader<'a>, MalformedHeaderError> {
    let header_len =
        (reader.read_u8(layout::VERSION_OFFSET)? & layout::IPV4_IHL_MASK) as usize
            * layout::IPV4_IHL_UNIT;
    if header_len < layout::IPV4_MIN_HEADER_LEN {
        return Err(MalformedHeaderError::InvalidHeaderLength { length: header_len });
    }
    reader.require_len(header_len)?;

    let protocol = reader.read_u8(layout::IPV4_PROTOCOL_OFFSET)?;
    let src_host = IpAddr::V4(reader.read_ipv4_addr(layout::IPV4_SRC_RANGE)?);
    let dst_host = IpAddr::V4(reader.read_ipv4_addr(layout::IPV4_DST_RANGE)?);

    finish_transport(reader, 4, src_host, dst_host, protocol, header_len)
}

fn parse_ipv6<'a>(reader: &HeaderReader<'a>) -> Result<ParsedHeader<'a>, MalformedHeaderError> {
    reader.require_len(layout::IPV6_HEADER_LEN)?;

    // Extension headers are not chased; the fixed header's next-header value
    // stands in for the transport protocol.
    let protocol = reader.read_u8(layout::IPV6_NEXT_HEADER_OFFSET)?;
    let src_host = IpAddr::V6(reader.read_ipv6_addr(layout::IPV6_SRC_RANGE)?);
    let dst_host = IpAddr::V6(reader.read_ipv6_addr(layout::IPV6_DST_RANGE)?);

    finish_transport(
        reader,
        6,
        src_host,
        dst_host,
        protocol,
        layout::IPV6_HEADER_LEN,
    )
}

fn finish_transport<'a>(
    reader: &HeaderReader<'a>,
    version: u8,
    src_host: IpAddr,
    dst_host: IpAddr,
    protocol: u8,
    header_len: usize,
) -> Result<ParsedHeader<'a>, MalformedHeaderError> {
    let has_ports = protocol == layout::PROTO_TCP || protocol == layout::PROTO_UDP;

    let (src_port, dst_port, payload) = if has_ports {
        reader.require_len(header_len + layout::PORT_FIELDS_LEN)?;
        let src_port = reader.read_u16_be(header_len)?;
        let dst_port = reader.read_u16_be(header_len + 2)?;
        let payload = reader.rest(header_len + layout::PORT_FIELDS_LEN)?;
        (Some(src_port), Some(dst_port), payload)
    } else {
        (None, None, reader.rest(header_len)?)
    };

    Ok(ParsedHeader {
        version,
        src_host,
        dst_host,
        protocol: protocol_label(protocol),
        src_port,
        dst_port,
        payload,
    })
}

/// Human-readable protocol name, or the raw number rendered in decimal.
fn protocol_label(value: u8) -> String {
    match value {
        layout::PROTO_ICMP => "icmp".to_string(),
        layout::PROTO_IGMP => "igmp".to_string(),
        layout::PROTO_TCP => "tcp".to_string(),
        layout::PROTO_UDP => "udp".to_string(),
        layout::PROTO_ICMPV6 => "icmpv6".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_ip_packet, protocol_label};
    use crate::packet::LinkLayer;
    use crate::packet::error::MalformedHeaderError;
    use crate::packet::layout;

    /// Minimal IPv4 header with a 20-byte header length.
    fn ipv4_frame(protocol: u8, extra: &[u8]) -> Vec<u8> {
        let mut frame = vec![0u8; layout::IPV4_MIN_HEADER_LEN];
        frame[0] = 0x45;
        frame[layout::IPV4_PROTOCOL_OFFSET] = protocol;
        frame[layout::IPV4_SRC_RANGE].copy_from_slice(&[10, 0, 0, 1]);
        frame[layout::IPV4_DST_RANGE].copy_from_slice(&[10, 0, 0, 2]);
        frame.extend_from_slice(extra);
        frame
    }

    #[test]
    fn parse_ipv4_tcp_ports_and_payload() {
        let mut transport = Vec::new();
        transport.extend_from_slice(&443u16.to_be_bytes());
        transport.extend_from_slice(&51000u16.to_be_bytes());
        transport.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let frame = ipv4_frame(layout::PROTO_TCP, &transport);

        let parsed = parse_ip_packet(LinkLayer::Raw, &frame).unwrap();
        assert_eq!(parsed.version, 4);
        assert_eq!(parsed.src_host.to_string(), "10.0.0.1");
        assert_eq!(parsed.dst_host.to_string(), "10.0.0.2");
        assert_eq!(parsed.protocol, "tcp");
        assert_eq!(parsed.src_port, Some(443));
        assert_eq!(parsed.dst_port, Some(51000));
        assert_eq!(parsed.payload, &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn parse_ipv4_icmp_has_no_ports() {
        let frame = ipv4_frame(layout::PROTO_ICMP, &[8, 0, 0x12, 0x34]);

        let parsed = parse_ip_packet(LinkLayer::Raw, &frame).unwrap();
        assert_eq!(parsed.protocol, "icmp");
        assert_eq!(parsed.src_port, None);
        assert_eq!(parsed.dst_port, None);
        assert_eq!(parsed.payload, &[8, 0, 0x12, 0x34]);
    }

    #[test]
    fn parse_ipv4_options_shift_payload() {
        // IHL of 6 words: 24-byte header, 4 bytes of options.
        let mut frame = vec![0u8; 24];
        frame[0] = 0x46;
        frame[layout::IPV4_PROTOCOL_OFFSET] = layout::PROTO_UDP;
        frame[layout::IPV4_SRC_RANGE].copy_from_slice(&[172, 16, 0, 1]);
        frame[layout::IPV4_DST_RANGE].copy_from_slice(&[172, 16, 0, 2]);
        frame.extend_from_slice(&6454u16.to_be_bytes());
        frame.extend_from_slice(&6454u16.to_be_bytes());
        frame.extend_from_slice(&[1, 2, 3]);

        let parsed = parse_ip_packet(LinkLayer::Raw, &frame).unwrap();
        assert_eq!(parsed.src_port, Some(6454));
        assert_eq!(parsed.payload, &[1, 2, 3]);
    }

    #[test]
    fn parse_ipv4_truncated_below_declared_header_len() {
        // Declares a 24-byte header but only 20 bytes are present.
        let mut frame = vec![0u8; layout::IPV4_MIN_HEADER_LEN];
        frame[0] = 0x46;

        let err = parse_ip_packet(LinkLayer::Raw, &frame).unwrap_err();
        assert!(matches!(
            err,
            MalformedHeaderError::TooShort {
                needed: 24,
                actual: 20
            }
        ));
    }

    #[test]
    fn parse_ipv4_invalid_ihl() {
        let mut frame = vec![0u8; layout::IPV4_MIN_HEADER_LEN];
        frame[0] = 0x44;

        let err = parse_ip_packet(LinkLayer::Raw, &frame).unwrap_err();
        assert!(matches!(
            err,
            MalformedHeaderError::InvalidHeaderLength { length: 16 }
        ));
    }

    #[test]
    fn parse_ipv4_tcp_missing_port_words() {
        let frame = ipv4_frame(layout::PROTO_TCP, &[0x01, 0xbb]);

        let err = parse_ip_packet(LinkLayer::Raw, &frame).unwrap_err();
        assert!(matches!(err, MalformedHeaderError::TooShort { .. }));
    }

    #[test]
    fn parse_ipv6_udp() {
        let mut frame = vec![0u8; layout::IPV6_HEADER_LEN];
        frame[0] = 0x60;
        frame[layout::IPV6_NEXT_HEADER_OFFSET] = layout::PROTO_UDP;
        frame[layout::IPV6_SRC_RANGE.start + 15] = 1;
        frame[layout::IPV6_DST_RANGE.start + 15] = 2;
        frame.extend_from_slice(&5353u16.to_be_bytes());
        frame.extend_from_slice(&5353u16.to_be_bytes());
        frame.extend_from_slice(&[0xaa]);

        let parsed = parse_ip_packet(LinkLayer::Raw, &frame).unwrap();
        assert_eq!(parsed.version, 6);
        assert_eq!(parsed.src_host.to_string(), "::1");
        assert_eq!(parsed.dst_host.to_string(), "::2");
        assert_eq!(parsed.protocol, "udp");
        assert_eq!(parsed.src_port, Some(5353));
        assert_eq!(parsed.payload, &[0xaa]);
    }

    #[test]
    fn parse_ipv6_truncated_fixed_header() {
        let mut frame = vec![0u8; layout::IPV6_HEADER_LEN - 1];
        frame[0] = 0x60;

        let err = parse_ip_packet(LinkLayer::Raw, &frame).unwrap_err();
        assert!(matches!(err, MalformedHeaderError::TooShort { .. }));
    }

    #[test]
    fn parse_unknown_version() {
        let frame = [0x50u8; layout::IPV4_MIN_HEADER_LEN];

        let err = parse_ip_packet(LinkLayer::Raw, &frame).unwrap_err();
        assert!(matches!(
            err,
            MalformedHeaderError::UnsupportedVersion { version: 5 }
        ));
    }

    #[test]
    fn parse_ethernet_strips_link_header() {
        let builder = etherparse::PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
            .ipv4([192, 168, 0, 1], [192, 168, 0, 2], 64)
            .udp(6454, 6455);
        let payload = [9u8, 8, 7];
        let mut frame = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut frame, &payload).unwrap();

        let parsed = parse_ip_packet(LinkLayer::Ethernet, &frame).unwrap();
        assert_eq!(parsed.src_host.to_string(), "192.168.0.1");
        assert_eq!(parsed.dst_host.to_string(), "192.168.0.2");
        assert_eq!(parsed.src_port, Some(6454));
        assert_eq!(parsed.dst_port, Some(6455));
        // Payload excludes only the port words; the remaining UDP header
        // bytes (length, checksum) stay in front of the datagram body.
        assert_eq!(&parsed.payload[4..], &payload);
    }

    #[test]
    fn parse_ethernet_rejects_non_ip_ethertype() {
        let mut frame = vec![0u8; layout::ETHERNET_HEADER_LEN + 28];
        frame[layout::ETHERTYPE_RANGE].copy_from_slice(&0x0806u16.to_be_bytes());

        let err = parse_ip_packet(LinkLayer::Ethernet, &frame).unwrap_err();
        assert!(matches!(
            err,
            MalformedHeaderError::NonIpFrame { ethertype: 0x0806 }
        ));
    }

    #[test]
    fn protocol_label_falls_back_to_decimal() {
        assert_eq!(protocol_label(6), "tcp");
        assert_eq!(protocol_label(58), "icmpv6");
        assert_eq!(protocol_label(89), "89");
    }
}
