pub const ETHERNET_HEADER_LEN: usize = 14;
pub const ETHERTYPE_RANGE: std::ops::Range<usize> = 12..14;
pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_IPV6: u16 = 0x86DD;
pub const NULL_HEADER_LEN: usize = 4;

pub const VERSION_OFFSET: usize = 0;

pub const IPV4_MIN_HEADER_LEN: usize = 20;
pub const IPV4_IHL_MASK: u8 = 0x0F;
pub const IPV4_IHL_UNIT: usize = 4;
pub const IPV4_PROTOCOL_OFFSET: usize = 9;
pub const IPV4_SRC_RANGE: std::ops::Range<usize> = 12..16;
pub const IPV4_DST_RANGE: std::ops::Range<usize> = 16..20;

pub const IPV6_HEADER_LEN: usize = 40;
pub const IPV6_NEXT_HEADER_OFFSET: usize = 6;
pub const IPV6_SRC_RANGE: std::ops::Range<usize> = 8..24;
pub const IPV6_DST_RANGE: std::ops::Range<usize> = 24..40;

/// Source and destination port words trailing the IP header (TCP/UDP).
pub const PORT_FIELDS_LEN: usize = 4;

pub const PROTO_ICMP: u8 = 1;
pub const PROTO_IGMP: u8 = 2;
pub const PROTO_TCP: u8 = 6;
pub const PROTO_UDP: u8 = 17;
pub const PROTO_ICMPV6: u8 = 58;
