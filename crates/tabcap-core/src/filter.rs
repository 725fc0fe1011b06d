//! Protocol-name to capture-filter translation.
//!
//! The capture source compiles BPF-dialect filter expressions; this module is
//! the single place such expressions are produced.

/// Translate an optional protocol name into a BPF filter expression.
///
/// Without a protocol the expression keeps the minimal IP scope; with one it
/// narrows to that single protocol. Protocol names that double as BPF
/// keywords (`tcp`, `udp`, `icmp`) need the backslash escape, so it is always
/// emitted.
///
/// # Examples
/// ```
/// use tabcap_core::bpf_expression;
///
/// assert_eq!(bpf_expression(None), "ip");
/// assert_eq!(bpf_expression(Some("tcp")), r"ip proto \tcp");
/// ```
pub fn bpf_expression(protocol: Option<&str>) -> String {
    match protocol {
        Some(name) => format!(r"ip proto \{name}"),
        None => "ip".to_string(),
    }
}
