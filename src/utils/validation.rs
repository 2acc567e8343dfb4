//! Syntax validators for DNS names, IP literals, and ports

use std::net::IpAddr;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Check that `name` is a syntactically valid DNS name.
///
/// Labels are 1-63 octets of ASCII letters, digits, and hyphens, never
/// starting or ending with a hyphen; the whole name is at most 253 octets.
/// A single trailing dot (the root label) is accepted.
pub fn is_dns_name(name: &str) -> bool {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }

    name.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Check that `host` is an IPv4 or IPv6 literal (brackets allowed for IPv6)
pub fn is_ip(host: &str) -> bool {
    parse_ip(host).is_some()
}

pub(crate) fn parse_ip(host: &str) -> Option<IpAddr> {
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    host.parse().ok()
}

/// Parse a TCP port, rejecting zero and anything outside 1-65535
pub fn parse_port(port: &str) -> Option<u16> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    port.parse::<u16>().ok().filter(|p| *p != 0)
}
