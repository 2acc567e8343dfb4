//! Address normalization
//!
//! Turns a free-form address (bare hostname or IP, `host:port` pair, or
//! URL) into a canonical `host:port` suitable for dialing.

use crate::utils::validation::{is_dns_name, parse_ip, parse_port};
use crate::utils::{Result, SpiryError};
use std::fmt;
use std::net::IpAddr;
use url::{Host, Url};

/// Port appended to bare hostnames and IP literals
pub const DEFAULT_TLS_PORT: u16 = 443;

/// Well-known service ports, looked up by URL scheme when no port is given
const SCHEME_PORTS: &[(&str, u16)] = &[
    ("https", 443),
    ("http", 80),
    ("wss", 443),
    ("ws", 80),
    ("ftps", 990),
    ("ftp", 21),
    ("imaps", 993),
    ("imap", 143),
    ("pop3s", 995),
    ("pop3", 110),
    ("smtps", 465),
    ("submissions", 465),
    ("submission", 587),
    ("smtp", 25),
    ("ldaps", 636),
    ("ldap", 389),
    ("ircs", 6697),
    ("irc", 6667),
    ("xmpp-client", 5222),
    ("xmpp-server", 5269),
    ("nntps", 563),
    ("telnets", 992),
    ("sips", 5061),
    ("postgresql", 5432),
    ("mysql", 3306),
    ("redis", 6379),
    ("rediss", 6380),
    ("amqps", 5671),
    ("mqtts", 8883),
];

/// Resolve a URL scheme to its standard port
pub fn scheme_port(scheme: &str) -> Option<u16> {
    let scheme = scheme.to_ascii_lowercase();
    SCHEME_PORTS
        .iter()
        .find(|(name, _)| *name == scheme)
        .map(|(_, port)| *port)
}

/// A validated `host:port` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAddress {
    host: String,
    port: u16,
}

impl NormalizedAddress {
    /// Hostname or IP literal, without IPv6 brackets
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn from_parts(host: &str, port: u16) -> Option<Self> {
        if port == 0 {
            return None;
        }
        let host = host.strip_suffix('.').unwrap_or(host);
        if let Some(ip) = parse_ip(host) {
            return Some(Self {
                host: ip.to_string(),
                port,
            });
        }
        if is_dns_name(host) {
            return Some(Self {
                host: host.to_ascii_lowercase(),
                port,
            });
        }
        None
    }
}

impl fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => write!(f, "[{}]:{}", self.host, self.port),
            _ => write!(f, "{}:{}", self.host, self.port),
        }
    }
}

/// Strategies in the order they are attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Url,
    DefaultPort,
    HostPort,
}

impl Strategy {
    fn label(self) -> &'static str {
        match self {
            Strategy::Url => "URL",
            Strategy::DefaultPort => "host with default port",
            Strategy::HostPort => "host:port pair",
        }
    }
}

/// Normalize `address` into a canonical `host:port`.
///
/// URL parsing runs first so a scheme's colon is never read as a port
/// separator. Bare names get the default TLS port before anything tries
/// to split the raw string as `host:port`.
pub fn normalize_address(address: &str) -> Result<NormalizedAddress> {
    let input = address.trim();
    let mut attempted = Vec::new();

    for strategy in [Strategy::Url, Strategy::DefaultPort, Strategy::HostPort] {
        let parsed = match strategy {
            Strategy::Url => parse_as_url(input),
            Strategy::DefaultPort => parse_with_default_port(input),
            Strategy::HostPort => parse_as_host_port(input),
        };

        match parsed {
            Some(normalized) => {
                tracing::debug!(
                    "parsed address {:?} as {} via {}",
                    address,
                    normalized,
                    strategy.label()
                );
                return Ok(normalized);
            }
            None => {
                tracing::debug!(
                    "address {:?} is not a valid {}",
                    address,
                    strategy.label()
                );
                attempted.push(strategy.label());
            }
        }
    }

    Err(SpiryError::AddressParse {
        address: address.to_string(),
        attempted: attempted.join(", "),
    })
}

fn parse_as_url(input: &str) -> Option<NormalizedAddress> {
    let url = Url::parse(input).ok()?;

    // "example.com:8443" parses as scheme "example.com" with no host
    let host = match url.host()? {
        Host::Domain(domain) => domain.to_string(),
        Host::Ipv4(ip) => ip.to_string(),
        Host::Ipv6(ip) => ip.to_string(),
    };

    let port = match url.port() {
        Some(port) => port,
        None => scheme_port(url.scheme())?,
    };

    NormalizedAddress::from_parts(&host, port)
}

fn parse_with_default_port(input: &str) -> Option<NormalizedAddress> {
    let host = input.strip_suffix('.').unwrap_or(input);
    if !is_dns_name(host) && parse_ip(host).is_none() {
        return None;
    }

    NormalizedAddress::from_parts(host, DEFAULT_TLS_PORT)
}

fn parse_as_host_port(input: &str) -> Option<NormalizedAddress> {
    let (host, port) = input.rsplit_once(':')?;

    // an unbracketed IPv6 literal has more than one colon and no usable port
    if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
        return None;
    }

    let port = parse_port(port)?;
    NormalizedAddress::from_parts(host, port)
}
