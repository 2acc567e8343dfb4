//! WHOIS lookup functionality
//!
//! Single plain-text queries through the `whois-rust` crate, TLD
//! delegation through a root authority, and heuristic classification of
//! free-form responses.

use crate::config::WhoisSettings;
use crate::utils::{parse_expiry_date, Result, SpiryError};
use chrono::{DateTime, Utc};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use whois_rust::{WhoIs, WhoIsLookupOptions, WhoIsServerValue};

/// The canonical root-level WHOIS authority
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

pub const WHOIS_PORT: u16 = 43;

/// Server table handed to `whois-rust`. Every query names its server, so
/// only the mandatory IP fallback entry is present.
const SERVERS_JSON: &str = r#"{"_": {"ip": {"host": "whois.arin.net", "query": "n + $addr\r\n"}}}"#;

/// Labels under which registries publish the expiration date
const EXPIRY_LABELS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expire date",
    "expires",
    "expires on",
    "expire",
    "expiration time",
    "paid-till",
    "valid until",
    "renewal date",
    "domain expiration date",
    "domain expires",
    "record expires on",
];

const NOT_FOUND_MARKERS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "no object found",
    "no matching record",
    "domain not found",
    "status: free",
    "status: available",
    "is available for registration",
];

const RESERVED_MARKERS: &[&str] = &[
    "reserved domain",
    "reserved by the registry",
    "registry reserved",
    "has been reserved",
    "the domain is reserved",
    "this name is reserved",
    "status: reserved",
];

/// A transport able to send a single WHOIS query.
pub trait WhoisTransport {
    /// Send `query` to `server` and return the full textual response
    fn query(&self, server: &str, query: &str) -> Result<String>;
}

impl<T: WhoisTransport + ?Sized> WhoisTransport for &T {
    fn query(&self, server: &str, query: &str) -> Result<String> {
        (**self).query(server, query)
    }
}

/// Blocking WHOIS client sending one query per server, without
/// following referrals
#[derive(Debug, Clone)]
pub struct TcpWhoisClient {
    port: u16,
    timeout: Duration,
}

impl TcpWhoisClient {
    /// Create a new WHOIS client on the standard port
    pub fn new(timeout: Duration) -> Self {
        Self {
            port: WHOIS_PORT,
            timeout,
        }
    }

    pub fn from_settings(settings: &WhoisSettings) -> Self {
        Self {
            port: settings.port,
            timeout: settings.timeout(),
        }
    }

    /// Port used for servers given without one
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `server` as a dialable `host:port`; servers carrying a port are kept
    fn target(&self, server: &str) -> String {
        if server.parse::<SocketAddr>().is_ok() {
            return server.to_string();
        }
        if let Ok(IpAddr::V6(ip)) = server.parse::<IpAddr>() {
            return format!("[{}]:{}", ip, self.port);
        }
        match server.rsplit_once(':') {
            Some((_, port)) if port.parse::<u16>().is_ok() => server.to_string(),
            _ => format!("{}:{}", server, self.port),
        }
    }

    fn lookup(&self, target: &str, query: &str) -> std::result::Result<String, String> {
        let whois = WhoIs::from_string(SERVERS_JSON)
            .map_err(|e| format!("failed to load WHOIS servers: {e}"))?;

        let mut options = WhoIsLookupOptions::from_string(query)
            .map_err(|e| format!("invalid query: {e}"))?;
        options.server = Some(
            WhoIsServerValue::from_string(target)
                .map_err(|e| format!("invalid server: {e}"))?,
        );
        options.follow = 0;
        options.timeout = Some(self.timeout);

        whois.lookup(options).map_err(|e| e.to_string())
    }
}

impl WhoisTransport for TcpWhoisClient {
    fn query(&self, server: &str, query: &str) -> Result<String> {
        let target = self.target(server);
        tracing::debug!("querying {} for {:?}", target, query);

        self.lookup(&target, query)
            .map_err(|message| SpiryError::WhoisTransport {
                server: server.to_string(),
                query: query.to_string(),
                message,
            })
    }
}

impl Default for TcpWhoisClient {
    fn default() -> Self {
        Self::from_settings(&WhoisSettings::default())
    }
}

/// Ask `root_server` which WHOIS server is authoritative for `tld`
pub fn lookup_delegation<T: WhoisTransport + ?Sized>(
    transport: &T,
    root_server: &str,
    tld: &str,
) -> Result<String> {
    let response = transport.query(root_server, tld)?;
    if response.trim().is_empty() {
        return Err(SpiryError::WhoisParse {
            domain: tld.to_string(),
            message: format!("empty response from {root_server}"),
        });
    }

    match extract_delegated_server(&response) {
        Some(server) => {
            tracing::debug!("WHOIS server for eTLD {} is {}", tld, server);
            Ok(server)
        }
        None => Err(SpiryError::DelegationNotFound {
            tld: tld.to_string(),
            server: root_server.to_string(),
        }),
    }
}

/// The delegated server from a root authority response: the `whois:`
/// field, or `refer:` when that is missing
pub fn extract_delegated_server(response: &str) -> Option<String> {
    field_value(response, &["whois"]).or_else(|| field_value(response, &["refer"]))
}

/// What a transport-successful WHOIS response says about a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Registered,
    NotFound,
    Reserved,
}

/// Classify a response body by its human-readable markers
pub fn classify_response(response: &str) -> RecordStatus {
    let lower = response.to_lowercase();
    if RESERVED_MARKERS.iter().any(|m| lower.contains(m)) {
        RecordStatus::Reserved
    } else if NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m)) {
        RecordStatus::NotFound
    } else {
        RecordStatus::Registered
    }
}

/// The raw expiration date text from a WHOIS record
pub fn extract_expiry_field(response: &str) -> Option<String> {
    field_value(response, EXPIRY_LABELS)
}

/// Classify `response` for `domain` and read its expiration date
pub fn parse_expiry(domain: &str, response: &str) -> Result<DateTime<Utc>> {
    match classify_response(response) {
        RecordStatus::NotFound => {
            return Err(SpiryError::DomainNotFound {
                domain: domain.to_string(),
            })
        }
        RecordStatus::Reserved => {
            return Err(SpiryError::ReservedDomain {
                domain: domain.to_string(),
            })
        }
        RecordStatus::Registered => {}
    }

    let raw = extract_expiry_field(response).ok_or_else(|| SpiryError::WhoisParse {
        domain: domain.to_string(),
        message: "no expiration date field".to_string(),
    })?;

    parse_expiry_date(&raw).ok_or_else(|| {
        tracing::debug!("unparseable expiration date {:?} for {}", raw, domain);
        SpiryError::WhoisParse {
            domain: domain.to_string(),
            message: format!("unrecognized expiration date {raw:?}"),
        }
    })
}

/// First non-empty value whose label matches one of `labels`.
/// Labels compare case-insensitively and tolerate space before the colon.
fn field_value(response: &str, labels: &[&str]) -> Option<String> {
    response.lines().find_map(|line| {
        let line = line.trim();
        if line.starts_with('%') || line.starts_with('#') {
            return None;
        }
        let (label, value) = line.split_once(':')?;
        let label = label.trim().to_lowercase();
        let value = value.trim();
        (labels.contains(&label.as_str()) && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const IANA_COM: &str = "\
% IANA WHOIS server
% for more information on IANA, visit http://www.iana.org

refer:        whois.verisign-grs.com

domain:       COM

organisation: VeriSign Global Registry Services
whois:        whois.verisign-grs.com

status:       ACTIVE
";

    const VERISIGN_RECORD: &str = "\
   Domain Name: EXAMPLE.COM
   Registry Domain ID: 2336799_DOMAIN_COM-VRSN
   Registrar WHOIS Server: whois.iana.org
   Updated Date: 2024-08-14T07:01:34Z
   Creation Date: 1995-08-14T04:00:00Z
   Registry Expiry Date: 2025-08-13T04:00:00Z
   Registrar: RESERVED-Internet Assigned Numbers Authority
>>> Last update of whois database: 2024-10-01T12:00:00Z <<<
";

    #[test]
    fn test_extract_delegated_server() {
        assert_eq!(
            extract_delegated_server(IANA_COM),
            Some("whois.verisign-grs.com".to_string())
        );
        assert_eq!(
            extract_delegated_server("refer: whois.nic.uk\n"),
            Some("whois.nic.uk".to_string())
        );
        assert_eq!(extract_delegated_server("domain: LOCAL\nwhois:\n"), None);
    }

    #[test]
    fn test_classify_response() {
        assert_eq!(classify_response(VERISIGN_RECORD), RecordStatus::Registered);
        assert_eq!(
            classify_response("No match for \"NO-SUCH-EXAMPLE.COM\".\r\n"),
            RecordStatus::NotFound
        );
        assert_eq!(classify_response("Status: AVAILABLE\n"), RecordStatus::NotFound);
        assert_eq!(
            classify_response("Domain Name: nic.xyz\nThis name is reserved by the Registry\n"),
            RecordStatus::Reserved
        );
    }

    #[test]
    fn test_extract_expiry_field_variants() {
        assert_eq!(
            extract_expiry_field(VERISIGN_RECORD),
            Some("2025-08-13T04:00:00Z".to_string())
        );
        assert_eq!(
            extract_expiry_field("    Expiry date:  14-Aug-2025\n"),
            Some("14-Aug-2025".to_string())
        );
        assert_eq!(
            extract_expiry_field("paid-till:     2025-03-04T21:00:00Z\n"),
            Some("2025-03-04T21:00:00Z".to_string())
        );
        assert_eq!(
            extract_expiry_field("Expiration Date : 2025. 08. 14.\n"),
            Some("2025. 08. 14.".to_string())
        );
        assert_eq!(
            extract_expiry_field("Registrar Registration Expiration Date:\nExpires: 2026-01-01\n"),
            Some("2026-01-01".to_string())
        );
        assert_eq!(extract_expiry_field("% Expires: 2026-01-01\n"), None);
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(
            parse_expiry("example.com", VERISIGN_RECORD).unwrap(),
            Utc.with_ymd_and_hms(2025, 8, 13, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_expiry_errors() {
        assert!(matches!(
            parse_expiry("no-such-example.com", "No match for \"NO-SUCH-EXAMPLE.COM\".\n"),
            Err(SpiryError::DomainNotFound { .. })
        ));
        assert!(matches!(
            parse_expiry("example.com", "Domain Name: EXAMPLE.COM\n"),
            Err(SpiryError::WhoisParse { .. })
        ));
        assert!(matches!(
            parse_expiry("example.com", "Registry Expiry Date: someday\n"),
            Err(SpiryError::WhoisParse { .. })
        ));
    }

    #[test]
    fn test_target_address() {
        let client = TcpWhoisClient::new(Duration::from_secs(1)).with_port(4343);
        assert_eq!(client.target("whois.iana.org"), "whois.iana.org:4343");
        assert_eq!(client.target("127.0.0.1"), "127.0.0.1:4343");
        assert_eq!(client.target("127.0.0.1:43"), "127.0.0.1:43");
        assert_eq!(client.target("::1"), "[::1]:4343");
        assert_eq!(client.target("[::1]:43"), "[::1]:43");
    }

    #[test]
    fn test_unreachable_server() {
        let client = TcpWhoisClient::new(Duration::from_millis(500));
        // Port 1 is typically not open
        let err = client.query("127.0.0.1:1", "example.com").unwrap_err();
        assert!(matches!(err, SpiryError::WhoisTransport { .. }));
    }
}
