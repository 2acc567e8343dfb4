//! Lookup building blocks for spiry
//!
//! Address normalization, public suffix resolution, WHOIS, and TLS.

pub mod address;
pub mod ssl;
pub mod suffix;
pub mod whois;

pub use address::{normalize_address, NormalizedAddress};
pub use ssl::{CertificateFetcher, LeafCertificate, TlsFetcher};
pub use suffix::{SuffixResolver, INCOMPLETE_TLDS};
pub use whois::{TcpWhoisClient, WhoisTransport, IANA_WHOIS_SERVER};
