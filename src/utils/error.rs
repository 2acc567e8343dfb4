//! Custom error types for spiry
//!
//! Every variant carries the domain, address, or server that was under
//! resolution so a failure deep in a delegation chain stays traceable.

use thiserror::Error;

/// Top-level error type for expiry resolution
#[derive(Error, Debug)]
pub enum SpiryError {
    #[error("{name:?} is an invalid DNS name")]
    InvalidName { name: String },

    #[error("eTLD {suffix:?} of {domain} is not publicly managed and cannot be looked up using WHOIS")]
    UnmanagedDomain { domain: String, suffix: String },

    #[error("unable to find root domain for {domain}")]
    RootLookup { domain: String },

    #[error("no WHOIS server for eTLD {tld:?} found at {server}")]
    DelegationNotFound { tld: String, server: String },

    #[error("WHOIS request for {query} to {server} failed: {message}")]
    WhoisTransport {
        server: String,
        query: String,
        message: String,
    },

    #[error("parsing WHOIS record for {domain} failed: {message}")]
    WhoisParse { domain: String, message: String },

    #[error("domain record {domain:?} not found")]
    DomainNotFound { domain: String },

    #[error("reserved domain record {domain:?} cannot be looked up")]
    ReservedDomain { domain: String },

    #[error("cannot parse {address:?} as an address (tried {attempted})")]
    AddressParse { address: String, attempted: String },

    #[error("unable to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake with {address} failed: {message}")]
    Handshake { address: String, message: String },

    #[error("unable to parse leaf certificate: {message}")]
    InvalidCertificate { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("unable to render output: {0}")]
    Render(#[from] serde_json::Error),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },
}

/// Result type alias using SpiryError
pub type Result<T> = std::result::Result<T, SpiryError>;
