//! spiry library
//!
//! Resolves expiration timestamps for:
//! - Domain registrations, via public suffix data and WHOIS delegation
//! - TLS endpoints, via the leaf certificate's notAfter field
//!
//! # Usage
//!
//! ```rust,no_run
//! use spiry::models::{Certificate, Domain, ExpiringResource};
//!
//! let mut domain = Domain::new("www.example.com")?;
//! println!("{} expires {}", domain.name(), domain.expiry()?);
//!
//! let mut cert = Certificate::new("https://example.com/")?;
//! println!("{} expires {}", cert.name(), cert.expiry()?);
//! # Ok::<(), spiry::SpiryError>(())
//! ```

pub mod checks;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod output;
pub mod utils;

// Re-export commonly used types
pub use cli::Cli;
pub use config::Settings;
pub use models::{Certificate, Domain, ExpiringResource};
pub use utils::{Result, SpiryError};
