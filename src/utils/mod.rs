//! Utility modules for spiry
//!
//! Error types, syntax validators, and date parsing shared by the checks.

pub mod dates;
pub mod error;
pub mod validation;

pub use dates::parse_expiry_date;
pub use error::{ConfigError, Result, SpiryError};
pub use validation::{is_dns_name, is_ip, parse_port};
