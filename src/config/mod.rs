//! Configuration module for spiry
//!
//! Handles loading settings from TOML files.

pub mod settings;

pub use settings::{Settings, TlsSettings, WhoisSettings};
