//! Data models for spiry
//!
//! The two kinds of expiring resource and the capability they share.

pub mod certificate;
pub mod domain;
pub mod resource;

pub use certificate::Certificate;
pub use domain::Domain;
pub use resource::{ExpiringResource, Resolution};
