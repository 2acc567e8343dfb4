//! The shared expiring-resource capability

use crate::utils::Result;
use chrono::{DateTime, Utc};

/// Anything with a name and an expiration date that can be looked up
pub trait ExpiringResource {
    fn name(&self) -> String;

    /// Resolve the expiration timestamp; successful results are cached on
    /// the resource and repeat calls perform no further network I/O
    fn expiry(&mut self) -> Result<DateTime<Utc>>;
}

/// A value that has either been resolved or not yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Unresolved,
    Resolved(T),
}

impl<T> Resolution<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Record a successful resolution
    pub fn resolve(&mut self, value: T) {
        *self = Resolution::Resolved(value);
    }
}

impl<T> Default for Resolution<T> {
    fn default() -> Self {
        Resolution::Unresolved
    }
}
