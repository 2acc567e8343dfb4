//! TLS certificate expiry

use crate::checks::address::{normalize_address, NormalizedAddress};
use crate::checks::ssl::{CertificateFetcher, LeafCertificate, TlsFetcher};
use crate::config::TlsSettings;
use crate::models::resource::{ExpiringResource, Resolution};
use crate::utils::{is_dns_name, Result, SpiryError};
use chrono::{DateTime, Utc};

/// A TLS endpoint whose leaf certificate expiry can be looked up
pub struct Certificate<F = TlsFetcher> {
    address: NormalizedAddress,
    name: Option<String>,
    fetcher: F,
    leaf: Resolution<LeafCertificate>,
}

impl Certificate<TlsFetcher> {
    /// Create a certificate lookup for `address` with default TLS settings
    pub fn new(address: &str) -> Result<Self> {
        Self::with_fetcher(address, None, TlsFetcher::default())
    }

    /// Create a certificate lookup presenting `name` for SNI instead of
    /// the address's host
    pub fn with_name(name: &str, address: &str) -> Result<Self> {
        Self::with_fetcher(address, Some(name), TlsFetcher::default())
    }

    pub fn from_settings(address: &str, name: Option<&str>, settings: &TlsSettings) -> Result<Self> {
        Self::with_fetcher(address, name, TlsFetcher::new(settings))
    }
}

impl<F: CertificateFetcher> Certificate<F> {
    /// Create a certificate lookup that handshakes through `fetcher`.
    ///
    /// An explicit `name` is validated before the address is parsed.
    pub fn with_fetcher(address: &str, name: Option<&str>, fetcher: F) -> Result<Self> {
        let name = match name.filter(|n| !n.is_empty()) {
            Some(name) if is_dns_name(name) => Some(name.to_string()),
            Some(name) => {
                tracing::debug!("invalid DNS name given: {:?}", name);
                return Err(SpiryError::InvalidName {
                    name: name.to_string(),
                });
            }
            None => None,
        };

        Ok(Self {
            address: normalize_address(address)?,
            name,
            fetcher,
            leaf: Resolution::default(),
        })
    }

    /// Normalized `host:port` this certificate is fetched from
    pub fn address(&self) -> &NormalizedAddress {
        &self.address
    }

    /// The leaf certificate, once retrieved
    pub fn leaf(&self) -> Option<&LeafCertificate> {
        self.leaf.get()
    }
}

impl<F: CertificateFetcher> ExpiringResource for Certificate<F> {
    fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.address.host().to_string(),
        }
    }

    fn expiry(&mut self) -> Result<DateTime<Utc>> {
        if let Some(leaf) = self.leaf.get() {
            tracing::debug!("using cached certificate for {}", self.address);
            return Ok(leaf.not_after);
        }

        let leaf = self.fetcher.fetch_leaf(&self.address, &self.name())?;
        let not_after = leaf.not_after;
        self.leaf.resolve(leaf);
        Ok(not_after)
    }
}
