//! Domain registration expiry
//!
//! A `Domain` resolves its expiration date by walking public suffix
//! data, TLD delegation at the root WHOIS authority, and finally the
//! delegated registry's own record.

use crate::checks::suffix::SuffixResolver;
use crate::checks::whois::{lookup_delegation, parse_expiry, TcpWhoisClient, WhoisTransport};
use crate::checks::IANA_WHOIS_SERVER;
use crate::config::WhoisSettings;
use crate::models::resource::{ExpiringResource, Resolution};
use crate::utils::{is_dns_name, Result, SpiryError};
use chrono::{DateTime, Utc};

/// A fully-qualified domain name whose registration expiry can be looked up
pub struct Domain<T = TcpWhoisClient> {
    name: String,
    whois_server: Option<String>,
    root_server: String,
    transport: T,
    suffixes: SuffixResolver,
    etld: Resolution<String>,
    root: Resolution<String>,
    delegated_server: Resolution<String>,
    expiry: Resolution<DateTime<Utc>>,
}

impl Domain<TcpWhoisClient> {
    /// Create a domain using the default WHOIS settings
    pub fn new(name: &str) -> Result<Self> {
        Self::from_settings(name, &WhoisSettings::default())
    }

    pub fn from_settings(name: &str, settings: &WhoisSettings) -> Result<Self> {
        Ok(Self::with_transport(name, TcpWhoisClient::from_settings(settings))?
            .with_root_server(&settings.root_server))
    }
}

impl<T: WhoisTransport> Domain<T> {
    /// Create a domain that queries through `transport`.
    ///
    /// The name is lowercased and converted to its ASCII form, and must
    /// be a valid DNS name.
    pub fn with_transport(name: &str, transport: T) -> Result<Self> {
        let lowered = name.trim().to_lowercase();
        let ascii = idna::domain_to_ascii(&lowered).unwrap_or_default();
        if !is_dns_name(&ascii) {
            tracing::debug!("invalid DNS name given: {:?}", name);
            return Err(SpiryError::InvalidName {
                name: name.to_string(),
            });
        }

        Ok(Self {
            name: ascii.trim_end_matches('.').to_string(),
            whois_server: None,
            root_server: IANA_WHOIS_SERVER.to_string(),
            transport,
            suffixes: SuffixResolver::new(),
            etld: Resolution::default(),
            root: Resolution::default(),
            delegated_server: Resolution::default(),
            expiry: Resolution::default(),
        })
    }

    /// Query `server` directly instead of discovering it through delegation
    pub fn with_whois_server(mut self, server: impl Into<String>) -> Self {
        let server = server.into();
        self.whois_server = (!server.is_empty()).then_some(server);
        self
    }

    /// Root authority asked for TLD delegation
    pub fn with_root_server(mut self, server: impl Into<String>) -> Self {
        self.root_server = server.into();
        self
    }

    pub fn whois_server(&self) -> Option<&str> {
        self.whois_server.as_deref()
    }

    /// Effective TLD, required to be ICANN-managed
    pub fn effective_tld(&mut self) -> Result<String> {
        if let Some(etld) = self.etld.get() {
            return Ok(etld.clone());
        }
        let etld = self.suffixes.effective_tld(&self.name)?;
        self.etld.resolve(etld.clone());
        Ok(etld)
    }

    /// Registrable root domain (`example.com` for `www.example.com`)
    pub fn root(&mut self) -> Result<String> {
        if let Some(root) = self.root.get() {
            return Ok(root.clone());
        }
        let root = self.suffixes.root(&self.name)?;
        self.root.resolve(root.clone());
        Ok(root)
    }

    /// The WHOIS server authoritative for this domain's eTLD
    pub fn delegated_server(&mut self) -> Result<String> {
        if let Some(server) = &self.whois_server {
            return Ok(server.clone());
        }
        if let Some(server) = self.delegated_server.get() {
            return Ok(server.clone());
        }

        let etld = self.effective_tld()?;
        let server = lookup_delegation(&self.transport, &self.root_server, &etld)?;
        self.delegated_server.resolve(server.clone());
        Ok(server)
    }

    fn resolve_expiry(&mut self) -> Result<DateTime<Utc>> {
        // ensure this is not a private or invalid domain
        self.effective_tld()?;

        // query the registrable root, not a subdomain
        let root = self.root()?;
        let server = self.delegated_server()?;

        tracing::debug!("looking up {} at {}", root, server);
        let record = self.transport.query(&server, &root)?;
        parse_expiry(&root, &record)
    }
}

impl<T: WhoisTransport> ExpiringResource for Domain<T> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn expiry(&mut self) -> Result<DateTime<Utc>> {
        if let Some(expiry) = self.expiry.get() {
            tracing::debug!("using cached expiry for {}", self.name);
            return Ok(*expiry);
        }

        let expiry = self.resolve_expiry()?;
        self.expiry.resolve(expiry);
        Ok(expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl WhoisTransport for Unreachable {
        fn query(&self, server: &str, _query: &str) -> Result<String> {
            panic!("unexpected WHOIS query to {server}");
        }
    }

    #[test]
    fn test_name_is_lowercased() {
        let domain = Domain::with_transport("WWW.Example.COM", Unreachable).unwrap();
        assert_eq!(domain.name(), "www.example.com");
    }

    #[test]
    fn test_unicode_name_is_converted_to_ascii() {
        let domain = Domain::with_transport("münchen.de", Unreachable).unwrap();
        assert_eq!(domain.name(), "xn--mnchen-3ya.de");
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        for name in ["", "sanford&son.example.com", "not a domain!!", "-bad.example.com"] {
            assert!(
                matches!(
                    Domain::with_transport(name, Unreachable),
                    Err(SpiryError::InvalidName { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_root_and_etld_need_no_network() {
        let mut domain = Domain::with_transport("subdomain.mckern.sh", Unreachable).unwrap();
        assert_eq!(domain.root().unwrap(), "mckern.sh");
        assert_ne!(domain.root().unwrap(), domain.name());
        assert_eq!(domain.effective_tld().unwrap(), "sh");
    }

    #[test]
    fn test_server_override_skips_delegation() {
        let mut domain = Domain::with_transport("example.com", Unreachable)
            .unwrap()
            .with_whois_server("whois.example.net");
        assert_eq!(domain.whois_server(), Some("whois.example.net"));
        assert_eq!(domain.delegated_server().unwrap(), "whois.example.net");
    }

    #[test]
    fn test_unmanaged_domain_fails_before_any_query() {
        let mut domain = Domain::with_transport("someone.github.io", Unreachable).unwrap();
        assert!(matches!(
            domain.expiry(),
            Err(SpiryError::UnmanagedDomain { .. })
        ));
    }
}
