//! TLS leaf certificate retrieval
//!
//! Performs a blocking TLS handshake with certificate verification
//! disabled and reads the validity window of the peer's leaf certificate.
//! Self-signed, mismatched, and expired certificates are all retrieved.

use crate::checks::address::NormalizedAddress;
use crate::config::TlsSettings;
use crate::utils::{Result, SpiryError};
use chrono::{DateTime, TimeZone, Utc};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error as RustlsError, SignatureScheme};
use std::io::{self, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use x509_parser::prelude::*;

/// A certificate verifier that accepts any certificate.
#[derive(Debug)]
struct AcceptAnyCertVerifier;

impl ServerCertVerifier for AcceptAnyCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
            SignatureScheme::ED448,
        ]
    }
}

/// The end-entity certificate presented by a TLS peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafCertificate {
    pub subject: String,
    pub not_after: DateTime<Utc>,
}

impl LeafCertificate {
    /// Parse a DER-encoded certificate
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, cert) = X509Certificate::from_der(der).map_err(|e| SpiryError::InvalidCertificate {
            message: e.to_string(),
        })?;

        let timestamp = cert.validity().not_after.timestamp();
        let not_after = Utc.timestamp_opt(timestamp, 0).single().ok_or_else(|| {
            SpiryError::InvalidCertificate {
                message: format!("notAfter {timestamp} is out of range"),
            }
        })?;

        Ok(Self {
            subject: cert.subject().to_string(),
            not_after,
        })
    }
}

/// Retrieves the leaf certificate of a TLS endpoint
pub trait CertificateFetcher {
    /// Handshake with `address`, presenting `server_name` for SNI
    fn fetch_leaf(&self, address: &NormalizedAddress, server_name: &str) -> Result<LeafCertificate>;
}

impl<T: CertificateFetcher + ?Sized> CertificateFetcher for &T {
    fn fetch_leaf(&self, address: &NormalizedAddress, server_name: &str) -> Result<LeafCertificate> {
        (**self).fetch_leaf(address, server_name)
    }
}

/// Blocking rustls-based fetcher
#[derive(Debug, Clone)]
pub struct TlsFetcher {
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl TlsFetcher {
    /// Create a new fetcher with the given settings
    pub fn new(settings: &TlsSettings) -> Self {
        // Ensure a default crypto provider is installed
        let _ = rustls::crypto::ring::default_provider().install_default();
        Self {
            connect_timeout: settings.connect_timeout(),
            io_timeout: settings.io_timeout(),
        }
    }

    fn connect(&self, address: &NormalizedAddress) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in (address.host(), address.port()).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(sock) => return Ok(sock),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no addresses found for {address}"))
        }))
    }
}

impl Default for TlsFetcher {
    fn default() -> Self {
        Self::new(&TlsSettings::default())
    }
}

impl CertificateFetcher for TlsFetcher {
    fn fetch_leaf(&self, address: &NormalizedAddress, server_name: &str) -> Result<LeafCertificate> {
        let handshake_err = |message: String| SpiryError::Handshake {
            address: address.to_string(),
            message,
        };

        let config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertVerifier))
            .with_no_client_auth();

        let server_name = ServerName::try_from(server_name.to_string())
            .map_err(|e| handshake_err(format!("invalid server name {server_name:?}: {e}")))?;

        let mut conn = rustls::ClientConnection::new(Arc::new(config), server_name)
            .map_err(|e| handshake_err(format!("failed to create TLS connection: {e}")))?;

        tracing::debug!("connecting to {}", address);
        let mut sock = self.connect(address).map_err(|source| SpiryError::Connect {
            address: address.to_string(),
            source,
        })?;
        sock.set_read_timeout(Some(self.io_timeout))
            .and_then(|_| sock.set_write_timeout(Some(self.io_timeout)))
            .map_err(|source| SpiryError::Connect {
                address: address.to_string(),
                source,
            })?;

        // Perform TLS handshake
        let mut tls = rustls::Stream::new(&mut conn, &mut sock);
        tls.flush().map_err(|e| handshake_err(e.to_string()))?;
        if conn.is_handshaking() {
            return Err(handshake_err("handshake did not complete".to_string()));
        }

        let leaf = conn
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| handshake_err("peer presented no certificate".to_string()))?;

        let leaf = LeafCertificate::from_der(leaf.as_ref())?;
        tracing::debug!("leaf certificate {} expires {}", leaf.subject, leaf.not_after);
        Ok(leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::address::normalize_address;

    #[test]
    fn test_garbage_der_is_rejected() {
        assert!(matches!(
            LeafCertificate::from_der(b"this is not a certificate"),
            Err(SpiryError::InvalidCertificate { .. })
        ));
    }

    #[test]
    fn test_connect_refused() {
        let fetcher = TlsFetcher::default();
        // Port 1 is typically not open
        let address = normalize_address("127.0.0.1:1").unwrap();
        let err = fetcher.fetch_leaf(&address, "localhost").unwrap_err();
        assert!(matches!(err, SpiryError::Connect { .. }));
    }
}
