use chrono::{Datelike, TimeZone, Utc};
use rcgen::{date_time_ymd, CertificateParams, KeyPair};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection};
use spiry::checks::{CertificateFetcher, LeafCertificate, NormalizedAddress, TlsFetcher};
use spiry::{Certificate, ExpiringResource, Result, SpiryError};
use std::cell::{Cell, RefCell};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

/// Records every handshake and answers with a fixed expiry
struct CountingFetcher {
    calls: Cell<usize>,
    server_names: RefCell<Vec<String>>,
}

impl CountingFetcher {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
            server_names: RefCell::new(Vec::new()),
        }
    }
}

impl CertificateFetcher for CountingFetcher {
    fn fetch_leaf(&self, _address: &NormalizedAddress, server_name: &str) -> Result<LeafCertificate> {
        self.calls.set(self.calls.get() + 1);
        self.server_names.borrow_mut().push(server_name.to_string());
        Ok(LeafCertificate {
            subject: format!("CN={server_name}"),
            not_after: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        })
    }
}

/// Serve `cert` to every connection on an ephemeral localhost port
fn spawn_tls_server(cert: CertificateDer<'static>, key: PrivateKeyDer<'static>) -> u16 {
    let _ = rustls::crypto::ring::default_provider().install_default();
    let config = Arc::new(
        ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(vec![cert], key)
            .unwrap(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut sock) = stream else { continue };
            let Ok(mut conn) = ServerConnection::new(config.clone()) else {
                continue;
            };
            while conn.is_handshaking() {
                if conn.complete_io(&mut sock).is_err() {
                    break;
                }
            }
            conn.send_close_notify();
            let _ = conn.complete_io(&mut sock);
        }
    });

    port
}

fn expired_certificate() -> (CertificateDer<'static>, PrivateKeyDer<'static>) {
    let mut params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    params.not_before = date_time_ymd(2000, 1, 1);
    params.not_after = date_time_ymd(2001, 1, 1);

    let key_pair = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key_pair).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    (cert.der().clone(), key)
}

#[test]
fn test_expired_certificate_is_retrieved() {
    let (cert, key) = expired_certificate();
    let port = spawn_tls_server(cert, key);

    let address = format!("127.0.0.1:{port}");
    let mut cert = Certificate::with_fetcher(&address, Some("localhost"), TlsFetcher::default()).unwrap();

    let expiry = cert.expiry().unwrap();
    assert!(expiry < Utc::now());
    assert_eq!(expiry.year(), 2001);
    assert_eq!(cert.leaf().unwrap().not_after, expiry);
}

#[test]
fn test_name_override_is_presented_for_sni() {
    let fetcher = CountingFetcher::new();
    let mut cert = Certificate::with_fetcher("https://example.com/", Some("elpmaxe.com"), &fetcher).unwrap();

    assert_eq!(cert.name(), "elpmaxe.com");
    cert.expiry().unwrap();
    assert_eq!(*fetcher.server_names.borrow(), vec!["elpmaxe.com"]);
}

#[test]
fn test_expiry_is_cached() {
    let fetcher = CountingFetcher::new();
    let mut cert = Certificate::with_fetcher("example.com", None, &fetcher).unwrap();

    let first = cert.expiry().unwrap();
    let second = cert.expiry().unwrap();

    assert_eq!(first, second);
    assert_eq!(fetcher.calls.get(), 1);
}

#[test]
fn test_invalid_name_fails_before_any_handshake() {
    let fetcher = CountingFetcher::new();
    let result = Certificate::with_fetcher("https://example.com/", Some("sanford&son.example.com"), &fetcher);

    assert!(matches!(result, Err(SpiryError::InvalidName { .. })));
    assert_eq!(fetcher.calls.get(), 0);
}

#[test]
fn test_default_constructors() {
    let cert = Certificate::new("https://example.com/").unwrap();
    assert_eq!(cert.name(), "example.com");
    assert_eq!(cert.address().to_string(), "example.com:443");

    let cert = Certificate::with_name("elpmaxe.com", "https://example.com/").unwrap();
    assert_eq!(cert.name(), "elpmaxe.com");

    assert!(matches!(
        Certificate::with_name("sanford&son.example.com", "example.com"),
        Err(SpiryError::InvalidName { .. })
    ));
}

#[test]
fn test_connect_failure_is_not_cached() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut cert = Certificate::new(&format!("127.0.0.1:{port}")).unwrap();
    assert!(matches!(cert.expiry(), Err(SpiryError::Connect { .. })));
    assert!(cert.leaf().is_none());
}

#[test]
#[ignore = "requires network access"]
fn test_live_certificate_expiry() {
    let mut cert = Certificate::new("https://example.com/").unwrap();
    assert!(cert.expiry().unwrap() > Utc::now());
}
