use std::io::BufRead;

use rustls::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls_pemfile::{certs, pkcs8_private_keys};

#[derive(Debug)]
pub enum TlsError {
    InvalidCertificate(std::io::Error),
    InvalidKey(std::io::Error),
    MissingCertificate,
    MissingKey,
    Rejected(rustls::Error),
}

impl std::fmt::Display for TlsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TlsError::InvalidCertificate(e) => write!(f, "Failed to parse certificate chain: {}", e),
            TlsError::InvalidKey(e) => write!(f, "Failed to parse private key: {}", e),
            TlsError::MissingCertificate => write!(f, "No certificate found in PEM input"),
            TlsError::MissingKey => write!(f, "No PKCS#8 private key found in PEM input"),
            TlsError::Rejected(e) => write!(f, "Certificate/key pair rejected: {}", e),
        }
    }
}

impl std::error::Error for TlsError {}

/// Build a rustls server config from PEM-encoded certificate chain and PKCS#8 key
pub fn init_rustls_config(
    cert_reader: &mut dyn BufRead,
    key_reader: &mut dyn BufRead,
) -> Result<ServerConfig, TlsError> {
    let cert_chain: Vec<CertificateDer<'static>> = certs(cert_reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(TlsError::InvalidCertificate)?;

    if cert_chain.is_empty() {
        return Err(TlsError::MissingCertificate);
    }

    let key = pkcs8_private_keys(key_reader)
        .next()
        .ok_or(TlsError::MissingKey)?
        .map_err(TlsError::InvalidKey)?;

    tracing::debug!("Loaded TLS certificate chain ({} certificates)", cert_chain.len());

    ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, PrivateKeyDer::Pkcs8(key))
        .map_err(TlsError::Rejected)
}
