//! TLS settings applied to clients that talk to `https` URLs.

use crate::Result;
use reqwest::blocking::ClientBuilder;
use reqwest::Certificate;
use std::path::Path;

pub trait TlsConfigurator: Send + Sync {
    fn configure(&self, builder: ClientBuilder) -> ClientBuilder;
}

impl<F> TlsConfigurator for F
where
    F: Fn(ClientBuilder) -> ClientBuilder + Send + Sync,
{
    fn configure(&self, builder: ClientBuilder) -> ClientBuilder {
        self(builder)
    }
}

/// Extra trust roots, on top of the platform ones.
#[derive(Clone)]
pub struct RootCertificates {
    certificates: Vec<Certificate>,
}

impl RootCertificates {
    pub fn new(certificates: Vec<Certificate>) -> Self {
        Self { certificates }
    }

    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        Ok(Self::new(vec![Certificate::from_pem(pem)?]))
    }

    pub fn from_pem_file(path: &Path) -> Result<Self> {
        let pem = std::fs::read(path)?;
        Self::from_pem(&pem)
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

impl TlsConfigurator for RootCertificates {
    fn configure(&self, builder: ClientBuilder) -> ClientBuilder {
        self.certificates
            .iter()
            .cloned()
            .fold(builder, |builder, certificate| {
                builder.add_root_certificate(certificate)
            })
    }
}

/// Disables certificate and hostname verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptInvalidCerts;

impl TlsConfigurator for AcceptInvalidCerts {
    fn configure(&self, builder: ClientBuilder) -> ClientBuilder {
        builder.danger_accept_invalid_certs(true)
    }
}
