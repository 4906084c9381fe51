// Shared transport configuration for building reqwest::Client instances.
//
// Every vendor client gets its TLS and timeout settings from here so the
// per-call bound is applied uniformly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::HeaderMap;

const USER_AGENT: &str = concat!("airsync/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// A custom CA certificate already read from disk.
    LoadedCa(reqwest::Certificate),
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Config with the given per-request timeout and system TLS.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Read a `CustomCa` file once, so later clients reuse the parsed
    /// certificate. Other modes pass through unchanged.
    pub fn preload_ca(self) -> Result<Self, crate::error::Error> {
        match &self.tls {
            TlsMode::CustomCa(path) => Ok(Self {
                tls: TlsMode::LoadedCa(read_ca(path)?),
                ..self
            }),
            _ => Ok(self),
        }
    }

    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Vendor clients use this to inject their auth header on every request.
    pub fn build_client_with_headers(
        &self,
        headers: HeaderMap,
    ) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => builder = builder.add_root_certificate(read_ca(path)?),
            TlsMode::LoadedCa(cert) => builder = builder.add_root_certificate(cert.clone()),
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

fn read_ca(path: &Path) -> Result<reqwest::Certificate, crate::error::Error> {
    let cert_pem = std::fs::read(path)
        .map_err(|e| crate::error::Error::Tls(format!("failed to read CA cert: {e}")))?;
    reqwest::Certificate::from_pem(&cert_pem)
        .map_err(|e| crate::error::Error::Tls(format!("invalid CA cert: {e}")))
}
