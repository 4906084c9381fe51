// Hand-crafted async HTTP client for the Meraki Dashboard API (v1).

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types;
use crate::Error;
use crate::transport::TransportConfig;

/// Retry-after used when a 429 carries no usable header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Meraki Dashboard API.
///
/// One instance per credential: the bearer token is injected as a
/// default header, and every call is a single round trip bounded by
/// the transport timeout.
pub struct MerakiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl MerakiClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.meraki.com/api/v1";

    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key or OAuth access token.
    pub fn from_token(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidCredential {
                message: e.to_string(),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout: transport.timeout,
        })
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        self.handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    fn send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout: self.timeout,
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await.map_err(|e| self.send_error(e))?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Error::RateLimited { retry_after_secs };
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<types::ErrorResponse>(&raw) {
            Ok(err) if !err.errors.is_empty() => err.errors.join("; "),
            _ if raw.is_empty() => status.to_string(),
            _ => raw,
        };

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Organizations ────────────────────────────────────────────────

    pub async fn list_organizations(&self) -> Result<Vec<types::Organization>, Error> {
        self.get("organizations").await
    }

    pub async fn list_organization_networks(
        &self,
        organization_id: &str,
    ) -> Result<Vec<types::Network>, Error> {
        self.get(&format!("organizations/{organization_id}/networks"))
            .await
    }

    pub async fn list_organization_devices(
        &self,
        organization_id: &str,
    ) -> Result<Vec<types::Device>, Error> {
        self.get(&format!("organizations/{organization_id}/devices"))
            .await
    }

    // ── Networks ─────────────────────────────────────────────────────

    pub async fn list_network_devices(&self, network_id: &str) -> Result<Vec<types::Device>, Error> {
        self.get(&format!("networks/{network_id}/devices")).await
    }

    // ── Wireless SSIDs ───────────────────────────────────────────────

    pub async fn list_network_ssids(&self, network_id: &str) -> Result<Vec<types::Ssid>, Error> {
        self.get(&format!("networks/{network_id}/wireless/ssids"))
            .await
    }

    pub async fn update_network_ssid(
        &self,
        network_id: &str,
        number: u8,
        update: &types::SsidUpdate,
    ) -> Result<types::Ssid, Error> {
        self.put(
            &format!("networks/{network_id}/wireless/ssids/{number}"),
            update,
        )
        .await
    }
}
