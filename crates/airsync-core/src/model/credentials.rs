// ── Credential bundles ──
//
// `Credentials` is the plaintext form handed to an adapter for exactly one
// call; `EncryptedCredentials` is what gets persisted. Each secret field is
// sealed on its own so API-key-only vendors never carry empty OAuth fields.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Plaintext credential bundle. `Debug` output is redacted by `secrecy`.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub api_key: Option<SecretString>,
    pub client_id: Option<SecretString>,
    pub client_secret: Option<SecretString>,
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Bundle holding only an API key.
    pub fn from_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            ..Self::default()
        }
    }

    /// The token to present to the vendor: API key first, then OAuth access token.
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.api_key.as_ref().or(self.access_token.as_ref())
    }

    /// True when the bundle relies on an OAuth token that has expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.api_key.is_none()
            && self
                .token_expires_at
                .is_some_and(|expires_at| expires_at <= now)
    }
}

/// Persisted credential bundle; every present field is vault ciphertext.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<DateTime<Utc>>,
}
