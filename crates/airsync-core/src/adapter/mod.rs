// ── Vendor adapters ──
//
// Every call site outside this module depends only on `VendorAdapter`.
// Adding a vendor means one new implementation plus one `register` call
// in `AdapterRegistry::with_defaults`.

mod meraki;
mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Credentials, Organization, Ssid, Vendor, VendorNetwork};

pub use meraki::MerakiAdapter;
pub use registry::AdapterRegistry;

/// Fixed capability set of a wireless controller integration.
///
/// Each method is a single remote round trip. Credentials are borrowed
/// for the duration of the call and never retained.
#[async_trait]
pub trait VendorAdapter: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Lightweight auth check. `Ok(false)` means the vendor rejected the
    /// credentials; other failures are returned as errors.
    async fn validate_credentials(&self, credentials: &Credentials) -> Result<bool, CoreError>;

    async fn list_organizations(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Organization>, CoreError>;

    /// Wireless-capable networks only.
    async fn list_networks(
        &self,
        credentials: &Credentials,
        organization_id: &str,
    ) -> Result<Vec<VendorNetwork>, CoreError>;

    /// Device tags across the whole organization, deduplicated and sorted.
    async fn list_device_tags(
        &self,
        credentials: &Credentials,
        organization_id: &str,
    ) -> Result<Vec<String>, CoreError>;

    async fn list_ssids(
        &self,
        credentials: &Credentials,
        network_id: &str,
    ) -> Result<Vec<Ssid>, CoreError>;

    /// Partial update: only fields present in `patch` change.
    async fn update_ssid(
        &self,
        credentials: &Credentials,
        network_id: &str,
        ssid_number: u8,
        patch: &SsidPatch,
    ) -> Result<(), CoreError>;

    async fn count_devices(
        &self,
        credentials: &Credentials,
        network_id: &str,
    ) -> Result<usize, CoreError>;
}

// ── SSID patch ───────────────────────────────────────────────────────

/// SSID authentication mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthMode {
    Open,
    Psk,
    Enterprise,
}

/// Captive-portal behaviour of an SSID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SplashPage {
    Disabled,
    ClickThrough,
}

/// Vendor-agnostic partial SSID update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsidPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_mode: Option<AuthMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splash_page: Option<SplashPage>,
}

impl SsidPatch {
    /// Open, enabled, click-through: the guest deployment state.
    pub fn guest_deploy() -> Self {
        Self {
            enabled: Some(true),
            auth_mode: Some(AuthMode::Open),
            splash_page: Some(SplashPage::ClickThrough),
            ..Self::default()
        }
    }

    /// Name-only change.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
