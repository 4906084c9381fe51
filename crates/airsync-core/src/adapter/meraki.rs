// ── Cisco Meraki adapter ──
//
// Maps the vendor-agnostic capability set onto the Meraki Dashboard API.
// A fresh `MerakiClient` is built per call so the bearer header never
// outlives the credentials it was made from. A custom CA is read once.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use airsync_api::meraki::types as wire;
use airsync_api::{MerakiClient, TransportConfig};

use super::{AuthMode, SplashPage, SsidPatch, VendorAdapter};
use crate::error::CoreError;
use crate::model::{Credentials, Organization, Ssid, Vendor, VendorNetwork};

pub struct MerakiAdapter {
    base_url: String,
    transport: TransportConfig,
}

impl MerakiAdapter {
    pub fn new(base_url: impl Into<String>, transport: TransportConfig) -> Self {
        // An unreadable CA keeps its path and fails on the first call instead.
        let transport = match transport.clone().preload_ca() {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "could not load custom CA certificate");
                transport
            }
        };
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    fn client(&self, credentials: &Credentials) -> Result<MerakiClient, CoreError> {
        if credentials.is_expired(Utc::now()) {
            return Err(CoreError::credential("Meraki access token has expired"));
        }
        let token = credentials
            .bearer_token()
            .ok_or_else(|| CoreError::credential("Meraki requires an API key or access token"))?;
        Ok(MerakiClient::from_token(
            &self.base_url,
            token,
            &self.transport,
        )?)
    }
}

// ── Wire conversions ─────────────────────────────────────────────────

impl From<wire::Organization> for Organization {
    fn from(o: wire::Organization) -> Self {
        Self {
            id: o.id,
            name: o.name,
        }
    }
}

impl From<wire::Network> for VendorNetwork {
    fn from(n: wire::Network) -> Self {
        let raw = serde_json::to_value(&n).unwrap_or_default();
        Self {
            id: n.id,
            name: n.name,
            product_types: n.product_types,
            tags: n.tags,
            time_zone: n.time_zone,
            raw,
        }
    }
}

impl From<wire::Ssid> for Ssid {
    fn from(s: wire::Ssid) -> Self {
        let mut extra = s.extra;
        if let Some(mode) = s.ip_assignment_mode {
            extra.insert("ipAssignmentMode".into(), mode.into());
        }
        Self {
            number: s.number,
            name: s.name,
            enabled: s.enabled,
            auth_mode: s.auth_mode,
            splash_page: s.splash_page,
            vlan_id: s.default_vlan_id,
            extra,
        }
    }
}

fn auth_mode_str(mode: AuthMode) -> &'static str {
    match mode {
        AuthMode::Open => "open",
        AuthMode::Psk => "psk",
        AuthMode::Enterprise => "8021x-radius",
    }
}

fn splash_page_str(splash: SplashPage) -> &'static str {
    match splash {
        SplashPage::Disabled => "None",
        SplashPage::ClickThrough => "Click-through splash page",
    }
}

impl From<&SsidPatch> for wire::SsidUpdate {
    fn from(patch: &SsidPatch) -> Self {
        Self {
            name: patch.name.clone(),
            enabled: patch.enabled,
            auth_mode: patch.auth_mode.map(|m| auth_mode_str(m).to_owned()),
            splash_page: patch.splash_page.map(|s| splash_page_str(s).to_owned()),
        }
    }
}

// ── VendorAdapter ────────────────────────────────────────────────────

#[async_trait]
impl VendorAdapter for MerakiAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::Meraki
    }

    async fn validate_credentials(&self, credentials: &Credentials) -> Result<bool, CoreError> {
        let client = self.client(credentials)?;
        match client.list_organizations().await {
            Ok(_) => Ok(true),
            Err(e) if e.is_unauthorized() => {
                debug!(status = ?e.status(), "meraki rejected credentials");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_organizations(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Organization>, CoreError> {
        let orgs = self.client(credentials)?.list_organizations().await?;
        Ok(orgs.into_iter().map(Organization::from).collect())
    }

    async fn list_networks(
        &self,
        credentials: &Credentials,
        organization_id: &str,
    ) -> Result<Vec<VendorNetwork>, CoreError> {
        let networks = self
            .client(credentials)?
            .list_organization_networks(organization_id)
            .await?;
        Ok(networks
            .into_iter()
            .filter(wire::Network::is_wireless)
            .map(VendorNetwork::from)
            .collect())
    }

    async fn list_device_tags(
        &self,
        credentials: &Credentials,
        organization_id: &str,
    ) -> Result<Vec<String>, CoreError> {
        let devices = self
            .client(credentials)?
            .list_organization_devices(organization_id)
            .await?;
        let tags: BTreeSet<String> = devices
            .into_iter()
            .flat_map(|d| d.tags)
            .filter(|t| !t.trim().is_empty())
            .collect();
        Ok(tags.into_iter().collect())
    }

    async fn list_ssids(
        &self,
        credentials: &Credentials,
        network_id: &str,
    ) -> Result<Vec<Ssid>, CoreError> {
        let ssids = self
            .client(credentials)?
            .list_network_ssids(network_id)
            .await?;
        Ok(ssids.into_iter().map(Ssid::from).collect())
    }

    async fn update_ssid(
        &self,
        credentials: &Credentials,
        network_id: &str,
        ssid_number: u8,
        patch: &SsidPatch,
    ) -> Result<(), CoreError> {
        let update = wire::SsidUpdate::from(patch);
        self.client(credentials)?
            .update_network_ssid(network_id, ssid_number, &update)
            .await?;
        Ok(())
    }

    async fn count_devices(
        &self,
        credentials: &Credentials,
        network_id: &str,
    ) -> Result<usize, CoreError> {
        let devices = self
            .client(credentials)?
            .list_network_devices(network_id)
            .await?;
        Ok(devices.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_guest_deploy_maps_to_meraki_values() {
        let update = wire::SsidUpdate::from(&SsidPatch::guest_deploy());
        assert_eq!(update.enabled, Some(true));
        assert_eq!(update.auth_mode.as_deref(), Some("open"));
        assert_eq!(update.splash_page.as_deref(), Some("Click-through splash page"));
        assert!(update.name.is_none());
    }

    #[test]
    fn test_expired_token_rejected_before_request() {
        let adapter = MerakiAdapter::new("http://127.0.0.1:1", TransportConfig::default());
        let creds = Credentials {
            access_token: Some(SecretString::from("token".to_string())),
            token_expires_at: Some(Utc::now() - chrono::Duration::minutes(5)),
            ..Credentials::default()
        };
        assert!(matches!(
            adapter.client(&creds),
            Err(CoreError::Credential { .. })
        ));
    }

    #[test]
    fn test_missing_token_rejected() {
        let adapter = MerakiAdapter::new("http://127.0.0.1:1", TransportConfig::default());
        assert!(matches!(
            adapter.client(&Credentials::default()),
            Err(CoreError::Credential { .. })
        ));
    }

    #[test]
    fn test_ssid_keeps_vendor_specific_fields() {
        let raw: wire::Ssid = serde_json::from_value(serde_json::json!({
            "number": 2,
            "name": "Guest",
            "enabled": false,
            "ipAssignmentMode": "NAT mode",
            "defaultVlanId": 30,
            "bandSelection": "Dual band operation",
            "minBitrate": 11
        }))
        .expect("wire ssid");

        let ssid = Ssid::from(raw);
        assert_eq!(ssid.vlan_id, Some(30));
        assert_eq!(ssid.extra["ipAssignmentMode"], "NAT mode");
        assert_eq!(ssid.extra["bandSelection"], "Dual band operation");
        assert_eq!(ssid.extra["minBitrate"], 11);
    }

    #[test]
    fn test_unreadable_ca_fails_per_call() {
        let transport = TransportConfig {
            tls: airsync_api::TlsMode::CustomCa("/nonexistent/airsync-ca.pem".into()),
            ..TransportConfig::default()
        };
        let adapter = MerakiAdapter::new("http://127.0.0.1:1", transport);
        let err = adapter.client(&Credentials::from_api_key("key")).err();
        assert!(matches!(
            err,
            Some(CoreError::Vendor(e)) if e.category == crate::error::VendorErrorCategory::Transport
        ));
    }
}
