// ── Local network record ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::ssid_mapping::SsidMapping;

/// Provisioning lifecycle of a managed network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProvisioningStatus {
    Pending,
    Provisioning,
    Active,
    Failed,
}

impl ProvisioningStatus {
    /// Whether `self → next` is a legal transition. Re-provisioning an
    /// active or failed network is allowed; nothing returns to `pending`
    /// except a failed network being queued again.
    pub fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Pending => !matches!(next, Self::Pending),
            Self::Provisioning => matches!(next, Self::Active | Self::Failed),
            Self::Active => !matches!(next, Self::Pending),
            Self::Failed => true,
        }
    }
}

/// Opaque vendor-side snapshot taken at provisioning time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSnapshot {
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub product_types: Vec<String>,
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// A vendor network managed by this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub integration_id: Uuid,
    /// Vendor-side network identifier; unique per integration.
    pub external_id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub status: ProvisioningStatus,
    pub vendor_snapshot: VendorSnapshot,
    pub ssid_mapping: SsidMapping,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or upserting a network (without generated fields).
#[derive(Debug, Clone, PartialEq)]
pub struct NewNetwork {
    pub workspace_id: Uuid,
    pub integration_id: Uuid,
    pub external_id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub status: ProvisioningStatus,
    pub vendor_snapshot: VendorSnapshot,
    pub ssid_mapping: SsidMapping,
}

#[cfg(test)]
mod tests {
    use super::ProvisioningStatus::{Active, Failed, Pending, Provisioning};

    #[test]
    fn test_status_transitions() {
        assert!(Pending.can_transition_to(Active));
        assert!(Pending.can_transition_to(Failed));
        assert!(Provisioning.can_transition_to(Active));
        assert!(!Provisioning.can_transition_to(Pending));
        assert!(Active.can_transition_to(Active));
        assert!(!Active.can_transition_to(Pending));
        assert!(Failed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(Active.to_string(), "active");
        assert_eq!("failed".parse::<super::ProvisioningStatus>().ok(), Some(Failed));
    }
}
