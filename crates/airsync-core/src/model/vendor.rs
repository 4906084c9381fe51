// ── Vendor catalog and adapter result types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Supported (or announced) wireless controller vendors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[non_exhaustive]
pub enum Vendor {
    Meraki,
    Unifi,
    Aruba,
    Ruckus,
}

impl Vendor {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Meraki => "Cisco Meraki",
            Self::Unifi => "Ubiquiti UniFi",
            Self::Aruba => "HPE Aruba Networking",
            Self::Ruckus => "Ruckus",
        }
    }

    /// Whether an adapter ships for this vendor. Unavailable vendors are
    /// listed in the catalog but can't be selected.
    pub fn is_available(self) -> bool {
        matches!(self, Self::Meraki)
    }

    pub fn catalog() -> Vec<VendorInfo> {
        Self::iter()
            .map(|vendor| VendorInfo {
                vendor,
                display_name: vendor.display_name(),
                available: vendor.is_available(),
            })
            .collect()
    }
}

/// One row of the vendor catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorInfo {
    pub vendor: Vendor,
    pub display_name: &'static str,
    pub available: bool,
}

/// An organization visible to the credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// A wireless-capable network on the vendor side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorNetwork {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub product_types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Untouched vendor payload, kept as the network's config snapshot.
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// An SSID slot on a vendor network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ssid {
    pub number: u8,
    pub name: String,
    pub enabled: bool,
    #[serde(default)]
    pub auth_mode: Option<String>,
    #[serde(default)]
    pub splash_page: Option<String>,
    #[serde(default)]
    pub vlan_id: Option<u16>,
    /// Vendor-specific fields not modelled above.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
