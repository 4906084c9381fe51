// ── Meraki Dashboard API wire types ──
//
// Only the fields the adapter reads are typed; everything else is kept
// in `extra` so vendor snapshots survive round trips untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /organizations` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// `GET /organizations/{id}/networks` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub product_types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Network {
    /// Whether the network contains wireless access points.
    pub fn is_wireless(&self) -> bool {
        self.product_types.iter().any(|p| p == "wireless")
    }
}

/// `GET /organizations/{id}/devices` and `GET /networks/{id}/devices` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub serial: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// `GET /networks/{id}/wireless/ssids` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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
    pub ip_assignment_mode: Option<String>,
    #[serde(default)]
    pub default_vlan_id: Option<u16>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `PUT /networks/{id}/wireless/ssids/{number}`.
///
/// Meraki treats omitted fields as "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsidUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splash_page: Option<String>,
}

/// Error body: `{"errors": ["..."]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}
