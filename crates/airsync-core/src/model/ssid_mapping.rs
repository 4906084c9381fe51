// ── SSID mapping ──
//
// Assignment of logical roles to physical SSID slots on one vendor
// network. Embedded in the Network record; it has no lifecycle of its own.
// `enabled` is a write-through cache of what this system last pushed and
// may be stale relative to the controller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::vendor::Ssid;
use crate::error::CoreError;

/// Logical role an SSID can play.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
#[non_exhaustive]
pub enum NetworkRole {
    GuestWifi,
    Iot,
    Employees,
}

/// A role bound to a concrete SSID slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsidBinding {
    pub ssid_number: u8,
    pub ssid_name: String,
    pub enabled: bool,
}

/// Role → binding document. A missing role is "unassigned".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<NetworkRole, Option<SsidBinding>>")]
pub struct SsidMapping(BTreeMap<NetworkRole, SsidBinding>);

impl From<BTreeMap<NetworkRole, Option<SsidBinding>>> for SsidMapping {
    fn from(raw: BTreeMap<NetworkRole, Option<SsidBinding>>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(role, binding)| binding.map(|b| (role, b)))
                .collect(),
        )
    }
}

impl SsidMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from `(role, ssid number)` picks, taking names and
    /// enabled flags from the SSID list of the network the numbers were
    /// read from. Unknown numbers and double-booked slots are rejected.
    pub fn from_assignments(
        assignments: &[(NetworkRole, u8)],
        ssids: &[Ssid],
    ) -> Result<Self, CoreError> {
        let mut mapping = Self::new();
        for &(role, number) in assignments {
            let ssid = ssids.iter().find(|s| s.number == number).ok_or_else(|| {
                CoreError::validation(format!("SSID {number} does not exist on this network"))
            })?;
            if let Some((other, _)) = mapping.iter().find(|(_, b)| b.ssid_number == number) {
                return Err(CoreError::validation(format!(
                    "SSID {number} is already assigned to {other}"
                )));
            }
            mapping.assign(
                role,
                SsidBinding {
                    ssid_number: number,
                    ssid_name: ssid.name.clone(),
                    enabled: ssid.enabled,
                },
            );
        }
        Ok(mapping)
    }

    pub fn get(&self, role: NetworkRole) -> Option<&SsidBinding> {
        self.0.get(&role)
    }

    pub fn get_mut(&mut self, role: NetworkRole) -> Option<&mut SsidBinding> {
        self.0.get_mut(&role)
    }

    pub fn guest_wifi(&self) -> Option<&SsidBinding> {
        self.get(NetworkRole::GuestWifi)
    }

    pub fn is_assigned(&self, role: NetworkRole) -> bool {
        self.0.contains_key(&role)
    }

    pub fn assign(&mut self, role: NetworkRole, binding: SsidBinding) -> Option<SsidBinding> {
        self.0.insert(role, binding)
    }

    pub fn unassign(&mut self, role: NetworkRole) -> Option<SsidBinding> {
        self.0.remove(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NetworkRole, &SsidBinding)> {
        self.0.iter().map(|(role, binding)| (*role, binding))
    }
}
