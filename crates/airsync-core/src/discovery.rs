// ── Resource discovery ──
//
// Read-only pass-through to the vendor adapter, scoped to one integration.
// Credentials are decrypted per call and dropped when it returns. Any
// vendor error fails the whole call; there are no partial lists.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::engine::{Engine, VendorSession};
use crate::error::CoreError;
use crate::model::{Organization, Ssid, VendorNetwork};

/// A network whose SSID numbering differs from the reference network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SsidMismatch {
    pub network_id: String,
    pub reference_network_id: String,
    /// SSID numbers whose name differs or that exist on only one side.
    pub differing_numbers: Vec<u8>,
}

pub struct Discovery<'a> {
    engine: &'a Engine,
}

impl<'a> Discovery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    fn session(&self, workspace_id: Uuid, integration_id: Uuid) -> Result<VendorSession, CoreError> {
        let integration = self.engine.integration(workspace_id, integration_id)?;
        self.engine.open_session(&integration)
    }

    pub async fn organizations(
        &self,
        workspace_id: Uuid,
        integration_id: Uuid,
    ) -> Result<Vec<Organization>, CoreError> {
        let s = self.session(workspace_id, integration_id)?;
        s.adapter.list_organizations(&s.credentials).await
    }

    pub async fn networks(
        &self,
        workspace_id: Uuid,
        integration_id: Uuid,
        organization_id: &str,
    ) -> Result<Vec<VendorNetwork>, CoreError> {
        let s = self.session(workspace_id, integration_id)?;
        s.adapter
            .list_networks(&s.credentials, organization_id)
            .await
    }

    pub async fn device_tags(
        &self,
        workspace_id: Uuid,
        integration_id: Uuid,
        organization_id: &str,
    ) -> Result<Vec<String>, CoreError> {
        let s = self.session(workspace_id, integration_id)?;
        s.adapter
            .list_device_tags(&s.credentials, organization_id)
            .await
    }

    pub async fn ssids(
        &self,
        workspace_id: Uuid,
        integration_id: Uuid,
        network_id: &str,
    ) -> Result<Vec<Ssid>, CoreError> {
        let s = self.session(workspace_id, integration_id)?;
        s.adapter.list_ssids(&s.credentials, network_id).await
    }

    pub async fn device_count(
        &self,
        workspace_id: Uuid,
        integration_id: Uuid,
        network_id: &str,
    ) -> Result<usize, CoreError> {
        let s = self.session(workspace_id, integration_id)?;
        s.adapter.count_devices(&s.credentials, network_id).await
    }

    /// Compare each network's SSID number→name table with the first one's.
    ///
    /// A mapping built from the first network is applied to all of them at
    /// provisioning time; this reports the networks where that would bind
    /// a role to a differently-named slot.
    pub async fn check_ssid_consistency(
        &self,
        workspace_id: Uuid,
        integration_id: Uuid,
        network_ids: &[String],
    ) -> Result<Vec<SsidMismatch>, CoreError> {
        let Some((reference_id, others)) = network_ids.split_first() else {
            return Ok(Vec::new());
        };

        let s = self.session(workspace_id, integration_id)?;
        let reference = ssid_table(s.adapter.list_ssids(&s.credentials, reference_id).await?);

        let mut mismatches = Vec::new();
        for network_id in others {
            let table = ssid_table(s.adapter.list_ssids(&s.credentials, network_id).await?);
            let differing: Vec<u8> = reference
                .keys()
                .chain(table.keys())
                .copied()
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .filter(|n| reference.get(n) != table.get(n))
                .collect();

            if !differing.is_empty() {
                debug!(%network_id, ?differing, "SSID numbering differs from reference network");
                mismatches.push(SsidMismatch {
                    network_id: network_id.clone(),
                    reference_network_id: reference_id.clone(),
                    differing_numbers: differing,
                });
            }
        }
        Ok(mismatches)
    }
}

fn ssid_table(ssids: Vec<Ssid>) -> BTreeMap<u8, String> {
    ssids.into_iter().map(|s| (s.number, s.name)).collect()
}
