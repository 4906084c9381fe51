// ── SSID mapping reconciler ──
//
// Deploy and Rename push the guest SSID's desired state to the vendor,
// one network at a time, with bounded concurrency. Each network is a
// single unit: lock → re-read → vendor call → local write. The local
// mapping is written only after the vendor confirmed the change, and a
// failing network never aborts its siblings; failures are folded into the
// report next to the successes.

use std::collections::HashSet;

use futures_util::{StreamExt, stream};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapter::SsidPatch;
use crate::engine::Engine;
use crate::error::{CoreError, VendorError, VendorErrorCategory};
use crate::model::{Network, NetworkRole, SsidBinding};

// ── Report types ─────────────────────────────────────────────────────

/// One network that could not be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkFailure {
    pub network_id: Uuid,
    pub network_name: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<VendorErrorCategory>,
}

/// Result of a deploy or rename batch. Both numbers must be surfaced:
/// errors next to a positive count is a partial success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    #[serde(rename = "updatedOrDeployedCount")]
    pub updated: usize,
    /// Networks without a guest WiFi binding; neither counted nor errors.
    pub skipped: usize,
    pub errors: Vec<NetworkFailure>,
}

impl ReconcileReport {
    pub fn is_partial(&self) -> bool {
        self.updated > 0 && !self.errors.is_empty()
    }

    pub fn is_total_failure(&self) -> bool {
        self.updated == 0 && !self.errors.is_empty()
    }

    fn from_outcomes(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let mut report = outcomes
            .into_iter()
            .fold(Self::default(), |mut report, outcome| {
                match outcome {
                    Outcome::Updated => report.updated += 1,
                    Outcome::Skipped => report.skipped += 1,
                    Outcome::Failed(failure) => report.errors.push(failure),
                }
                report
            });
        report
            .errors
            .sort_by(|a, b| a.network_name.cmp(&b.network_name));
        report
    }
}

/// Guest WiFi rollout across a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestWifiStatus {
    pub networks: usize,
    /// Networks with a guest WiFi SSID assigned.
    pub mapped: usize,
    /// Networks whose guest SSID was last pushed as enabled.
    pub enabled: usize,
}

enum Outcome {
    Updated,
    Skipped,
    Failed(NetworkFailure),
}

// ── Reconciler ───────────────────────────────────────────────────────

pub struct Reconciler<'a> {
    engine: &'a Engine,
}

impl<'a> Reconciler<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Enable the guest SSID (open, click-through) on the given networks.
    ///
    /// Every id must name a network in the workspace; an unknown id fails
    /// the call before any vendor is contacted.
    pub async fn deploy(
        &self,
        workspace_id: Uuid,
        network_ids: &[Uuid],
    ) -> Result<ReconcileReport, CoreError> {
        let mut seen = HashSet::new();
        let mut networks = Vec::with_capacity(network_ids.len());
        for &id in network_ids {
            if !seen.insert(id) {
                continue;
            }
            let network = self
                .engine
                .store()
                .get_network(workspace_id, id)?
                .ok_or_else(|| CoreError::not_found("Network", id))?;
            networks.push(network);
        }

        info!(%workspace_id, networks = networks.len(), "deploying guest WiFi");
        let report = self
            .run(&networks, &SsidPatch::guest_deploy(), |binding| {
                binding.enabled = true;
            })
            .await;
        log_report("deploy", &report);
        Ok(report)
    }

    /// Push a new guest SSID name to every mapped network in the workspace.
    pub async fn rename(
        &self,
        workspace_id: Uuid,
        new_name: &str,
    ) -> Result<ReconcileReport, CoreError> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("SSID name must not be empty"));
        }

        let networks = self.engine.store().list_networks(workspace_id)?;
        info!(%workspace_id, networks = networks.len(), new_name = name, "renaming guest SSID");
        let report = self
            .run(&networks, &SsidPatch::rename(name), |binding| {
                name.clone_into(&mut binding.ssid_name);
            })
            .await;
        log_report("rename", &report);
        Ok(report)
    }

    /// Counts for the guest WiFi collaborator, from local state only.
    pub fn guest_wifi_status(&self, workspace_id: Uuid) -> Result<GuestWifiStatus, CoreError> {
        let networks = self.engine.store().list_networks(workspace_id)?;
        let guest: Vec<&SsidBinding> = networks
            .iter()
            .filter_map(|n| n.ssid_mapping.guest_wifi())
            .collect();
        Ok(GuestWifiStatus {
            networks: networks.len(),
            mapped: guest.len(),
            enabled: guest.iter().filter(|b| b.enabled).count(),
        })
    }

    // ── Per-network unit ─────────────────────────────────────────────

    async fn run<F>(&self, networks: &[Network], patch: &SsidPatch, apply: F) -> ReconcileReport
    where
        F: Fn(&mut SsidBinding) + Sync,
    {
        let outcomes: Vec<Outcome> = stream::iter(networks)
            .map(|network| self.reconcile(network, patch, &apply))
            .buffer_unordered(self.engine.settings().effective_concurrency())
            .collect()
            .await;
        ReconcileReport::from_outcomes(outcomes)
    }

    async fn reconcile<F>(&self, network: &Network, patch: &SsidPatch, apply: &F) -> Outcome
    where
        F: Fn(&mut SsidBinding) + Sync,
    {
        let _guard = self.engine.lock_network(network.id).await;

        match self.push(network, patch, apply).await {
            Ok(true) => Outcome::Updated,
            Ok(false) => Outcome::Skipped,
            Err(err) => {
                warn!(
                    network_id = %network.id,
                    network = %network.name,
                    error = %err,
                    "network reconcile failed"
                );
                Outcome::Failed(NetworkFailure {
                    network_id: network.id,
                    network_name: network.name.clone(),
                    category: err.vendor_category(),
                    error: err.to_string(),
                })
            }
        }
    }

    /// `Ok(false)` when the network has no guest SSID to push to.
    async fn push<F>(&self, network: &Network, patch: &SsidPatch, apply: &F) -> Result<bool, CoreError>
    where
        F: Fn(&mut SsidBinding) + Sync,
    {
        // Re-read under the lock; the batch snapshot may be stale.
        let current = self
            .engine
            .store()
            .get_network(network.workspace_id, network.id)?
            .ok_or_else(|| CoreError::not_found("Network", network.id))?;
        let Some(binding) = current.ssid_mapping.guest_wifi() else {
            debug!(network_id = %current.id, "no guest WiFi SSID assigned, skipping");
            return Ok(false);
        };
        let ssid_number = binding.ssid_number;

        let integration = self
            .engine
            .integration(current.workspace_id, current.integration_id)?;
        let session = self.engine.open_session(&integration)?;

        let timeout = self.engine.settings().vendor_timeout;
        tokio::time::timeout(
            timeout,
            session.adapter.update_ssid(
                &session.credentials,
                &current.external_id,
                ssid_number,
                patch,
            ),
        )
        .await
        .map_err(|_| VendorError::timeout(timeout))??;
        drop(session);

        self.engine
            .store()
            .update_binding(current.id, NetworkRole::GuestWifi, |binding| apply(binding))?;
        Ok(true)
    }
}

fn log_report(operation: &str, report: &ReconcileReport) {
    info!(
        operation,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.errors.len(),
        "reconcile finished"
    );
}
