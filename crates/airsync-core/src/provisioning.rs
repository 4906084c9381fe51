// ── Provisioning orchestrator ──
//
// `ProvisioningFlow` walks an operator from vendor choice to persisted
// networks, one step at a time with back-navigation and no skipping ahead.
// `Provisioner` is the final, purely local step: it records desired state
// and never calls the vendor.

use serde::Serialize;
use strum::Display;
use tracing::info;
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::{
    Credentials, Integration, NewNetwork, ProvisioningStatus, Ssid, SsidMapping, Vendor,
    VendorNetwork, VendorSnapshot,
};

// ── Provisioner ──────────────────────────────────────────────────────

/// Everything needed to record a batch of networks.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub workspace_id: Uuid,
    pub vendor: Vendor,
    pub integration_id: Uuid,
    pub organization_id: String,
    pub networks: Vec<VendorNetwork>,
    pub tags: Vec<String>,
    /// Applied identically to every network; `None` leaves all roles unassigned.
    pub ssid_mapping: Option<SsidMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProvisionOutcome {
    /// Networks written (inserted or updated).
    pub count: usize,
}

pub struct Provisioner<'a> {
    engine: &'a Engine,
}

impl<'a> Provisioner<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Upsert one network record per vendor network, all or nothing.
    pub fn provision(&self, request: ProvisionRequest) -> Result<ProvisionOutcome, CoreError> {
        if request.networks.is_empty() {
            return Err(CoreError::validation("at least one network must be selected"));
        }
        if request.organization_id.trim().is_empty() {
            return Err(CoreError::validation("an organization must be selected"));
        }

        let integration = self
            .engine
            .integration(request.workspace_id, request.integration_id)?;
        if integration.vendor != request.vendor {
            return Err(CoreError::validation(format!(
                "integration {} is a {} integration, not {}",
                integration.id, integration.vendor, request.vendor
            )));
        }

        let tags = normalize_tags(request.tags);
        let mapping = request.ssid_mapping.unwrap_or_default();

        let mut records: Vec<NewNetwork> = Vec::with_capacity(request.networks.len());
        for network in request.networks {
            if records.iter().any(|r| r.external_id == network.id) {
                continue;
            }
            records.push(NewNetwork {
                workspace_id: request.workspace_id,
                integration_id: integration.id,
                external_id: network.id,
                name: network.name,
                tags: tags.clone(),
                status: ProvisioningStatus::Active,
                vendor_snapshot: VendorSnapshot {
                    organization_id: Some(request.organization_id.clone()),
                    product_types: network.product_types,
                    raw: network.raw,
                },
                ssid_mapping: mapping.clone(),
            });
        }

        let count = self.engine.store().upsert_networks(&records)?;
        info!(
            workspace_id = %request.workspace_id,
            integration_id = %integration.id,
            count,
            mapped = !mapping.is_empty(),
            "networks provisioned"
        );
        Ok(ProvisionOutcome { count })
    }
}

/// Trim, drop blanks, sort and deduplicate.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = tags
        .into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

// ── Flow state machine ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FlowStep {
    VendorSelected,
    Authenticated,
    ResourcesSelected,
    SsidMapped,
    Provisioned,
}

/// Operator's pick of organization, networks and device tags.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSelection {
    pub organization_id: String,
    pub networks: Vec<VendorNetwork>,
    pub tags: Vec<String>,
}

/// Guided provisioning session.
#[derive(Debug, Clone)]
pub struct ProvisioningFlow {
    workspace_id: Uuid,
    vendor: Vendor,
    step: FlowStep,
    integration: Option<Integration>,
    selection: Option<ResourceSelection>,
    mapping: Option<SsidMapping>,
    outcome: Option<ProvisionOutcome>,
}

impl ProvisioningFlow {
    /// Begin a flow for `vendor`. Vendors without an adapter can't be chosen.
    pub fn start(workspace_id: Uuid, vendor: Vendor) -> Result<Self, CoreError> {
        if !vendor.is_available() {
            return Err(CoreError::VendorUnavailable {
                vendor: vendor.to_string(),
            });
        }
        Ok(Self {
            workspace_id,
            vendor,
            step: FlowStep::VendorSelected,
            integration: None,
            selection: None,
            mapping: None,
            outcome: None,
        })
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn integration(&self) -> Option<&Integration> {
        self.integration.as_ref()
    }

    pub fn selection(&self) -> Option<&ResourceSelection> {
        self.selection.as_ref()
    }

    pub fn mapping(&self) -> Option<&SsidMapping> {
        self.mapping.as_ref()
    }

    pub fn outcome(&self) -> Option<ProvisionOutcome> {
        self.outcome
    }

    fn require(&self, action: &str, step: FlowStep) -> Result<(), CoreError> {
        if self.step == step {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                action: action.into(),
                step: self.step.to_string(),
            })
        }
    }

    // ── VendorSelected → Authenticated ──

    /// Reuse an integration already registered for this vendor and workspace.
    pub fn use_existing_integration(
        &mut self,
        engine: &Engine,
        integration_id: Uuid,
    ) -> Result<&Integration, CoreError> {
        self.require("select an integration", FlowStep::VendorSelected)?;

        let integration = engine.integrations().get(self.workspace_id, integration_id)?;
        if integration.vendor != self.vendor {
            return Err(CoreError::validation(format!(
                "integration {integration_id} belongs to {}, not {}",
                integration.vendor, self.vendor
            )));
        }

        self.step = FlowStep::Authenticated;
        Ok(self.integration.insert(integration))
    }

    /// Create a new integration; fails without persisting anything if the
    /// vendor rejects the credentials.
    pub async fn authenticate(
        &mut self,
        engine: &Engine,
        name: &str,
        credentials: Credentials,
    ) -> Result<&Integration, CoreError> {
        self.require("authenticate", FlowStep::VendorSelected)?;

        let integration = engine
            .integrations()
            .create(self.workspace_id, self.vendor, name, credentials)
            .await?;

        self.step = FlowStep::Authenticated;
        Ok(self.integration.insert(integration))
    }

    // ── Authenticated → ResourcesSelected ──

    pub fn select_resources(&mut self, selection: ResourceSelection) -> Result<(), CoreError> {
        self.require("select resources", FlowStep::Authenticated)?;

        if selection.organization_id.trim().is_empty() {
            return Err(CoreError::validation("an organization must be selected"));
        }
        if selection.networks.is_empty() {
            return Err(CoreError::validation("at least one network must be selected"));
        }

        self.selection = Some(selection);
        self.step = FlowStep::ResourcesSelected;
        Ok(())
    }

    // ── ResourcesSelected → SsidMapped ──

    /// The network SSID numbers are read from: the first one selected.
    /// The resulting mapping is applied to every selected network.
    pub fn mapping_source_network(&self) -> Option<&VendorNetwork> {
        self.selection.as_ref().and_then(|s| s.networks.first())
    }

    /// SSIDs of the mapping source network, for the operator to pick from.
    pub async fn mapping_candidates(&self, engine: &Engine) -> Result<Vec<Ssid>, CoreError> {
        self.require("list SSIDs", FlowStep::ResourcesSelected)?;

        let (Some(integration), Some(source)) = (&self.integration, self.mapping_source_network())
        else {
            return Err(CoreError::Internal(
                "flow is missing its integration or selection".into(),
            ));
        };
        engine
            .discovery()
            .ssids(self.workspace_id, integration.id, &source.id)
            .await
    }

    pub fn map_ssids(&mut self, mapping: SsidMapping) -> Result<(), CoreError> {
        self.require("map SSIDs", FlowStep::ResourcesSelected)?;
        self.mapping = Some(mapping);
        self.step = FlowStep::SsidMapped;
        Ok(())
    }

    /// Leave every role unassigned.
    pub fn skip_mapping(&mut self) -> Result<(), CoreError> {
        self.require("skip SSID mapping", FlowStep::ResourcesSelected)?;
        self.mapping = None;
        self.step = FlowStep::SsidMapped;
        Ok(())
    }

    // ── SsidMapped → Provisioned ──

    /// Persist the selection. On failure the flow stays where it was.
    pub fn provision(&mut self, engine: &Engine) -> Result<ProvisionOutcome, CoreError> {
        self.require("provision", FlowStep::SsidMapped)?;

        let (Some(integration), Some(selection)) = (&self.integration, &self.selection) else {
            return Err(CoreError::Internal(
                "flow is missing its integration or selection".into(),
            ));
        };

        let outcome = engine.provisioner().provision(ProvisionRequest {
            workspace_id: self.workspace_id,
            vendor: self.vendor,
            integration_id: integration.id,
            organization_id: selection.organization_id.clone(),
            networks: selection.networks.clone(),
            tags: selection.tags.clone(),
            ssid_mapping: self.mapping.clone(),
        })?;

        self.outcome = Some(outcome);
        self.step = FlowStep::Provisioned;
        Ok(outcome)
    }

    // ── Back-navigation ──

    /// Return to the previous step, discarding what the current one chose.
    pub fn back(&mut self) -> Result<FlowStep, CoreError> {
        self.step = match self.step {
            FlowStep::VendorSelected | FlowStep::Provisioned => {
                return Err(CoreError::InvalidTransition {
                    action: "go back".into(),
                    step: self.step.to_string(),
                });
            }
            FlowStep::Authenticated => {
                self.integration = None;
                FlowStep::VendorSelected
            }
            FlowStep::ResourcesSelected => {
                self.selection = None;
                FlowStep::Authenticated
            }
            FlowStep::SsidMapped => {
                self.mapping = None;
                FlowStep::ResourcesSelected
            }
        };
        Ok(self.step)
    }
}
