// ── Integration registry ──
//
// Creating an integration validates the credentials against the live
// vendor first; nothing is persisted when the vendor says no.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::{Credentials, Integration, Vendor};

pub struct Integrations<'a> {
    engine: &'a Engine,
}

impl<'a> Integrations<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Validate, seal and persist a new integration.
    pub async fn create(
        &self,
        workspace_id: Uuid,
        vendor: Vendor,
        name: &str,
        credentials: Credentials,
    ) -> Result<Integration, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("integration name must not be empty"));
        }
        if credentials.bearer_token().is_none() {
            return Err(CoreError::validation(
                "credentials must include an API key or access token",
            ));
        }

        let adapter = self.engine.registry().resolve(vendor)?;
        if !adapter.validate_credentials(&credentials).await? {
            warn!(%vendor, "vendor rejected credentials");
            return Err(CoreError::credential(format!(
                "{} rejected the supplied credentials",
                vendor.display_name()
            )));
        }

        let integration = Integration {
            id: Uuid::new_v4(),
            workspace_id,
            vendor,
            name: name.to_owned(),
            credentials: self.engine.vault().seal(&credentials)?,
            created_at: Utc::now(),
        };
        self.engine.store().insert_integration(&integration)?;

        info!(integration_id = %integration.id, %vendor, "integration created");
        Ok(integration)
    }

    pub fn list(&self, workspace_id: Uuid) -> Result<Vec<Integration>, CoreError> {
        self.engine.store().list_integrations(workspace_id)
    }

    pub fn get(&self, workspace_id: Uuid, id: Uuid) -> Result<Integration, CoreError> {
        self.engine.integration(workspace_id, id)
    }

    /// Delete an integration and its networks. Remote vendor configuration
    /// is left as it is. Returns how many networks were removed.
    pub fn delete(&self, workspace_id: Uuid, id: Uuid) -> Result<usize, CoreError> {
        let removed = self.engine.store().delete_integration(workspace_id, id)?;
        info!(integration_id = %id, networks_removed = removed, "integration deleted");
        Ok(removed)
    }
}
