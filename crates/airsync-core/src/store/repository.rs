//! CRUD operations for integrations and networks.

use std::os::raw::c_int;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::ffi::{
    SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE,
};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use uuid::Uuid;

use super::Store;
use crate::error::CoreError;
use crate::model::{
    Integration, Network, NetworkRole, NewNetwork, ProvisioningStatus, SsidBinding, SsidMapping,
    Vendor,
};

const INTEGRATION_COLUMNS: &str = "id, workspace_id, vendor, name, credentials_json, created_at";

const NETWORK_COLUMNS: &str = "id, workspace_id, integration_id, external_id, name, tags_json, \
     status, vendor_snapshot_json, ssid_mapping_json, created_at, updated_at";

const INSERT_NETWORK: &str = r"
    INSERT INTO networks (id, workspace_id, integration_id, external_id, name, tags_json,
                          status, vendor_snapshot_json, ssid_mapping_json, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
";

const UPSERT_NETWORK: &str = r"
    INSERT INTO networks (id, workspace_id, integration_id, external_id, name, tags_json,
                          status, vendor_snapshot_json, ssid_mapping_json, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    ON CONFLICT(integration_id, external_id) DO UPDATE SET
        name = excluded.name,
        tags_json = excluded.tags_json,
        status = excluded.status,
        vendor_snapshot_json = excluded.vendor_snapshot_json,
        ssid_mapping_json = excluded.ssid_mapping_json,
        updated_at = excluded.updated_at
";

// ── Row decoding ─────────────────────────────────────────────────────

fn corrupt(message: impl Into<String>) -> CoreError {
    CoreError::Storage {
        message: message.into(),
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(raw).map_err(|e| corrupt(format!("invalid stored id '{raw}': {e}")))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(format!("invalid stored timestamp '{raw}': {e}")))
}

fn parse_status(raw: &str) -> Result<ProvisioningStatus, CoreError> {
    ProvisioningStatus::from_str(raw).map_err(|_| corrupt(format!("invalid stored status '{raw}'")))
}

fn is_constraint(err: &rusqlite::Error, extended: c_int) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation && e.extended_code == extended
    )
}

/// Map a failed network write to a domain error.
fn network_write_error(err: rusqlite::Error, network: &NewNetwork) -> CoreError {
    if is_constraint(&err, SQLITE_CONSTRAINT_UNIQUE) {
        CoreError::Conflict {
            entity_type: "Network".into(),
            identifier: format!("{}/{}", network.integration_id, network.external_id),
        }
    } else if is_constraint(&err, SQLITE_CONSTRAINT_FOREIGNKEY) {
        CoreError::not_found("Integration", network.integration_id)
    } else {
        err.into()
    }
}

struct IntegrationRow {
    id: String,
    workspace_id: String,
    vendor: String,
    name: String,
    credentials_json: String,
    created_at: String,
}

impl IntegrationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            vendor: row.get(2)?,
            name: row.get(3)?,
            credentials_json: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_integration(self) -> Result<Integration, CoreError> {
        Ok(Integration {
            id: parse_uuid(&self.id)?,
            workspace_id: parse_uuid(&self.workspace_id)?,
            vendor: Vendor::from_str(&self.vendor)
                .map_err(|_| corrupt(format!("unknown stored vendor '{}'", self.vendor)))?,
            name: self.name,
            credentials: serde_json::from_str(&self.credentials_json)?,
            created_at: parse_time(&self.created_at)?,
        })
    }
}

struct NetworkRow {
    id: String,
    workspace_id: String,
    integration_id: String,
    external_id: String,
    name: String,
    tags_json: String,
    status: String,
    vendor_snapshot_json: String,
    ssid_mapping_json: String,
    created_at: String,
    updated_at: String,
}

impl NetworkRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            integration_id: row.get(2)?,
            external_id: row.get(3)?,
            name: row.get(4)?,
            tags_json: row.get(5)?,
            status: row.get(6)?,
            vendor_snapshot_json: row.get(7)?,
            ssid_mapping_json: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_network(self) -> Result<Network, CoreError> {
        Ok(Network {
            id: parse_uuid(&self.id)?,
            workspace_id: parse_uuid(&self.workspace_id)?,
            integration_id: parse_uuid(&self.integration_id)?,
            external_id: self.external_id,
            name: self.name,
            tags: serde_json::from_str(&self.tags_json)?,
            status: parse_status(&self.status)?,
            vendor_snapshot: serde_json::from_str(&self.vendor_snapshot_json)?,
            ssid_mapping: serde_json::from_str(&self.ssid_mapping_json)?,
            created_at: parse_time(&self.created_at)?,
            updated_at: parse_time(&self.updated_at)?,
        })
    }
}

fn query_networks(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Network>, CoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, NetworkRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(NetworkRow::into_network).collect()
}

fn count(n: i64) -> usize {
    usize::try_from(n).unwrap_or_default()
}

impl Store {
    // ── Integrations ─────────────────────────────────────────────────

    pub fn insert_integration(&self, integration: &Integration) -> Result<(), CoreError> {
        let conn = self.lock()?;
        conn.execute(
            r"
            INSERT INTO integrations (id, workspace_id, vendor, name, credentials_json, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                integration.id.to_string(),
                integration.workspace_id.to_string(),
                integration.vendor.to_string(),
                integration.name,
                serde_json::to_string(&integration.credentials)?,
                integration.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if is_constraint(&e, SQLITE_CONSTRAINT_PRIMARYKEY) {
                CoreError::Conflict {
                    entity_type: "Integration".into(),
                    identifier: integration.id.to_string(),
                }
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    pub fn get_integration(
        &self,
        workspace_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Integration>, CoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE id = ?1 AND workspace_id = ?2"
                ),
                params![id.to_string(), workspace_id.to_string()],
                IntegrationRow::from_row,
            )
            .optional()?;
        row.map(IntegrationRow::into_integration).transpose()
    }

    pub fn list_integrations(&self, workspace_id: Uuid) -> Result<Vec<Integration>, CoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE workspace_id = ?1 ORDER BY created_at, name"
        ))?;
        let rows = stmt
            .query_map([workspace_id.to_string()], IntegrationRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(IntegrationRow::into_integration)
            .collect()
    }

    /// Delete an integration and, through the foreign key cascade, every
    /// network under it. Returns how many networks went with it.
    pub fn delete_integration(&self, workspace_id: Uuid, id: Uuid) -> Result<usize, CoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let networks: i64 = tx.query_row(
            "SELECT COUNT(*) FROM networks WHERE integration_id = ?1",
            [id.to_string()],
            |row| row.get(0),
        )?;
        let deleted = tx.execute(
            "DELETE FROM integrations WHERE id = ?1 AND workspace_id = ?2",
            params![id.to_string(), workspace_id.to_string()],
        )?;
        if deleted == 0 {
            return Err(CoreError::not_found("Integration", id));
        }

        tx.commit()?;
        Ok(count(networks))
    }

    // ── Networks ─────────────────────────────────────────────────────

    /// Insert or update networks keyed on `(integration_id, external_id)`,
    /// all in one transaction. Existing rows keep their id and creation time.
    pub fn upsert_networks(&self, networks: &[NewNetwork]) -> Result<usize, CoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        {
            let mut stmt = tx.prepare(UPSERT_NETWORK)?;
            for network in networks {
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    network.workspace_id.to_string(),
                    network.integration_id.to_string(),
                    network.external_id,
                    network.name,
                    serde_json::to_string(&network.tags)?,
                    network.status.to_string(),
                    serde_json::to_string(&network.vendor_snapshot)?,
                    serde_json::to_string(&network.ssid_mapping)?,
                    now,
                    now,
                ])
                .map_err(|e| network_write_error(e, network))?;
            }
        }

        tx.commit()?;
        Ok(networks.len())
    }

    /// Plain insert; a duplicate `(integration_id, external_id)` is a conflict.
    pub fn insert_network(&self, new: &NewNetwork) -> Result<Network, CoreError> {
        let now = Utc::now();
        let network = Network {
            id: Uuid::new_v4(),
            workspace_id: new.workspace_id,
            integration_id: new.integration_id,
            external_id: new.external_id.clone(),
            name: new.name.clone(),
            tags: new.tags.clone(),
            status: new.status,
            vendor_snapshot: new.vendor_snapshot.clone(),
            ssid_mapping: new.ssid_mapping.clone(),
            created_at: now,
            updated_at: now,
        };

        let conn = self.lock()?;
        conn.execute(
            INSERT_NETWORK,
            params![
                network.id.to_string(),
                network.workspace_id.to_string(),
                network.integration_id.to_string(),
                network.external_id,
                network.name,
                serde_json::to_string(&network.tags)?,
                network.status.to_string(),
                serde_json::to_string(&network.vendor_snapshot)?,
                serde_json::to_string(&network.ssid_mapping)?,
                network.created_at.to_rfc3339(),
                network.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| network_write_error(e, new))?;
        Ok(network)
    }

    pub fn get_network(&self, workspace_id: Uuid, id: Uuid) -> Result<Option<Network>, CoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {NETWORK_COLUMNS} FROM networks WHERE id = ?1 AND workspace_id = ?2"
                ),
                params![id.to_string(), workspace_id.to_string()],
                NetworkRow::from_row,
            )
            .optional()?;
        row.map(NetworkRow::into_network).transpose()
    }

    pub fn list_networks(&self, workspace_id: Uuid) -> Result<Vec<Network>, CoreError> {
        let conn = self.lock()?;
        query_networks(
            &conn,
            &format!("SELECT {NETWORK_COLUMNS} FROM networks WHERE workspace_id = ?1 ORDER BY name, id"),
            [workspace_id.to_string()],
        )
    }

    pub fn list_networks_by_integration(
        &self,
        workspace_id: Uuid,
        integration_id: Uuid,
    ) -> Result<Vec<Network>, CoreError> {
        let conn = self.lock()?;
        query_networks(
            &conn,
            &format!(
                "SELECT {NETWORK_COLUMNS} FROM networks \
                 WHERE workspace_id = ?1 AND integration_id = ?2 ORDER BY name, id"
            ),
            params![workspace_id.to_string(), integration_id.to_string()],
        )
    }

    /// Read-modify-write one role's binding inside a single transaction.
    ///
    /// Fails with a validation error if the role is unassigned; the stored
    /// mapping is left untouched in that case.
    pub fn update_binding<F>(
        &self,
        network_id: Uuid,
        role: NetworkRole,
        apply: F,
    ) -> Result<SsidBinding, CoreError>
    where
        F: FnOnce(&mut SsidBinding),
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let raw: String = tx
            .query_row(
                "SELECT ssid_mapping_json FROM networks WHERE id = ?1",
                [network_id.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found("Network", network_id))?;

        let mut mapping: SsidMapping = serde_json::from_str(&raw)?;
        let binding = mapping.get_mut(role).ok_or_else(|| {
            CoreError::validation(format!("{role} is not assigned on network {network_id}"))
        })?;
        apply(binding);
        let updated = binding.clone();

        tx.execute(
            "UPDATE networks SET ssid_mapping_json = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                serde_json::to_string(&mapping)?,
                Utc::now().to_rfc3339(),
                network_id.to_string(),
            ],
        )?;
        tx.commit()?;
        Ok(updated)
    }

    /// Move a network to `status`, rejecting illegal transitions.
    pub fn set_status(&self, network_id: Uuid, status: ProvisioningStatus) -> Result<(), CoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let raw: String = tx
            .query_row(
                "SELECT status FROM networks WHERE id = ?1",
                [network_id.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found("Network", network_id))?;

        let current = parse_status(&raw)?;
        if !current.can_transition_to(status) {
            return Err(CoreError::validation(format!(
                "network {network_id} cannot move from {current} to {status}"
            )));
        }

        tx.execute(
            "UPDATE networks SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.to_string(), Utc::now().to_rfc3339(), network_id.to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }
}
