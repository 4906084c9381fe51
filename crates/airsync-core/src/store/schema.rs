//! Database schema and initialization.

use rusqlite::Connection;

use crate::error::CoreError;

const SCHEMA_VERSION: i32 = 1;

/// Enable foreign keys and bring the schema up to the current version.
pub(super) fn init(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let version = schema_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(CoreError::Storage {
            message: format!(
                "database schema v{version} is newer than this build supports (v{SCHEMA_VERSION})"
            ),
        });
    }
    if version == 0 {
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> rusqlite::Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(0);
    }
    conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
        [version],
    )?;
    Ok(())
}

fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r"
        CREATE TABLE schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        -- Credentialed vendor connections; credentials_json holds vault ciphertext only
        CREATE TABLE integrations (
            id TEXT PRIMARY KEY,
            workspace_id TEXT NOT NULL,
            vendor TEXT NOT NULL,
            name TEXT NOT NULL,
            credentials_json TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_integrations_workspace ON integrations(workspace_id);

        -- Managed vendor networks; SSID mapping is embedded, not a table
        CREATE TABLE networks (
            id TEXT PRIMARY KEY,
            workspace_id TEXT NOT NULL,
            integration_id TEXT NOT NULL REFERENCES integrations(id) ON DELETE CASCADE,
            external_id TEXT NOT NULL,
            name TEXT NOT NULL,
            tags_json TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL,
            vendor_snapshot_json TEXT NOT NULL DEFAULT '{}',
            ssid_mapping_json TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(integration_id, external_id)
        );

        CREATE INDEX idx_networks_workspace ON networks(workspace_id);
        CREATE INDEX idx_networks_integration ON networks(integration_id);
        ",
    )
}
