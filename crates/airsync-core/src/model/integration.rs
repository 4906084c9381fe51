use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::EncryptedCredentials;
use super::vendor::Vendor;

/// A workspace's credentialed connection to one vendor controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub vendor: Vendor,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub credentials: EncryptedCredentials,
    pub created_at: DateTime<Utc>,
}
