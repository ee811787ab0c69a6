//! Privileges data source
//!
//! Read-only view of what the configured user may do in the detection engine.

use super::error::{Operation, SyncError};
use crate::siem::client::SiemClient;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub const PRIVILEGES_PATH: &str = "/detection_engine/privileges";
const PRIVILEGES_KIND: &str = "privileges";

/// Response of the privileges endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegesResponse {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub has_all_requested: bool,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub has_encryption_key: bool,
    /// Cluster privilege name -> granted
    #[serde(default)]
    pub cluster: BTreeMap<String, bool>,
    /// Index name -> privilege name -> granted
    #[serde(default)]
    pub index: BTreeMap<String, BTreeMap<String, bool>>,
}

impl PrivilegesResponse {
    pub fn missing_cluster_privileges(&self) -> Vec<&str> {
        self.cluster
            .iter()
            .filter(|(_, granted)| !**granted)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Privileges {
    /// Stable identity derived from the username
    pub id: String,
    #[serde(flatten)]
    pub response: PrivilegesResponse,
}

/// Lowercase hex SHA-256 of the username
pub fn privileges_id(username: &str) -> String {
    hex::encode(Sha256::digest(username.as_bytes()))
}

pub async fn read_privileges(client: &SiemClient) -> Result<Privileges, SyncError> {
    let response: PrivilegesResponse = client
        .get(PRIVILEGES_PATH)
        .await
        .map_err(|source| SyncError::Remote {
            kind: PRIVILEGES_KIND.to_string(),
            operation: Operation::Read,
            source,
        })?;

    tracing::trace!("read privileges for {}", response.username);

    Ok(Privileges {
        id: privileges_id(&response.username),
        response,
    })
}
