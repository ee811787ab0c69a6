//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads the SIEM resource kinds from embedded JSON and provides
//! lookup functions for the rest of the application. Each kind declares its
//! collection endpoint, identity field and the masking rules applied around
//! every write and read.

use super::mask::MaskRule;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/siem.json")];

fn default_id_field() -> String {
    "id".to_string()
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    /// Collection endpoint, relative to the API base path
    pub collection_path: String,
    /// Field carrying the server-assigned identity
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Fields the server owns; always stripped after a read
    #[serde(default)]
    pub server_managed_fields: Vec<String>,
    /// Rules evaluated before every create and update
    #[serde(default)]
    pub write_rules: Vec<MaskRule>,
    /// Extra rules evaluated after every read
    #[serde(default)]
    pub read_rules: Vec<MaskRule>,
    /// Fields the API rejects on update for this kind
    #[serde(default)]
    pub update_clear_fields: Vec<String>,
}

impl ResourceDef {
    /// Full post-read rule set: server-managed fields, the identity field,
    /// then the kind's conditional read rules
    pub fn post_read_rules(&self) -> Vec<MaskRule> {
        self.server_managed_fields
            .iter()
            .chain(std::iter::once(&self.id_field))
            .map(|key| MaskRule::always(key.as_str()))
            .chain(self.read_rules.iter().cloned())
            .collect()
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: BTreeMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get all resource keys, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect()
}
