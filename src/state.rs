//! Tracked resource state
//!
//! Persists the identity and last cleaned document of every resource
//! siem-sync manages, keyed by `kind/name`.

use crate::resource::Document;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const STATE_VERSION: u32 = 1;

/// One managed resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedResource {
    pub kind: String,
    pub name: String,
    /// Server-assigned identity
    pub id: String,
    /// Last document read back from the remote, masks applied
    #[serde(default)]
    pub document: Document,
    pub synced_at: DateTime<Utc>,
}

impl TrackedResource {
    pub fn new(kind: &str, name: &str, id: &str, document: Document) -> Self {
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
            id: id.to_string(),
            document,
            synced_at: Utc::now(),
        }
    }

    pub fn address(&self) -> String {
        address(&self.kind, &self.name)
    }
}

/// `kind/name` key used in the state file
pub fn address(kind: &str, name: &str) -> String {
    format!("{}/{}", kind, name)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    resources: BTreeMap<String, TrackedResource>,
}

/// JSON-file backed store of tracked resources
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: StateFile,
}

impl StateStore {
    /// Load state from disk. A missing file is an empty state.
    pub fn load(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read state file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse state file {}", path.display()))?
        } else {
            StateFile::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    /// Save state to disk
    pub fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        self.state.version = STATE_VERSION;
        let content = serde_json::to_string_pretty(&self.state)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state file {}", self.path.display()))?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, kind: &str, name: &str) -> Option<&TrackedResource> {
        self.state.resources.get(&address(kind, name))
    }

    pub fn upsert(&mut self, resource: TrackedResource) {
        self.state.resources.insert(resource.address(), resource);
    }

    pub fn remove(&mut self, kind: &str, name: &str) -> Option<TrackedResource> {
        self.state.resources.remove(&address(kind, name))
    }

    pub fn resources(&self) -> impl Iterator<Item = &TrackedResource> {
        self.state.resources.values()
    }

    pub fn len(&self) -> usize {
        self.state.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.resources.is_empty()
    }
}
