//! Application State
//!
//! Ties the SIEM client to the tracked-resource state and decides, per
//! command, which synchronizer operation to run and what to remember.

use crate::resource::{
    read_privileges, Deletion, Document, Privileges, ResourceSynchronizer, SyncError,
};
use crate::siem::client::SiemClient;
use crate::state::{StateStore, TrackedResource};
use anyhow::{Context, Result};
use futures::future::join_all;

/// What `apply` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyAction {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub action: ApplyAction,
    pub resource: TrackedResource,
    pub warnings: Vec<String>,
}

/// Outcome of refreshing every tracked resource
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: Vec<String>,
    /// Gone remotely; no longer tracked
    pub dropped: Vec<String>,
    /// Address and error message of reads that failed
    pub failed: Vec<(String, String)>,
}

/// Main application state
pub struct App {
    pub client: SiemClient,
    pub state: StateStore,
}

impl App {
    pub fn new(client: SiemClient, state: StateStore) -> Self {
        Self { client, state }
    }

    /// Create or update a resource from its desired JSON document, then read
    /// it back so the stored document matches the remote
    pub async fn apply(&mut self, kind: &str, name: &str, source: &str) -> Result<ApplyReport> {
        let sync = ResourceSynchronizer::new(&self.client, kind)?;

        let (action, outcome) = match self.state.get(kind, name) {
            Some(tracked) => (ApplyAction::Updated, sync.update(&tracked.id, source).await?),
            None => (ApplyAction::Created, sync.create(source).await?),
        };

        // Track the new identity before reading back so a failed read
        // cannot orphan the remote resource
        if action == ApplyAction::Created {
            self.state.upsert(TrackedResource::new(kind, name, &outcome.id, Document::new()));
            self.state.save()?;
        }

        let document = sync
            .read(&outcome.id)
            .await
            .with_context(|| format!("{} {} was written but could not be read back", kind, name))?;

        let resource = TrackedResource::new(kind, name, &outcome.id, document);
        self.state.upsert(resource.clone());
        self.state.save()?;

        Ok(ApplyReport {
            action,
            resource,
            warnings: outcome.warnings,
        })
    }

    /// Re-read every tracked resource concurrently. Resources that no longer
    /// exist remotely stop being tracked.
    pub async fn refresh(&mut self) -> Result<RefreshReport> {
        let tracked: Vec<TrackedResource> = self.state.resources().cloned().collect();
        let client = &self.client;

        let reads = tracked.iter().map(|resource| async move {
            match ResourceSynchronizer::new(client, &resource.kind) {
                Ok(sync) => sync.read(&resource.id).await,
                Err(e) => Err(e),
            }
        });
        let results: Vec<std::result::Result<Document, SyncError>> = join_all(reads).await;

        let mut report = RefreshReport::default();
        for (resource, result) in tracked.into_iter().zip(results) {
            let address = resource.address();
            match result {
                Ok(document) => {
                    self.state.upsert(TrackedResource::new(
                        &resource.kind,
                        &resource.name,
                        &resource.id,
                        document,
                    ));
                    report.refreshed.push(address);
                }
                Err(e) if e.is_not_found() => {
                    tracing::warn!("{} not found remotely, dropping it from state", address);
                    self.state.remove(&resource.kind, &resource.name);
                    report.dropped.push(address);
                }
                Err(e) => report.failed.push((address, e.to_string())),
            }
        }

        self.state.save()?;
        Ok(report)
    }

    /// Delete a tracked resource and forget it
    pub async fn destroy(&mut self, kind: &str, name: &str) -> Result<Deletion> {
        let tracked = self
            .state
            .get(kind, name)
            .with_context(|| format!("{} is not tracked", crate::state::address(kind, name)))?;

        let sync = ResourceSynchronizer::new(&self.client, kind)?;
        let deletion = sync.delete(&tracked.id).await?;

        self.state.remove(kind, name);
        self.state.save()?;
        Ok(deletion)
    }

    /// Start tracking an existing remote resource by identity
    pub async fn import(&mut self, kind: &str, name: &str, id: &str) -> Result<TrackedResource> {
        let sync = ResourceSynchronizer::new(&self.client, kind)?;
        let document = sync.read(id).await?;

        let resource = TrackedResource::new(kind, name, id, document);
        self.state.upsert(resource.clone());
        self.state.save()?;
        Ok(resource)
    }

    pub async fn privileges(&self) -> Result<Privileges> {
        Ok(read_privileges(&self.client).await?)
    }
}
