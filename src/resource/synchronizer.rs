//! Resource Synchronizer
//!
//! Create/Read/Update/Delete of one resource kind against its collection
//! endpoint. Documents are masked with the kind's pre-write rules before they
//! are sent and with its post-read rules after they are received. Nothing is
//! cached between calls; each operation is one round trip.

use super::error::{Operation, SyncError};
use super::mask::{self, Document};
use super::registry::{get_resource, ResourceDef};
use crate::siem::client::SiemClient;
use crate::siem::error::ClientError;
use serde_json::Value;

/// Result of a successful create or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Identity of the written resource
    pub id: String,
    /// Warnings raised by masking rules that fired
    pub warnings: Vec<String>,
}

/// Result of a successful delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// The remote had no such resource; nothing left to delete
    AlreadyGone,
}

/// Parse a desired-state document. It must be a JSON object.
pub fn parse_document(source: &str) -> Result<Document, String> {
    match serde_json::from_str::<Value>(source) {
        Ok(Value::Object(doc)) => Ok(doc),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_type_name(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// CRUD orchestration for one resource kind
pub struct ResourceSynchronizer<'a> {
    client: &'a SiemClient,
    kind: &'a str,
    def: &'a ResourceDef,
}

impl<'a> ResourceSynchronizer<'a> {
    /// Synchronizer for a kind from the embedded registry
    pub fn new(client: &'a SiemClient, kind: &'a str) -> Result<Self, SyncError> {
        let def = get_resource(kind).ok_or_else(|| SyncError::UnknownKind(kind.to_string()))?;
        Ok(Self::with_definition(client, kind, def))
    }

    /// Synchronizer for an ad-hoc definition
    pub fn with_definition(client: &'a SiemClient, kind: &'a str, def: &'a ResourceDef) -> Self {
        Self { client, kind, def }
    }

    pub fn kind(&self) -> &str {
        self.kind
    }

    pub fn definition(&self) -> &ResourceDef {
        self.def
    }

    fn item_path(&self, id: &str) -> String {
        self.client.item_path(&self.def.collection_path, id)
    }

    fn remote(&self, operation: Operation, source: ClientError) -> SyncError {
        SyncError::Remote {
            kind: self.kind.to_string(),
            operation,
            source,
        }
    }

    /// Parse the desired document and apply pre-write masks
    fn prepare(
        &self,
        operation: Operation,
        source: &str,
    ) -> Result<(Document, Vec<String>), SyncError> {
        let mut doc = parse_document(source).map_err(|reason| SyncError::Validation {
            kind: self.kind.to_string(),
            operation,
            reason,
        })?;

        let plan = mask::strip(&self.def.write_rules, &mut doc);
        if !plan.mask.is_empty() {
            tracing::debug!(
                "[{}][{}] omitting fields {:?}",
                operation,
                self.kind,
                plan.mask.keys()
            );
        }
        for warning in &plan.warnings {
            tracing::warn!("[{}][{}] {}", operation, self.kind, warning);
        }

        Ok((doc, plan.warnings))
    }

    /// Create the resource and return its server-assigned identity
    pub async fn create(&self, source: &str) -> Result<WriteOutcome, SyncError> {
        let (doc, warnings) = self.prepare(Operation::Create, source)?;

        let response: Value = self
            .client
            .post(&self.def.collection_path, &Value::Object(doc))
            .await
            .map_err(|e| self.remote(Operation::Create, e))?;

        let id = response
            .get(&self.def.id_field)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SyncError::MissingIdentity {
                kind: self.kind.to_string(),
                operation: Operation::Create,
                field: self.def.id_field.clone(),
            })?
            .to_string();

        tracing::info!("[Create][{}] created {}", self.kind, id);
        Ok(WriteOutcome { id, warnings })
    }

    /// Read the resource and return it with server-managed fields removed
    pub async fn read(&self, id: &str) -> Result<Document, SyncError> {
        let mut doc: Document = self
            .client
            .get(&self.item_path(id))
            .await
            .map_err(|e| self.not_found_or_remote(Operation::Read, id, e))?;

        mask::strip(&self.def.post_read_rules(), &mut doc);
        tracing::debug!("[Read][{}] read {}", self.kind, id);
        Ok(doc)
    }

    /// Replace the resource wholesale. The caller-held `id` always wins
    /// over any identity embedded in the document.
    pub async fn update(&self, id: &str, source: &str) -> Result<WriteOutcome, SyncError> {
        let (mut doc, warnings) = self.prepare(Operation::Update, source)?;

        for field in &self.def.update_clear_fields {
            doc.remove(field);
        }
        doc.insert(self.def.id_field.clone(), Value::String(id.to_string()));

        let _: Value = self
            .client
            .put(&self.def.collection_path, &Value::Object(doc))
            .await
            .map_err(|e| self.remote(Operation::Update, e))?;

        tracing::info!("[Update][{}] updated {}", self.kind, id);
        Ok(WriteOutcome {
            id: id.to_string(),
            warnings,
        })
    }

    /// Delete the resource. A missing resource counts as deleted.
    pub async fn delete(&self, id: &str) -> Result<Deletion, SyncError> {
        match self.client.delete(&self.item_path(id)).await {
            Ok(()) => {
                tracing::info!("[Delete][{}] deleted {}", self.kind, id);
                Ok(Deletion::Deleted)
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!("[Delete][{}] {} not found, nothing to delete", self.kind, id);
                Ok(Deletion::AlreadyGone)
            }
            Err(e) => Err(self.remote(Operation::Delete, e)),
        }
    }

    fn not_found_or_remote(&self, operation: Operation, id: &str, e: ClientError) -> SyncError {
        if e.is_not_found() {
            tracing::warn!("[{}][{}] {} not found", operation, self.kind, id);
            SyncError::NotFound {
                kind: self.kind.to_string(),
                operation,
                id: id.to_string(),
            }
        } else {
            self.remote(operation, e)
        }
    }
}
