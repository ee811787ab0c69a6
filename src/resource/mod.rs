//! Resource abstraction layer
//!
//! This module provides a data-driven approach to synchronizing SIEM objects.
//! Resource kinds are loaded from JSON at compile time, so a new kind only
//! needs a registry entry: its collection endpoint, identity field and masks.
//!
//! # Architecture
//!
//! - [`registry`] - Loads resource definitions from embedded JSON
//! - [`mask`] - Field masks and the rules that compute them
//! - [`synchronizer`] - Create/Read/Update/Delete against a collection
//! - [`privileges`] - Read-only privileges data source
//!
//! # Example
//!
//! ```ignore
//! use siem_sync::resource::ResourceSynchronizer;
//! use siem_sync::siem::client::SiemClient;
//!
//! async fn create_rule(client: &SiemClient, json: &str) -> anyhow::Result<String> {
//!     let sync = ResourceSynchronizer::new(client, "detection-rule")?;
//!     Ok(sync.create(json).await?.id)
//! }
//! ```

pub mod error;
pub mod mask;
pub mod privileges;
mod registry;
pub mod synchronizer;

pub use error::{Operation, SyncError};
pub use mask::{Document, FieldMask, MaskRule};
pub use privileges::{read_privileges, Privileges};
pub use registry::*;
pub use synchronizer::{parse_document, Deletion, ResourceSynchronizer, WriteOutcome};
