//! SIEM API interaction module
//!
//! This module provides the typed HTTP client used to talk to the SIEM's
//! REST API.
//!
//! # Module Structure
//!
//! - [`auth`] - HTTP basic authentication credentials
//! - [`client`] - Main SIEM client: connection settings and URL helpers
//! - [`error`] - Client error taxonomy
//! - [`http`] - Single round-trip requests with per-method status allow-lists
//!
//! # Example
//!
//! ```ignore
//! use siem_sync::siem::client::{ConnectionSettings, SiemClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = SiemClient::new(&ConnectionSettings::default())?;
//!     let rule: serde_json::Value = client.get("/detection_engine/rules?id=abc").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
