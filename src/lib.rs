//! siem-sync
//!
//! Keeps SIEM detection rules, exception containers and exception list items
//! in sync with declarative JSON documents through the SIEM's REST API.

pub mod app;
pub mod config;
pub mod resource;
pub mod siem;
pub mod state;
