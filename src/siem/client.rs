//! SIEM Client
//!
//! Main client for interacting with the SIEM API, combining connection
//! settings, authentication and HTTP functionality.

use super::auth::Credentials;
use super::error::{ClientError, Result};
use super::http::{SiemHttpClient, DEFAULT_TIMEOUT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Default API prefix
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Everything needed to reach the SIEM API
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub hostname: String,
    pub port: u16,
    pub use_tls: bool,
    pub credentials: Option<Credentials>,
    pub base_path: String,
    pub timeout: Duration,
    pub headers: BTreeMap<String, String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 443,
            use_tls: true,
            credentials: None,
            base_path: DEFAULT_BASE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            headers: BTreeMap::new(),
        }
    }
}

impl ConnectionSettings {
    fn scheme(&self) -> &'static str {
        if self.use_tls {
            "https"
        } else {
            "http"
        }
    }

    /// Credential-free root URL (`scheme://host:port/`)
    pub fn root_url(&self) -> Result<Url> {
        let raw = format!("{}://{}:{}/", self.scheme(), self.hostname, self.port);
        Url::parse(&raw).map_err(|source| ClientError::InvalidUrl { url: raw, source })
    }
}

/// Main SIEM client
#[derive(Clone)]
pub struct SiemClient {
    pub http: SiemHttpClient,
    public_url: Url,
}

impl SiemClient {
    /// Create a new SIEM client from connection settings
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let root = settings.root_url()?;

        let http = SiemHttpClient::new(root.clone(), settings.timeout)?
            .with_base_path(&settings.base_path)
            .with_credentials(settings.credentials.clone())
            .with_headers(settings.headers.clone());

        tracing::debug!(
            "SIEM client for {} (base path {})",
            root,
            http.base_path()
        );

        Ok(Self {
            http,
            public_url: root,
        })
    }

    /// Make a GET request to the SIEM API
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.http.send(Method::GET, path, None).await
    }

    /// Make a POST request to the SIEM API
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        self.http.send(Method::POST, path, Some(body)).await
    }

    /// Make a PUT request to the SIEM API
    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        self.http.send(Method::PUT, path, Some(body)).await
    }

    /// Make a DELETE request to the SIEM API, discarding the response body
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.http.send_discard(Method::DELETE, path, None).await
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Address a single object of a collection (`collection?id=...`)
    pub fn item_path(&self, collection: &str, id: &str) -> String {
        format!("{}?id={}", collection, urlencoding::encode(id))
    }

    /// Public URL for a path, without credentials or API prefix
    pub fn url(&self, path: &str) -> String {
        self.public_url
            .join(path)
            .map(|u| u.to_string())
            .unwrap_or_default()
    }
}
