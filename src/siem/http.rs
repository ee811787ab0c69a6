//! HTTP utilities for SIEM REST API calls

use super::auth::Credentials;
use super::error::{decode_error_message, ClientError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Header the SIEM requires on every request to pass its XSRF check
pub const XSRF_HEADER: &str = "kbn-xsrf";
const XSRF_VALUE: &str = "monitoring";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status codes accepted for each HTTP method. Anything else is an error.
pub fn allowed_statuses(method: &Method) -> &'static [u16] {
    match method.as_str() {
        "POST" => &[200, 201],
        "PUT" => &[200],
        "GET" => &[200],
        "DELETE" => &[200, 204],
        _ => &[],
    }
}

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// HTTP client wrapper for SIEM API calls
///
/// Every call performs exactly one round trip. There are no retries; a
/// timeout surfaces as [`ClientError::Transport`].
#[derive(Clone)]
pub struct SiemHttpClient {
    client: Client,
    base_url: Url,
    base_path: String,
    credentials: Option<Credentials>,
    headers: BTreeMap<String, String>,
}

impl SiemHttpClient {
    /// Create a new HTTP client rooted at `base_url`
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("siem-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_url,
            base_path: String::new(),
            credentials: None,
            headers: BTreeMap::new(),
        })
    }

    /// Prefix prepended to every request path (e.g. `/api`)
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.trim_end_matches('/').to_string();
        self
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Extra headers sent with every request, in addition to the XSRF header
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Send a request and return the raw response body.
    ///
    /// `body` is sent as `application/json` when present. A status outside
    /// [`allowed_statuses`] yields [`ClientError::Status`] carrying the
    /// method, path, request body and decoded error message.
    pub async fn send_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<String> {
        let full_path = format!("{}{}", self.base_path, path);
        let url = self
            .base_url
            .join(&full_path)
            .map_err(|source| ClientError::InvalidUrl {
                url: full_path.clone(),
                source,
            })?;

        tracing::debug!("{} {}", method, full_path);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(XSRF_HEADER, XSRF_VALUE);

        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        if let Some(credentials) = &self.credentials {
            request = credentials.apply(request);
        }

        if let Some(body) = &body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let response = request.send().await.map_err(|source| ClientError::Transport {
            method: method.clone(),
            path: full_path.clone(),
            request_body: body.clone().unwrap_or_default(),
            source,
        })?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|source| ClientError::Transport {
                method: method.clone(),
                path: full_path.clone(),
                request_body: body.clone().unwrap_or_default(),
                source,
            })?;

        if !allowed_statuses(&method).contains(&status.as_u16()) {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} {} -> {} - {}",
                method,
                full_path,
                status,
                sanitize_for_log(&response_body)
            );
            return Err(ClientError::Status {
                method,
                path: full_path,
                status,
                request_body: body.unwrap_or_default(),
                message: decode_error_message(&response_body),
            });
        }

        Ok(response_body)
    }

    /// Send a request and decode the response body into `T`.
    /// An empty body decodes as JSON `null`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let payload = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(ClientError::Serialize)?;

        let response_body = self.send_raw(method.clone(), path, payload).await?;
        let text = if response_body.trim().is_empty() {
            "null"
        } else {
            response_body.as_str()
        };

        serde_json::from_str(text).map_err(|source| ClientError::Decode {
            method,
            path: format!("{}{}", self.base_path, path),
            source,
        })
    }

    /// Send a request and discard the response body
    pub async fn send_discard(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<()> {
        let payload = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(ClientError::Serialize)?;

        self.send_raw(method, path, payload).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_statuses_per_method() {
        assert_eq!(allowed_statuses(&Method::POST), &[200, 201]);
        assert_eq!(allowed_statuses(&Method::PUT), &[200]);
        assert_eq!(allowed_statuses(&Method::GET), &[200]);
        assert_eq!(allowed_statuses(&Method::DELETE), &[200, 204]);
        assert!(allowed_statuses(&Method::PATCH).is_empty());
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated, 500 bytes total"));
        assert!(sanitized.len() < 300);
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = "é".repeat(150);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("bad\nrequest\r\t"), "badrequest");
    }

    #[test]
    fn test_base_path_trailing_slash_is_trimmed() {
        let base_url = Url::parse("http://127.0.0.1:5601").unwrap();
        let client = SiemHttpClient::new(base_url, DEFAULT_TIMEOUT)
            .unwrap()
            .with_base_path("/api/");
        assert_eq!(client.base_path(), "/api");
    }
}
