//! oVirt engine REST API HTTP client.
//!
//! Talks to `https://{host}:{port}/ovirt-engine/api/...` with HTTP basic
//! auth on every request. There is no session: a client lives for a single
//! lookup and is dropped afterwards.

use crate::error::{OvirtError, OvirtResult};
use crate::types::OvirtConfig;

use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const API_PATH: &str = "/ovirt-engine/api";

/// oVirt REST API client.
pub struct OvirtClient {
    client: Client,
    base_url: String,
    config: OvirtConfig,
}

impl OvirtClient {
    /// Build a client for `https://{host}:{port}/ovirt-engine/api`.
    pub fn new(config: &OvirtConfig) -> OvirtResult<Self> {
        let mut url = Url::parse("https://localhost")?;
        url.set_host(Some(&config.host))?;
        url.set_port(Some(config.port))
            .map_err(|_| OvirtError::connection(format!("Invalid port {}", config.port)))?;
        url.set_path(API_PATH);
        Self::with_base_url(config, url.as_str())
    }

    /// Build a client against an explicit API root (proxies, tests).
    pub fn with_base_url(config: &OvirtConfig, base_url: &str) -> OvirtResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OvirtError::connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config: config.clone(),
        })
    }

    /// Base URL for API calls.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &OvirtConfig {
        &self.config
    }

    /// Probe the API root; fails unless the engine answers with success.
    pub async fn test(&self) -> OvirtResult<()> {
        let resp = self.get_raw("").await.map_err(|e| match e.kind {
            crate::error::OvirtErrorKind::AuthenticationError
            | crate::error::OvirtErrorKind::Timeout => e,
            _ => OvirtError::connection(format!(
                "Connection test against {} failed: {}",
                self.base_url, e.message
            )),
        })?;
        log::debug!("oVirt engine at {} answered {}", self.base_url, resp.status());
        Ok(())
    }

    // ── HTTP helpers ────────────────────────────────────────────────

    /// GET a JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> OvirtResult<T> {
        let resp = self.get_raw(path).await?;
        Self::parse_response(resp).await
    }

    /// GET raw `Response`.
    pub async fn get_raw(&self, path: &str) -> OvirtResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        Self::check_status(resp).await
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn check_status(resp: Response) -> OvirtResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => Err(OvirtError::auth(format!("Invalid credentials: {body}"))),
            StatusCode::NOT_FOUND => Err(OvirtError::not_found(format!("Resource not found: {body}"))),
            _ => Err(OvirtError::api(code, format!("API error {code}: {body}"))),
        }
    }

    async fn parse_response<T: DeserializeOwned>(resp: Response) -> OvirtResult<T> {
        let text = resp.text().await.map_err(|e| {
            OvirtError::parse(format!("Failed to read response body: {e}"))
        })?;

        // empty collections may come back with no body at all
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };

        serde_json::from_str(text).map_err(|e| {
            let end = text.char_indices().nth(500).map_or(text.len(), |(i, _)| i);
            OvirtError::parse(format!("JSON parse error: {e} (body: {})", &text[..end]))
        })
    }
}
