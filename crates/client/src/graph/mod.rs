//! Typed accessor for the remote notebook API.
//!
//! ### Endpoints
//!
//! - `GET /v1.0/me/onenote/notebooks/{id}/sections`
//! - `GET /v1.0/me/onenote/sections/{id}/pages` with `$orderby`, `$top`, `$skip`, `$filter`
//! - `GET /v1.0/me/onenote/pages/{id}/content`
//! - `GET /v1.0/me/onenote/resources/{id}/$value`
//! - `GET /v1.0/me`
//!
//! Every call carries a bearer token from [`TokenManager`]. Non-success
//! statuses surface as `Error::Remote` with the status and response body; no
//! retries are attempted here.

pub mod request;
pub mod response;

pub use request::PageQuery;
pub use response::{Me, RemotePage, RemoteSection, ValueList};

use async_trait::async_trait;
use bytes::Bytes;
use onesync_core::{AppConfig, Error, Section};
use reqwest::{Client, Response, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::auth::TokenManager;
use crate::source::ContentSource;

/// Configuration for the remote API client.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// API root (default: https://graph.microsoft.com).
    pub base_url: String,
    /// Request timeout (default: 30s).
    pub timeout: Duration,
    /// User-agent string (default: onesync/0.1).
    pub user_agent: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graph.microsoft.com".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: "onesync/0.1".to_string(),
        }
    }
}

impl From<&AppConfig> for GraphConfig {
    fn from(config: &AppConfig) -> Self {
        Self { base_url: config.graph_base_url.clone(), timeout: config.timeout(), user_agent: config.user_agent.clone() }
    }
}

/// Remote API client.
#[derive(Clone)]
pub struct GraphClient {
    http: Client,
    base_url: Url,
    tokens: Arc<TokenManager>,
}

impl GraphClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GraphConfig, tokens: Arc<TokenManager>) -> Result<Self, Error> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::InvalidInput(format!("invalid base url {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!("base url cannot be a base: {}", config.base_url)));
        }

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url, tokens })
    }

    /// Build an endpoint URL from path segments; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url, query: &[(&str, String)], access_token: &str) -> Result<Response, Error> {
        tracing::debug!(url = %url, "remote GET");

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "remote request failed");
            return Err(Error::Remote { status: status.as_u16(), body });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T, Error> {
        let token = self.tokens.access_token().await?;
        let bytes = self
            .get(url, query, &token)
            .await?
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Fetch the signed-in account using an explicit token.
    ///
    /// Used right after a code exchange, before the token is stored.
    pub async fn me(&self, access_token: &str) -> Result<Me, Error> {
        let url = self.endpoint(&["v1.0", "me"]);
        let response = self
            .get(url, &[], access_token)
            .await?
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        serde_json::from_slice(&response).map_err(|e| Error::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContentSource for GraphClient {
    async fn sections(&self, notebook_id: &str) -> Result<Vec<Section>, Error> {
        let url = self.endpoint(&["v1.0", "me", "onenote", "notebooks", notebook_id, "sections"]);
        let list: ValueList<RemoteSection> = self.get_json(url, &[]).await?;
        Ok(list.value.into_iter().map(Section::from).collect())
    }

    async fn pages(&self, section_id: &str, query: &PageQuery) -> Result<Vec<RemotePage>, Error> {
        let url = self.endpoint(&["v1.0", "me", "onenote", "sections", section_id, "pages"]);
        let list: ValueList<RemotePage> = self.get_json(url, &query.to_pairs()).await?;
        Ok(list.value)
    }

    async fn page_content(&self, page_id: &str) -> Result<String, Error> {
        let url = self.endpoint(&["v1.0", "me", "onenote", "pages", page_id, "content"]);
        let token = self.tokens.access_token().await?;
        self.get(url, &[], &token)
            .await?
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }

    async fn resource(&self, resource_id: &str) -> Result<Bytes, Error> {
        let url = self.endpoint(&["v1.0", "me", "onenote", "resources", resource_id, "$value"]);
        let token = self.tokens.access_token().await?;
        let response = self.get(url, &[], &token).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| Error::Network(e.to_string()))?;

        tracing::debug!(resource_id, bytes = bytes.len(), content_type = ?content_type, "downloaded resource");
        Ok(bytes)
    }
}
