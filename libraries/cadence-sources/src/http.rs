//! HTTP catalog client
//!
//! Talks to the JSON bridge APIs the player fronts each remote service
//! with. One [`HttpCatalog`] instance per catalog, configured with that
//! bridge's base URL and, for authenticated catalogs, a credential store
//! to attach session tokens from.

use crate::catalog::{Catalog, CatalogMatch, CredentialStore};
use crate::error::{Result, SourceError};
use async_trait::async_trait;
use cadence_core::SourceKind;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct StreamUrlResponse {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<CatalogMatch>,
}

/// A [`Catalog`] backed by a JSON bridge API over HTTP.
pub struct HttpCatalog {
    http: Client,
    base_url: String,
    kind: SourceKind,
    credentials: Option<Arc<dyn CredentialStore>>,
}

impl HttpCatalog {
    /// Create a client for one catalog bridge.
    pub fn new(kind: SourceKind, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(SourceError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SourceError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Cadence/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SourceError::Request)?;

        Ok(Self {
            http,
            base_url,
            kind,
            credentials: None,
        })
    }

    /// Attach a credential store; requests carry its session token as a
    /// bearer header when one is stored for this catalog.
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// The catalog this client fronts.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let mut request = self.http.get(url).query(query);
        if let Some(credentials) = &self.credentials {
            if let Some(token) = credentials.session(self.kind).await {
                request = request.bearer_auth(token);
            }
        }

        request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                SourceError::Unreachable(e.to_string())
            } else {
                SourceError::Request(e)
            }
        })
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn stream_url(&self, track_id: &str) -> Result<Option<String>> {
        let url = format!("{}/api/track/{}/url", self.base_url, track_id);
        debug!(catalog = %self.kind, track = %track_id, "stream lookup");

        let response = self.get(&url, &[]).await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::CatalogError {
                status: status.as_u16(),
                message,
            });
        }

        let body: StreamUrlResponse = response.json().await.map_err(|e| {
            SourceError::ParseError(format!("Failed to parse stream response: {}", e))
        })?;
        Ok(body.url.filter(|u| !u.is_empty()))
    }

    async fn search(&self, title: &str, artist: &str) -> Result<Option<CatalogMatch>> {
        let url = format!("{}/api/search", self.base_url);
        debug!(catalog = %self.kind, title = %title, artist = %artist, "search");

        let response = self
            .get(&url, &[("title", title), ("artist", artist)])
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::CatalogError {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            SourceError::ParseError(format!("Failed to parse search response: {}", e))
        })?;
        Ok(body.matches.into_iter().next())
    }
}
