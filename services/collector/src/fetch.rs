//! Source fetcher: one bounded HTTP GET per call, no retries.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use vitibrasil_parser::Dataset;

use crate::config::Config;

const USER_AGENT: &str = "Vitibrasil/1.0 (api de dados de vitivinicultura)";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned an HTML page instead of tabular data")]
    HtmlPayload { url: String },

    #[error("failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Raw payload of one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSource {
    pub url: String,
    pub content_type: String,
    pub content_hash: String,
    pub body: Vec<u8>,
}

impl FetchedSource {
    pub fn new(url: impl Into<String>, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
            content_hash: content_hash(&body),
            body,
        }
    }
}

/// `sha256:<hex>` digest of a payload.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// True when a content type announces an HTML page. The portal answers
/// missing downloads with a 200 HTML page.
pub fn is_html(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("text/html")
}

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, dataset: Dataset) -> Result<FetchedSource, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(&config.base_url, config.fetch_timeout)
    }

    pub fn source_url(&self, dataset: Dataset) -> String {
        format!("{}/{}", self.base_url, dataset.source_path())
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, dataset: Dataset) -> Result<FetchedSource, FetchError> {
        let url = self.source_url(dataset);
        info!(%dataset, %url, "fetching source");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let mime = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        if is_html(&mime) {
            return Err(FetchError::HtmlPayload { url });
        }

        let bytes = resp.bytes().await.map_err(|source| FetchError::Body {
            url: url.clone(),
            source,
        })?;

        let fetched = FetchedSource::new(url, mime, bytes.to_vec());
        debug!(
            %dataset,
            size_bytes = fetched.body.len(),
            mime = %fetched.content_type,
            hash = %fetched.content_hash,
            "downloaded source"
        );

        Ok(fetched)
    }
}
