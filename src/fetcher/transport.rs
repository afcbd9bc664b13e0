//! HTTP transport
//!
//! This module issues the single request made for each identifier:
//! - Building the HTTP client with the configured user agent
//! - `GET {base_url}/{id}` with a per-request timeout
//! - Mapping client failures into [`TransportError`]

use crate::config::FetchConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// A response received from the endpoint, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Failures below the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Result of one request
pub type TransportResult = Result<RawResponse, TransportError>;

/// Performs one request for one identifier
///
/// Implementations must honor `timeout` and report a timeout as
/// [`TransportError::Timeout`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, id: u64, timeout: Duration) -> TransportResult;
}

/// reqwest-backed transport for `{base_url}/{id}`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

/// Builds an HTTP client with the configured user agent
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL requested for `id`
    pub fn url_for(&self, id: u64) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, id: u64, timeout: Duration) -> TransportResult {
        let response = self.client.get(self.url_for(id)).timeout(timeout).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
