use crate::config::DirectConfig;
use async_trait::async_trait;
use reqwest::header;
use thiserror::Error;
use tracing::{trace, warn};

/// Failures below the API itself: we never got a response body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// For transports not backed by reqwest.
    #[error("{0}")]
    Other(String),
}

/// Delivers a serialized envelope and hands back whatever came in return.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, body: String) -> Result<Vec<u8>, TransportError>;
}

/// The default [`Transport`], POSTing to the configured API URL via reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

/// Builds a reqwest client honoring the user agent, timeouts and TLS settings within `config`.
pub fn http_client(config: &DirectConfig) -> Result<reqwest::Client, TransportError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout())
        .danger_accept_invalid_certs(config.accept_invalid_certs);
    if let Some(read_timeout) = config.read_timeout() {
        builder = builder.timeout(read_timeout);
    }

    Ok(builder.build()?)
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, config: &DirectConfig) -> Result<Self, TransportError> {
        Ok(Self::with_client(url, http_client(config)?))
    }

    /// Shares an existing client, e.g. with the OAuth token exchange.
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, body: String) -> Result<Vec<u8>, TransportError> {
        trace!(url = %self.url, %body, "posting request");

        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .send()
            .await?;

        // The API reports its own errors within the body, so a non-2xx status
        // alone isn't a reason to discard it. Whatever we got gets decoded.
        let status = response.status();
        if !status.is_success() {
            warn!(%status, url = %self.url, "API responded with a non-success status");
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
