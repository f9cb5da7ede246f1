//! HTTP client for the summarisation service.
//!
//! Uses reqwest for transport and serde_json for decoding bodies.

use crate::summary::{
    AskRequest, AskResponse, StatusResponse, SummarizeRequest, SummarizeResponse,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("recap/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("could not reach the summarisation service: {0}")]
    Network(#[from] reqwest::Error),
    #[error("summarisation service returned {0}")]
    Service(StatusCode),
    #[error("summarisation service sent a malformed response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the `/summarize` and `/ask` endpoints.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: String,
}

impl ServiceClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base address requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the service to summarise a URL
    pub async fn summarize(
        &self,
        request: &SummarizeRequest,
    ) -> Result<SummarizeResponse, ClientError> {
        tracing::debug!(url = %request.url, style = %request.style, "POST /summarize");
        let response = self
            .http
            .post(self.endpoint("/summarize"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    /// Ask a follow-up question within a session
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ClientError> {
        tracing::debug!(session = %request.session_id, "POST /ask");
        let response = self
            .http
            .post(self.endpoint("/ask"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    /// Check that the service is up
    pub async fn health(&self) -> Result<StatusResponse, ClientError> {
        let response = self.http.get(self.endpoint("/")).send().await?;
        decode(response).await
    }
}

/// Any non-2xx is a failure; its body is not inspected.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Service(status));
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
