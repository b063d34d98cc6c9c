use crate::services::multipart::UploadRequest;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to build multipart body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Request to {endpoint} failed: {source}")]
    Send {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Transport error: {0}")]
    Other(String),
}

/// What the form looks at in a response: the status and its text. The body is never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
}

impl TransportResponse {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn send(&self, request: UploadRequest) -> Result<TransportResponse, TransportError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn send(&self, request: UploadRequest) -> Result<TransportResponse, TransportError> {
        let endpoint = request.endpoint.clone();
        let form = request.into_form().map_err(TransportError::Body)?;

        tracing::debug!("POST {} (multipart)", endpoint);

        let response = self
            .client
            .post(endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|source| TransportError::Send {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        })
    }
}
