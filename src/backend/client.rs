use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::types::{QueryRequest, RawResponse};
use super::QueryBackend;
use crate::config::{BackendConfig, RequestConfig};
use crate::error::{BackendError, BackendResult};

/// Client for the health query endpoint
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    query_url: String,
    request_config: RequestConfig,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(config: &BackendConfig, request_config: RequestConfig) -> BackendResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = request_config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build().map_err(BackendError::Http)?;

        Ok(Self {
            client,
            query_url: config.query_url(),
            request_config,
        })
    }

    /// Submit a query. Performs a single request; failures are not retried.
    pub async fn send_query(&self, request: &QueryRequest) -> BackendResult<RawResponse> {
        let start = Instant::now();

        match self.execute_request(request).await {
            Ok(response) => {
                info!(
                    url = %self.query_url,
                    latency_ms = start.elapsed().as_millis(),
                    evidence = response.evidence.len(),
                    "Health query succeeded"
                );
                Ok(response)
            }
            Err(e) => {
                warn!(
                    url = %self.query_url,
                    error = %e,
                    kind = e.kind(),
                    latency_ms = start.elapsed().as_millis(),
                    "Health query failed"
                );
                Err(e)
            }
        }
    }

    async fn execute_request(&self, request: &QueryRequest) -> BackendResult<RawResponse> {
        debug!(chars = request.text.len(), "Calling health query endpoint");

        let response = self
            .client
            .post(&self.query_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse {
            message: format!("Failed to parse query response: {}", e),
        })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> BackendError {
        match self.request_config.timeout_ms {
            Some(timeout_ms) if e.is_timeout() => BackendError::Timeout { timeout_ms },
            _ => BackendError::Http(e),
        }
    }

    /// Get the query endpoint URL (for testing)
    pub fn query_url(&self) -> &str {
        &self.query_url
    }
}

#[async_trait]
impl QueryBackend for BackendClient {
    async fn query(&self, text: &str) -> BackendResult<RawResponse> {
        self.send_query(&QueryRequest::new(text)).await
    }
}
