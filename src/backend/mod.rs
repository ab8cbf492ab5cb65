//! Health query backend: wire types and the HTTP client for the query endpoint.

mod client;
mod types;


use async_trait::async_trait;

pub use client::BackendClient;
pub use types::{ConfidenceLevel, EvidenceItem, QueryRequest, RawResponse, RiskLevel};

use crate::error::BackendResult;

/// A backend able to answer a free-text health query.
///
/// Implementations perform exactly one request per call and never retry; any
/// non-success status, transport error or undecodable body is an `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Submit `text` and decode the backend's answer.
    async fn query(&self, text: &str) -> BackendResult<RawResponse>;
}
