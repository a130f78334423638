//! Ways of reaching the backend's HTTP surface.

mod bridged;
mod direct;
mod error;

pub use bridged::BridgedTransport;
pub use direct::DirectTransport;
pub use error::TransportError;

use crate::bridge::HttpMethod;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A single call to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub method: HttpMethod,
    /// Path relative to the backend base URL, e.g. `/api/status`.
    pub endpoint: String,
    pub body: Option<Value>,
}

impl BackendRequest {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint, None)
    }
}

/// Raw backend response, body returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    /// HTTP status when the transport exposes it.
    pub status: Option<u16>,
    pub body: String,
}

impl BackendResponse {
    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Sends requests to the backend. Non-2xx answers are errors.
#[async_trait]
pub trait BackendTransport: Send + Sync {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, TransportError>;
}
