use crate::bridge::{BridgeCommand, BridgeError, HostBridge, HttpFailure, HttpRequestOptions};
use crate::config::FacadeConfig;
use crate::transport::{BackendRequest, BackendResponse, BackendTransport, TransportError};

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

/// Routes backend calls through the host's `make_http_request` command.
pub struct BridgedTransport {
    bridge: Arc<dyn HostBridge>,
    config: FacadeConfig,
}

impl BridgedTransport {
    pub fn new(bridge: Arc<dyn HostBridge>, config: FacadeConfig) -> Self {
        Self { bridge, config }
    }

    fn options_for(request: &BackendRequest) -> HttpRequestOptions {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        HttpRequestOptions {
            method: Some(request.method),
            headers: Some(headers),
            body: request.body.as_ref().map(|b| b.to_string()),
        }
    }
}

#[async_trait]
impl BackendTransport for BridgedTransport {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, TransportError> {
        let command = BridgeCommand::MakeHttpRequest {
            url: self.config.url_for(&request.endpoint),
            options: Self::options_for(&request),
        };

        match self.bridge.invoke(command).await {
            Ok(body) => Ok(BackendResponse { status: None, body }),
            Err(BridgeError::Http(HttpFailure::Status { status, body })) => {
                Err(TransportError::Status { status, body })
            }
            Err(BridgeError::Http(HttpFailure::Body { message, .. })) => {
                Err(TransportError::Body { message })
            }
            Err(BridgeError::Http(HttpFailure::Send { message })) => {
                Err(TransportError::Unreachable { message })
            }
            Err(e @ (BridgeError::Unavailable { .. } | BridgeError::Rejected { .. })) => {
                Err(TransportError::Unreachable {
                    message: e.to_string(),
                })
            }
        }
    }
}
