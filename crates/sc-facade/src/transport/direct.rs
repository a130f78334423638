use crate::config::FacadeConfig;
use crate::transport::{BackendRequest, BackendResponse, BackendTransport, TransportError};

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

/// Talks to the backend over loopback HTTP.
pub struct DirectTransport {
    config: FacadeConfig,
    client: ReqwestClient,
}

impl DirectTransport {
    /// Build a client with the configured timeout and a JSON content type
    /// on every request.
    pub fn new(config: &FacadeConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = ReqwestClient::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| TransportError::Unreachable {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }
}

#[async_trait]
impl BackendTransport for DirectTransport {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, TransportError> {
        let url = self.config.url_for(&request.endpoint);
        debug!("{} {url}", request.method);

        let mut builder = self.client.request(request.method.into(), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Unreachable {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| TransportError::Body {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(BackendResponse {
            status: Some(status.as_u16()),
            body,
        })
    }
}
