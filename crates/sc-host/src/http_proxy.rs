//! HTTP pass-through used by `make_http_request`.

use crate::HostResult;

use sc_facade::{HttpFailure, HttpRequestOptions};

use std::time::Duration;

use reqwest::Client as ReqwestClient;
use tracing::debug;

/// Performs HTTP calls on behalf of a client that cannot reach the
/// backend itself.
#[derive(Clone)]
pub struct HttpProxy {
    client: ReqwestClient,
}

impl HttpProxy {
    pub fn new(timeout: Duration) -> HostResult<Self> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Send the request and return the body of a 2xx answer.
    pub async fn make_http_request(
        &self,
        url: &str,
        options: HttpRequestOptions,
    ) -> Result<String, HttpFailure> {
        let method = options.method();
        debug!("make_http_request {method} {url}");

        let mut builder = self.client.request(method.into(), url);
        for (name, value) in options.headers.iter().flatten() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| HttpFailure::Send {
            message: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| HttpFailure::Body {
            status: status.as_u16(),
            message: e.to_string(),
        })?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(HttpFailure::Status {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}
