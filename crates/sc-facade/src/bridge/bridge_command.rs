use crate::bridge::HttpRequestOptions;

use serde::Serialize;

/// Commands understood by the host bridge.
///
/// Serializes as `{"command": "<name>", "args": {...}}`, matching the
/// invoke payload the webview sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum BridgeCommand {
    StartSidecar,
    ShutdownSidecar,
    Greet { name: String },
    MakeHttpRequest {
        url: String,
        options: HttpRequestOptions,
    },
}

impl BridgeCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartSidecar => "start_sidecar",
            Self::ShutdownSidecar => "shutdown_sidecar",
            Self::Greet { .. } => "greet",
            Self::MakeHttpRequest { .. } => "make_http_request",
        }
    }
}
