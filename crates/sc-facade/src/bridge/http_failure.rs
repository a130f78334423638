use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a `make_http_request` call failed on the host side.
///
/// Serializable so the desktop shell can hand it to the webview unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HttpFailure {
    #[error("HTTP Error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to send request: {message}")]
    Send { message: String },

    #[error("Failed to get response text: {message} (Status: {status})")]
    Body { status: u16, message: String },
}
