use crate::bridge::HttpFailure;

use thiserror::Error;

/// Failures reported by a host bridge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The native host could not be reached at all.
    #[error("Host bridge unavailable: {message}")]
    Unavailable { message: String },

    /// The host received the command and refused it.
    #[error("{reason}")]
    Rejected { reason: String },

    /// `make_http_request` reached the host but the HTTP call failed.
    #[error(transparent)]
    Http(#[from] HttpFailure),
}

impl BridgeError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}
