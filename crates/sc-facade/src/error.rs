use crate::transport::TransportError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FacadeError {
    #[error("Host bridge unavailable for {command}: {message} {location}")]
    BridgeUnavailable {
        command: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("Command {command} rejected: {reason} {location}")]
    CommandRejected {
        command: &'static str,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Backend unreachable: {message} {location}")]
    Unreachable {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unexpected backend response: {message} {location}")]
    UnexpectedResponse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Backend not running (status: {status}) {location}")]
    PreconditionFailed {
        status: String,
        location: ErrorLocation,
    },

    #[error("Request to {endpoint} failed: {source} {location}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: TransportError,
        location: ErrorLocation,
    },

    #[error("Log subscription failed: {message} {location}")]
    SubscriptionFailed {
        message: String,
        location: ErrorLocation,
    },
}

impl FacadeError {
    #[track_caller]
    pub fn bridge_unavailable(command: &'static str, message: impl Into<String>) -> Self {
        Self::BridgeUnavailable {
            command,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn command_rejected(command: &'static str, reason: impl Into<String>) -> Self {
        Self::CommandRejected {
            command,
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn precondition_failed(status: impl ToString) -> Self {
        Self::PreconditionFailed {
            status: status.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn request_failed(endpoint: impl Into<String>, source: TransportError) -> Self {
        Self::RequestFailed {
            endpoint: endpoint.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn subscription_failed(message: impl Into<String>) -> Self {
        Self::SubscriptionFailed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::BridgeUnavailable { .. }
                | Self::Unreachable { .. }
                | Self::PreconditionFailed { .. }
                | Self::SubscriptionFailed { .. }
        )
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::BridgeUnavailable { .. } => {
                "The desktop host is not available. \
                   Run the application inside the desktop shell."
            }
            Self::CommandRejected { .. } => {
                "The host refused the command. \
                   Check the sidecar logs for details."
            }
            Self::Unreachable { .. } => {
                "The backend is not answering yet. \
                   Wait for it to finish starting, then try again."
            }
            Self::UnexpectedResponse { .. } => {
                "The backend answered with something unexpected. \
                   Another program may be using the backend port."
            }
            Self::PreconditionFailed { .. } => {
                "Server may not be running. Try starting it or check logs."
            }
            Self::SubscriptionFailed { .. } => {
                "Log streaming stopped. Subscribe again to resume."
            }
            Self::RequestFailed { .. } => {
                "The request did not complete. Please check the logs for details."
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FacadeError>;
