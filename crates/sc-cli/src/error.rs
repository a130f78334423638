use sc_facade::FacadeError;
use sc_host::HostError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum CliError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Facade(#[from] FacadeError),

    #[error("Invalid JSON body: {source} {location}")]
    InvalidBody {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Sidecar stopped unexpectedly: {status} {location}")]
    SidecarStopped {
        status: String,
        location: ErrorLocation,
    },
}

impl CliError {
    #[track_caller]
    pub(crate) fn invalid_body(source: serde_json::Error) -> Self {
        Self::InvalidBody {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn sidecar_stopped(status: impl ToString) -> Self {
        Self::SidecarStopped {
            status: status.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub(crate) fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Host(e) => e.recovery_hint(),
            Self::Facade(e) => e.recovery_hint(),
            Self::InvalidBody { .. } => "Pass the body as a JSON document, e.g. --body '{\"a\":1}'.",
            Self::SidecarStopped { .. } => "Check the sidecar output above for the cause.",
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, CliError>;
