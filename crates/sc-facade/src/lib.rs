//! Process-lifecycle client facade for a locally-run backend sidecar.
//!
//! The facade talks to two collaborators it never owns:
//! - a [`HostBridge`] that spawns/stops the sidecar and relays its output
//! - a [`BackendTransport`] that reaches the sidecar's HTTP surface
//!
//! Both are injected at construction. The facade merges command
//! acknowledgements, log banners and HTTP probes into a single
//! [`ServerStatus`].

pub mod bridge;
pub mod config;
pub mod error;
pub mod facade;
pub mod log;
pub mod status;
pub mod subscription;
pub mod transport;

#[cfg(test)]
mod tests;

pub use bridge::{
    BridgeCommand, BridgeError, EventChannel, HostBridge, HttpFailure, HttpMethod,
    HttpRequestOptions, TerminatedPayload,
};
pub use config::FacadeConfig;
pub use error::{FacadeError, Result as FacadeResult};
pub use facade::SidecarFacade;
pub use log::{LogBook, LogEntry, LogStream};
pub use status::{ServerStatus, StatusPayload, Transition};
pub use subscription::{LogSubscription, SubscriptionState};
pub use transport::{
    BackendRequest, BackendResponse, BackendTransport, BridgedTransport, DirectTransport,
    TransportError,
};
