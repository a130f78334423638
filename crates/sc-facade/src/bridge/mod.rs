//! Host bridge contract: named commands in, ordered notifications out.

mod bridge_command;
mod error;
mod event_channel;
mod http_failure;
mod http_request_options;

pub use bridge_command::BridgeCommand;
pub use error::BridgeError;
pub use event_channel::{EventChannel, TerminatedPayload};
pub use http_failure::HttpFailure;
pub use http_request_options::{HttpMethod, HttpRequestOptions};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Privileged native layer that owns the sidecar process.
///
/// Implementations are injected into the facade; nothing probes for a
/// bridge at runtime.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Issue a named command and wait for its acknowledgement text.
    async fn invoke(&self, command: BridgeCommand) -> Result<String, BridgeError>;

    /// Register for notifications on one channel.
    ///
    /// Payloads arrive in emission order. The bridge stops delivering once
    /// the receiver is dropped.
    fn listen(&self, channel: EventChannel) -> Result<mpsc::UnboundedReceiver<String>, BridgeError>;
}
