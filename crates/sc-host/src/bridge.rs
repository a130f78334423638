//! In-process `HostBridge` backed by the supervisor, event hub and proxy.

use crate::{AppConfig, EventHub, HostError, HostResult, HttpProxy, SidecarSupervisor};

use sc_facade::{BridgeCommand, BridgeError, EventChannel, HostBridge};

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub fn greet(name: &str) -> String {
    format!("Hello, {name}! You've been greeted from Rust!")
}

/// Bridge for hosts that run the facade in the same process as the
/// supervisor, such as the CLI.
pub struct LocalBridge {
    supervisor: Arc<SidecarSupervisor>,
    hub: Arc<EventHub>,
    proxy: HttpProxy,
}

impl LocalBridge {
    pub fn new(supervisor: Arc<SidecarSupervisor>, hub: Arc<EventHub>, proxy: HttpProxy) -> Self {
        Self {
            supervisor,
            hub,
            proxy,
        }
    }

    /// Wire a hub, supervisor and proxy from configuration.
    pub fn from_config(config: &AppConfig) -> HostResult<Self> {
        let hub = Arc::new(EventHub::new());
        let supervisor = Arc::new(SidecarSupervisor::new(config.sidecar.clone(), hub.clone()));
        let proxy = HttpProxy::new(config.backend.request_timeout())?;
        Ok(Self::new(supervisor, hub, proxy))
    }

    pub fn supervisor(&self) -> &Arc<SidecarSupervisor> {
        &self.supervisor
    }

    pub fn hub(&self) -> &Arc<EventHub> {
        &self.hub
    }
}

#[async_trait]
impl HostBridge for LocalBridge {
    async fn invoke(&self, command: BridgeCommand) -> Result<String, BridgeError> {
        match command {
            BridgeCommand::StartSidecar => self.supervisor.start().await.map_err(bridge_error),
            BridgeCommand::ShutdownSidecar => {
                self.supervisor.shutdown().await.map_err(bridge_error)
            }
            BridgeCommand::Greet { name } => Ok(greet(&name)),
            BridgeCommand::MakeHttpRequest { url, options } => self
                .proxy
                .make_http_request(&url, options)
                .await
                .map_err(BridgeError::Http),
        }
    }

    fn listen(&self, channel: EventChannel) -> Result<mpsc::UnboundedReceiver<String>, BridgeError> {
        if self.supervisor.is_closed() {
            return Err(BridgeError::unavailable("sidecar host is shutting down"));
        }
        Ok(self.hub.subscribe(channel))
    }
}

fn bridge_error(e: HostError) -> BridgeError {
    match e {
        HostError::Closed { .. } => BridgeError::unavailable(e.to_string()),
        other => BridgeError::rejected(other.to_string()),
    }
}
