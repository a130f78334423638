//! Shared fixtures for facade integration tests.

#![allow(dead_code)]

use sc_facade::{BridgeCommand, BridgeError, EventChannel, HostBridge};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub const START_ACK: &str = "Sidecar spawned and monitoring started.";
pub const STOP_ACK: &str = "Shutdown command sent to sidecar.";
pub const BANNER: &str = "INFO:     Uvicorn running on http://127.0.0.1:4040 (Press CTRL+C to quit)";

/// In-memory host bridge with scripted command results.
#[derive(Default)]
pub struct FakeBridge {
    responses: Mutex<HashMap<&'static str, Result<String, BridgeError>>>,
    invocations: Mutex<Vec<BridgeCommand>>,
    listeners: Mutex<HashMap<EventChannel, Vec<mpsc::UnboundedSender<String>>>>,
    failing_channel: Mutex<Option<EventChannel>>,
}

impl FakeBridge {
    pub fn new() -> Arc<Self> {
        let bridge = Self::default();
        bridge.respond("start_sidecar", Ok(START_ACK.into()));
        bridge.respond("shutdown_sidecar", Ok(STOP_ACK.into()));
        Arc::new(bridge)
    }

    pub fn respond(&self, command: &'static str, result: Result<String, BridgeError>) {
        self.responses.lock().unwrap().insert(command, result);
    }

    pub fn invocations(&self) -> Vec<BridgeCommand> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn fail_listen_on(&self, channel: EventChannel) {
        *self.failing_channel.lock().unwrap() = Some(channel);
    }

    /// Deliver a payload, returning how many listeners received it.
    pub fn emit(&self, channel: EventChannel, payload: &str) -> usize {
        let mut listeners = self.listeners.lock().unwrap();
        let senders = listeners.entry(channel).or_default();
        senders.retain(|tx| tx.send(payload.to_string()).is_ok());
        senders.len()
    }

    /// Drop every sender for `channel`, closing listeners' receivers.
    pub fn close(&self, channel: EventChannel) {
        self.listeners.lock().unwrap().remove(&channel);
    }

    pub fn listener_count(&self, channel: EventChannel) -> usize {
        let mut listeners = self.listeners.lock().unwrap();
        let senders = listeners.entry(channel).or_default();
        senders.retain(|tx| !tx.is_closed());
        senders.len()
    }
}

#[async_trait]
impl HostBridge for FakeBridge {
    async fn invoke(&self, command: BridgeCommand) -> Result<String, BridgeError> {
        let name = command.name();
        let greeting = match &command {
            BridgeCommand::Greet { name } => {
                Some(format!("Hello, {name}! You've been greeted from Rust!"))
            }
            _ => None,
        };
        self.invocations.lock().unwrap().push(command);

        if let Some(greeting) = greeting {
            return Ok(greeting);
        }
        self.responses
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_else(|| Err(BridgeError::unavailable(format!("no handler for {name}"))))
    }

    fn listen(&self, channel: EventChannel) -> Result<mpsc::UnboundedReceiver<String>, BridgeError> {
        if *self.failing_channel.lock().unwrap() == Some(channel) {
            return Err(BridgeError::unavailable("event system not ready"));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners
            .lock()
            .unwrap()
            .entry(channel)
            .or_default()
            .push(tx);
        Ok(rx)
    }
}

/// Poll `check` until it holds or a second passes.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
