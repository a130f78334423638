//! Fan-out of sidecar notifications to any number of listeners.

use sc_facade::EventChannel;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

type Listeners = HashMap<EventChannel, Vec<mpsc::UnboundedSender<String>>>;

/// Per-channel broadcast with unbounded listener queues.
///
/// Emission holds the channel table lock, so payloads on one channel reach
/// every listener in emission order.
#[derive(Default)]
pub struct EventHub {
    listeners: Mutex<Listeners>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, channel: EventChannel) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.table().entry(channel).or_default().push(tx);
        rx
    }

    /// Send `payload` to every live listener, returning how many got it.
    pub fn emit(&self, channel: EventChannel, payload: impl Into<String>) -> usize {
        let payload = payload.into();
        let mut table = self.table();
        let Some(senders) = table.get_mut(&channel) else {
            return 0;
        };
        senders.retain(|tx| tx.send(payload.clone()).is_ok());
        senders.len()
    }

    pub fn listener_count(&self, channel: EventChannel) -> usize {
        let mut table = self.table();
        let Some(senders) = table.get_mut(&channel) else {
            return 0;
        };
        senders.retain(|tx| !tx.is_closed());
        senders.len()
    }

    /// Drop every listener. Their receivers see the channel close.
    pub fn close(&self) {
        self.table().clear();
    }

    fn table(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
