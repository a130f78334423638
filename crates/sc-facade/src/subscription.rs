//! Handle for a live stream of sidecar notifications.

use crate::bridge::EventChannel;
use crate::error::FacadeError;
use crate::facade::Shared;
use crate::log::LogEntry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type LogCallback = Arc<dyn Fn(&LogEntry) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionState {
    Active,
    /// A channel closed under us. Delivery has stopped on every channel.
    Failed {
        channel: EventChannel,
        message: String,
    },
    Released,
}

/// Active log subscription.
///
/// Dropping the handle releases it, same as [`LogSubscription::unsubscribe`].
pub struct LogSubscription {
    id: u64,
    shared: Arc<Shared>,
    state_tx: Arc<watch::Sender<SubscriptionState>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    released: AtomicBool,
}

impl std::fmt::Debug for LogSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSubscription")
            .field("id", &self.id)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl LogSubscription {
    pub(crate) fn start(
        runtime: &Handle,
        id: u64,
        shared: Arc<Shared>,
        receivers: Vec<(EventChannel, mpsc::UnboundedReceiver<String>)>,
        callback: LogCallback,
    ) -> Self {
        let (state_tx, _) = watch::channel(SubscriptionState::Active);
        let state_tx = Arc::new(state_tx);

        let tasks = receivers
            .into_iter()
            .map(|(channel, rx)| {
                runtime.spawn(pump(
                    id,
                    channel,
                    rx,
                    shared.clone(),
                    state_tx.clone(),
                    callback.clone(),
                ))
            })
            .collect();

        Self {
            id,
            shared,
            state_tx,
            tasks: Mutex::new(tasks),
            released: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> SubscriptionState {
        self.state_tx.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.state() == SubscriptionState::Active
    }

    /// Stop delivery on every channel.
    ///
    /// Returns `false` if the handle was already released.
    pub fn unsubscribe(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }

        self.state_tx.send_replace(SubscriptionState::Released);
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for task in tasks {
            task.abort();
        }
        self.shared.release_subscription(self.id);
        debug!("Log subscription {} released", self.id);
        true
    }

    /// Wait until delivery stops.
    ///
    /// Resolves to the failure if a channel closed, `None` if the handle was
    /// released first.
    pub async fn failed(&self) -> Option<FacadeError> {
        let mut rx = self.state_tx.subscribe();
        let state = rx
            .wait_for(|state| *state != SubscriptionState::Active)
            .await
            .ok()?
            .clone();

        match state {
            SubscriptionState::Failed { channel, message } => Some(
                FacadeError::subscription_failed(format!("{channel}: {message}")),
            ),
            _ => None,
        }
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

async fn pump(
    id: u64,
    channel: EventChannel,
    mut rx: mpsc::UnboundedReceiver<String>,
    shared: Arc<Shared>,
    state_tx: Arc<watch::Sender<SubscriptionState>>,
    callback: LogCallback,
) {
    let mut state_rx = state_tx.subscribe();

    loop {
        tokio::select! {
            biased;

            payload = rx.recv() => match payload {
                Some(payload) => shared.deliver(channel, payload, callback.as_ref()),
                None => {
                    let message = "notification channel closed".to_string();
                    let failed = state_tx.send_if_modified(|state| {
                        if *state != SubscriptionState::Active {
                            return false;
                        }
                        *state = SubscriptionState::Failed {
                            channel,
                            message: message.clone(),
                        };
                        true
                    });

                    if failed {
                        warn!("Log subscription {id} failed on {channel}: {message}");
                        shared.release_subscription(id);
                        shared.record_error(
                            FacadeError::subscription_failed(format!("{channel}: {message}"))
                                .to_string(),
                        );
                    }
                    break;
                }
            },

            _ = state_rx.wait_for(|state| *state != SubscriptionState::Active) => break,
        }
    }
}
