//! The process-lifecycle client facade.

use crate::bridge::{
    BridgeCommand, BridgeError, EventChannel, HostBridge, HttpMethod, TerminatedPayload,
};
use crate::config::FacadeConfig;
use crate::error::{FacadeError, Result as FacadeResult};
use crate::log::{LogBook, LogEntry, LogStream};
use crate::status::{ServerStatus, StatusPayload, Transition};
use crate::subscription::LogSubscription;
use crate::transport::{
    BackendRequest, BackendResponse, BackendTransport, BridgedTransport, DirectTransport,
    TransportError,
};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Client-side view of a sidecar managed by a host bridge.
///
/// Holds the merged [`ServerStatus`] and the ordered log of sidecar output
/// for as long as the facade lives.
pub struct SidecarFacade {
    bridge: Arc<dyn HostBridge>,
    transport: Arc<dyn BackendTransport>,
    config: FacadeConfig,
    shared: Arc<Shared>,
}

impl SidecarFacade {
    pub fn new(
        bridge: Arc<dyn HostBridge>,
        transport: Arc<dyn BackendTransport>,
        config: FacadeConfig,
    ) -> Self {
        let shared = Arc::new(Shared::new(config.startup_banner.clone()));
        Self {
            bridge,
            transport,
            config,
            shared,
        }
    }

    /// Facade that reaches the backend over loopback HTTP directly.
    pub fn with_direct_transport(
        bridge: Arc<dyn HostBridge>,
        config: FacadeConfig,
    ) -> FacadeResult<Self> {
        let transport = DirectTransport::new(&config)
            .map_err(|e| FacadeError::unreachable(e.to_string()))?;
        Ok(Self::new(bridge, Arc::new(transport), config))
    }

    /// Facade that routes backend calls through `make_http_request`.
    pub fn with_bridged_transport(bridge: Arc<dyn HostBridge>, config: FacadeConfig) -> Self {
        let transport = BridgedTransport::new(bridge.clone(), config.clone());
        Self::new(bridge, Arc::new(transport), config)
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    pub fn status(&self) -> ServerStatus {
        self.shared.status_tx.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe_status(&self) -> watch::Receiver<ServerStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Message of the most recent failure, for display.
    pub fn last_error(&self) -> Option<String> {
        lock(&self.shared.last_error).clone()
    }

    /// Text of the most recent start/stop acknowledgement.
    pub fn last_acknowledgement(&self) -> Option<String> {
        lock(&self.shared.last_ack).clone()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        lock(&self.shared.log).entries().to_vec()
    }

    pub fn logs_since(&self, sequence: u64) -> Vec<LogEntry> {
        lock(&self.shared.log).since(sequence)
    }

    /// Ask the host to start the sidecar.
    ///
    /// Returns once the host acknowledges; the backend may not be reachable
    /// yet.
    pub async fn start(&self) -> FacadeResult<String> {
        self.run_command(
            BridgeCommand::StartSidecar,
            Transition::StartIssued,
            Transition::StartAcknowledged,
        )
        .await
    }

    /// Ask the host to stop the sidecar.
    pub async fn stop(&self) -> FacadeResult<String> {
        self.run_command(
            BridgeCommand::ShutdownSidecar,
            Transition::StopIssued,
            Transition::StopAcknowledged,
        )
        .await
    }

    pub async fn greet(&self, name: &str) -> FacadeResult<String> {
        let result = self
            .invoke(BridgeCommand::Greet {
                name: name.to_string(),
            })
            .await;
        self.record(result)
    }

    /// Query the backend's status endpoint.
    ///
    /// Only a successful, well-formed answer promotes the status.
    pub async fn probe_status(&self) -> FacadeResult<StatusPayload> {
        let result = self.probe().await;
        if result.is_ok() {
            self.shared.apply(Transition::ProbeVerified);
        }
        self.record(result)
    }

    async fn probe(&self) -> FacadeResult<StatusPayload> {
        let request = BackendRequest::get(self.config.status_path.clone());
        let response = self.transport.send(request).await.map_err(|e| match e {
            TransportError::Unreachable { message } => FacadeError::unreachable(message),
            other => FacadeError::unexpected_response(other.to_string()),
        })?;

        let payload: StatusPayload = response.json().map_err(|e| {
            FacadeError::unexpected_response(format!(
                "failed to parse status body: {e} (raw: {})",
                response.body
            ))
        })?;

        if let Some(expected) = &self.config.expected_status
            && payload.status != *expected
        {
            return Err(FacadeError::unexpected_response(format!(
                "backend reported status {:?}, expected {:?}",
                payload.status, expected
            )));
        }

        Ok(payload)
    }

    /// Forward a request to an arbitrary backend path.
    ///
    /// Refused without touching the network unless the status carries
    /// evidence that the backend is running.
    pub async fn request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<Value>,
    ) -> FacadeResult<BackendResponse> {
        let status = self.status();
        if !status.is_running() {
            return self.record(Err(FacadeError::precondition_failed(&status)));
        }

        let request = BackendRequest::new(method, endpoint, body);
        let result = self
            .transport
            .send(request)
            .await
            .map_err(|e| FacadeError::request_failed(endpoint, e));
        self.record(result)
    }

    pub async fn get(&self, endpoint: &str) -> FacadeResult<BackendResponse> {
        self.request(endpoint, HttpMethod::Get, None).await
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> FacadeResult<BackendResponse> {
        self.request(endpoint, HttpMethod::Post, Some(body)).await
    }

    pub async fn put(&self, endpoint: &str, body: Value) -> FacadeResult<BackendResponse> {
        self.request(endpoint, HttpMethod::Put, Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> FacadeResult<BackendResponse> {
        self.request(endpoint, HttpMethod::Delete, None).await
    }

    /// Stream sidecar output into the log and to `callback`.
    ///
    /// Fails outside a tokio runtime. Only one subscription can be active at
    /// a time; the returned handle releases it on
    /// [`LogSubscription::unsubscribe`] or drop.
    pub fn subscribe_to_logs<F>(&self, callback: F) -> FacadeResult<LogSubscription>
    where
        F: Fn(&LogEntry) + Send + Sync + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                return self.record(Err(FacadeError::subscription_failed(format!(
                    "no async runtime to deliver notifications: {e}"
                ))));
            }
        };

        let Some(id) = self.shared.claim_subscription() else {
            return self.record(Err(FacadeError::subscription_failed(
                "a log subscription is already active",
            )));
        };

        let mut receivers = Vec::with_capacity(EventChannel::ALL.len());
        for channel in EventChannel::ALL {
            match self.bridge.listen(channel) {
                Ok(rx) => receivers.push((channel, rx)),
                Err(e) => {
                    self.shared.release_subscription(id);
                    return self.record(Err(FacadeError::subscription_failed(format!(
                        "failed to listen on {channel}: {e}"
                    ))));
                }
            }
        }

        debug!("Log subscription {id} started");
        Ok(LogSubscription::start(
            &runtime,
            id,
            self.shared.clone(),
            receivers,
            Arc::new(callback),
        ))
    }

    async fn run_command(
        &self,
        command: BridgeCommand,
        issued: Transition,
        acknowledged: Transition,
    ) -> FacadeResult<String> {
        let name = command.name();
        let (previous, transient) = self.shared.transition(issued);

        match self.invoke(command).await {
            Ok(ack) => {
                info!("{name} acknowledged: {ack}");
                self.shared.apply(acknowledged);
                *lock(&self.shared.last_ack) = Some(ack.clone());
                Ok(ack)
            }
            Err(e) => {
                warn!("{name} failed: {e}");
                self.shared.apply(Transition::Revert {
                    expected: transient,
                    previous,
                });
                self.record(Err(e))
            }
        }
    }

    async fn invoke(&self, command: BridgeCommand) -> FacadeResult<String> {
        let name = command.name();
        self.bridge.invoke(command).await.map_err(|e| match e {
            BridgeError::Unavailable { message } => FacadeError::bridge_unavailable(name, message),
            BridgeError::Rejected { reason } => FacadeError::command_rejected(name, reason),
            BridgeError::Http(failure) => FacadeError::command_rejected(name, failure.to_string()),
        })
    }

    fn record<T>(&self, result: FacadeResult<T>) -> FacadeResult<T> {
        if let Err(e) = &result {
            *lock(&self.shared.last_error) = Some(e.to_string());
        }
        result
    }
}

/// State shared between the facade and its subscription tasks.
pub(crate) struct Shared {
    status_tx: watch::Sender<ServerStatus>,
    log: Mutex<LogBook>,
    last_error: Mutex<Option<String>>,
    last_ack: Mutex<Option<String>>,
    active_subscription: Mutex<Option<u64>>,
    next_subscription_id: AtomicU64,
    startup_banner: String,
}

impl Shared {
    pub(crate) fn new(startup_banner: String) -> Self {
        let (status_tx, _) = watch::channel(ServerStatus::NotStarted);
        Self {
            status_tx,
            log: Mutex::new(LogBook::new()),
            last_error: Mutex::new(None),
            last_ack: Mutex::new(None),
            active_subscription: Mutex::new(None),
            next_subscription_id: AtomicU64::new(1),
            startup_banner,
        }
    }

    /// Feed a transition through the status machine.
    pub(crate) fn apply(&self, transition: Transition) -> bool {
        let (before, after) = self.transition(transition);
        before != after
    }

    /// Apply `transition`, returning the status before and after it as one
    /// atomic step.
    pub(crate) fn transition(&self, transition: Transition) -> (ServerStatus, ServerStatus) {
        let mut observed = None;
        self.status_tx.send_if_modified(|status| {
            let before = status.clone();
            let changed = match status.next(&transition) {
                Some(next) => {
                    *status = next;
                    true
                }
                None => false,
            };
            observed = Some((before, status.clone()));
            changed
        });

        let (before, after) = observed.unwrap_or_default();
        if before != after {
            debug!("Status -> {after} ({transition:?})");
        }
        (before, after)
    }

    /// Handle one notification payload from `channel`.
    pub(crate) fn deliver(
        &self,
        channel: EventChannel,
        payload: String,
        callback: &(dyn Fn(&LogEntry) + Send + Sync),
    ) {
        match channel.log_stream() {
            Some(stream) => {
                let entry = lock(&self.log).append(stream, payload);
                if stream == LogStream::Stdout && entry.text.contains(&self.startup_banner) {
                    self.apply(Transition::BannerSeen);
                }
                callback(&entry);
            }
            None => {
                let code = serde_json::from_str::<TerminatedPayload>(&payload)
                    .map(|p| p.code)
                    .unwrap_or_else(|_| payload.trim().parse().ok());
                self.apply(Transition::ProcessExited { code });
            }
        }
    }

    pub(crate) fn record_error(&self, message: String) {
        *lock(&self.last_error) = Some(message);
    }

    fn claim_subscription(&self) -> Option<u64> {
        let mut active = lock(&self.active_subscription);
        if active.is_some() {
            return None;
        }
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        *active = Some(id);
        Some(id)
    }

    /// Free the slot if `id` still holds it.
    pub(crate) fn release_subscription(&self, id: u64) {
        let mut active = lock(&self.active_subscription);
        if *active == Some(id) {
            *active = None;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
