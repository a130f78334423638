//! Forwarding of sidecar notifications to the webview.

use sc_facade::{EventChannel, TerminatedPayload};
use sc_host::EventHub;

use std::sync::Arc;

use serde_json::Value;
use tauri::{AppHandle, Emitter};
use tracing::{debug, warn};

/// Relay every hub channel to a webview event of the same name.
pub(crate) fn forward_to_webview(app: AppHandle, hub: &Arc<EventHub>) {
    for channel in EventChannel::ALL {
        let mut rx = hub.subscribe(channel);
        let app = app.clone();
        tauri::async_runtime::spawn(async move {
            while let Some(payload) = rx.recv().await {
                if let Err(e) = app.emit(channel.event_name(), event_payload(channel, &payload)) {
                    warn!("Failed to emit {channel}: {e}");
                }
            }
            debug!("{channel} forwarding stopped");
        });
    }
}

/// Output lines go out as strings; the exit notification as `{ "code": .. }`.
pub(crate) fn event_payload(channel: EventChannel, payload: &str) -> Value {
    match channel {
        EventChannel::SidecarTerminated => serde_json::from_str::<TerminatedPayload>(payload)
            .ok()
            .and_then(|terminated| serde_json::to_value(terminated).ok())
            .unwrap_or_else(|| Value::String(payload.to_string())),
        _ => Value::String(payload.to_string()),
    }
}
