//! Tauri IPC commands for frontend communication.

use sc_facade::{HttpFailure, HttpRequestOptions};
use sc_host::{HttpProxy, SidecarSupervisor};

use std::sync::Arc;

use tauri::{State, WebviewWindow};
use tracing::error;

/// Spawn the sidecar, or report that it is already running.
#[tauri::command]
pub async fn start_sidecar(
    supervisor: State<'_, Arc<SidecarSupervisor>>,
) -> Result<String, String> {
    supervisor.start().await.map_err(|e| {
        error!("start_sidecar failed: {e}");
        e.to_string()
    })
}

/// Ask the sidecar to exit over stdin.
#[tauri::command]
pub async fn shutdown_sidecar(
    supervisor: State<'_, Arc<SidecarSupervisor>>,
) -> Result<String, String> {
    supervisor.shutdown().await.map_err(|e| {
        error!("shutdown_sidecar failed: {e}");
        e.to_string()
    })
}

#[tauri::command]
pub fn greet(name: &str) -> String {
    sc_host::greet(name)
}

/// HTTP pass-through for a webview that cannot reach the backend itself.
#[tauri::command]
pub async fn make_http_request(
    proxy: State<'_, HttpProxy>,
    url: String,
    options: Option<HttpRequestOptions>,
) -> Result<String, HttpFailure> {
    proxy
        .make_http_request(&url, options.unwrap_or_default())
        .await
}

#[tauri::command]
pub fn toggle_fullscreen(window: WebviewWindow) -> Result<(), String> {
    let fullscreen = window.is_fullscreen().map_err(|e| e.to_string())?;
    window
        .set_fullscreen(!fullscreen)
        .map_err(|e| e.to_string())
}
