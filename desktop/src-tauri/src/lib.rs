mod commands;
mod events;


use sc_host::{AppConfig, EventHub, HttpProxy, SidecarSupervisor, setup_logging};

use std::sync::Arc;

use tauri::{AppHandle, Manager, RunEvent};
use tracing::{error, info, warn};

const DATA_DIR: &str = ".sidecar";

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            // Focus existing window on second instance attempt
            if let Some(window) = app.get_webview_window("main") {
                window.show().ok();
                window.set_focus().ok();
            }
        }))
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?.join(DATA_DIR);
            std::fs::create_dir_all(&data_dir)?;

            let config = AppConfig::load_or_create(&data_dir)?;
            setup_logging(&data_dir, &config.logging)?;

            info!("Starting Sidecar Desktop v{}", env!("CARGO_PKG_VERSION"));
            info!("Data directory: {:?}", data_dir);

            let hub = Arc::new(EventHub::new());
            let supervisor = Arc::new(SidecarSupervisor::new(config.sidecar.clone(), hub.clone()));
            let proxy = HttpProxy::new(config.backend.request_timeout())?;

            app.manage(hub.clone());
            app.manage(supervisor.clone());
            app.manage(proxy);

            events::forward_to_webview(app.handle().clone(), &hub);

            #[cfg(unix)]
            install_signal_handlers(app.handle().clone());

            if config.sidecar.spawn_on_startup {
                tauri::async_runtime::spawn(async move {
                    match supervisor.start().await {
                        Ok(ack) => info!("{ack}"),
                        Err(e) => error!("Failed to start sidecar: {e} ({})", e.recovery_hint()),
                    }
                });
            }

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::start_sidecar,
            commands::shutdown_sidecar,
            commands::greet,
            commands::make_http_request,
            commands::toggle_fullscreen,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| {
            if let RunEvent::ExitRequested { api, code, .. } = event {
                info!("Exit requested (code: {:?})", code);
                api.prevent_exit();

                tauri::async_runtime::block_on(stop_sidecar(app_handle));

                std::process::exit(code.unwrap_or(0));
            }
        });
}

/// Refuse new commands and wait for the sidecar to exit.
async fn stop_sidecar(app: &AppHandle) {
    let Some(supervisor) = app.try_state::<Arc<SidecarSupervisor>>() else {
        return;
    };

    supervisor.close();
    if supervisor.terminate().await {
        info!("Sidecar stopped");
    } else {
        info!("No sidecar running at exit");
    }

    if let Some(hub) = app.try_state::<Arc<EventHub>>() {
        hub.close();
    }
}

#[cfg(unix)]
fn install_signal_handlers(app: AppHandle) {
    std::thread::spawn(move || {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = match Signals::new([SIGINT, SIGTERM]) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to register signal handlers: {e}");
                return;
            }
        };

        if let Some(sig) = signals.forever().next() {
            info!("Received signal {sig}, shutting down...");
            tauri::async_runtime::block_on(stop_sidecar(&app));
            std::process::exit(0);
        }
    });
}
