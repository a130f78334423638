//! Subcommand implementations.

use crate::error::{CliError, Result as CliResult};

use sc_facade::{HttpMethod, LogSubscription, ServerStatus, SidecarFacade};
use sc_host::{AppConfig, LocalBridge};

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::watch;
use tracing::{info, warn};

/// Build a host bridge and a facade on top of it.
pub(crate) fn connect(
    config: &AppConfig,
    via_bridge: bool,
) -> CliResult<(Arc<LocalBridge>, SidecarFacade)> {
    let bridge = Arc::new(LocalBridge::from_config(config)?);
    let facade = if via_bridge {
        SidecarFacade::with_bridged_transport(bridge.clone(), config.backend.clone())
    } else {
        SidecarFacade::with_direct_transport(bridge.clone(), config.backend.clone())?
    };
    Ok((bridge, facade))
}

pub(crate) async fn probe(config: &AppConfig, pretty: bool) -> CliResult<String> {
    let (_bridge, facade) = connect(config, false)?;
    let payload = facade.probe_status().await?;
    let value = json!({ "status": payload.status, "version": payload.version });
    Ok(render(&value.to_string(), pretty))
}

/// Verify the backend is up, then forward one request.
pub(crate) async fn request(
    config: &AppConfig,
    method: HttpMethod,
    endpoint: &str,
    body: Option<&str>,
    pretty: bool,
) -> CliResult<String> {
    let body = body
        .map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(CliError::invalid_body)?;

    let (_bridge, facade) = connect(config, false)?;
    facade.probe_status().await?;
    let response = facade.request(endpoint, method, body).await?;
    Ok(render(response.text(), pretty))
}

pub(crate) struct RunOptions {
    pub(crate) via_bridge: bool,
    pub(crate) requests: Vec<String>,
    pub(crate) exit_after_requests: bool,
    pub(crate) pretty: bool,
}

/// Start the sidecar and stream its output until Ctrl-C, a crash, or the
/// requested calls are done.
pub(crate) async fn run(config: &AppConfig, options: RunOptions) -> CliResult<()> {
    let (bridge, facade) = connect(config, options.via_bridge)?;
    let subscription = facade.subscribe_to_logs(|entry| println!("{entry}"))?;
    let mut status_rx = facade.subscribe_status();

    let ack = facade.start().await?;
    info!("{ack}");

    let outcome = drive(&facade, &subscription, &mut status_rx, &options).await;

    if facade.status().is_running()
        && let Err(e) = facade.stop().await
    {
        warn!("Stop request failed: {e}");
    }
    bridge.supervisor().close();
    bridge.supervisor().terminate().await;
    subscription.unsubscribe();

    outcome
}

async fn drive(
    facade: &SidecarFacade,
    subscription: &LogSubscription,
    status_rx: &mut watch::Receiver<ServerStatus>,
    options: &RunOptions,
) -> CliResult<()> {
    let mut probed = false;

    loop {
        let status = facade.status();
        if let ServerStatus::Error(_) = status {
            return Err(CliError::sidecar_stopped(status));
        }

        if !probed && status == ServerStatus::RunningInferredFromLogs {
            probed = true;
            match facade.probe_status().await {
                Ok(payload) => eprintln!(
                    "Backend verified: {} ({})",
                    payload.status,
                    payload.version.as_deref().unwrap_or("unknown version")
                ),
                Err(e) => warn!("Probe after startup banner failed: {e}"),
            }

            for endpoint in &options.requests {
                let response = facade.get(endpoint).await?;
                println!("{}", render(response.text(), options.pretty));
            }
            if options.exit_after_requests {
                return Ok(());
            }
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("Interrupted, stopping sidecar...");
                return Ok(());
            }
            changed = status_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            failure = subscription.failed() => {
                return match failure {
                    Some(e) => Err(e.into()),
                    None => Ok(()),
                };
            }
        }
    }
}

/// Pretty-print JSON bodies on request; anything else passes through.
pub(crate) fn render(body: &str, pretty: bool) -> String {
    if !pretty {
        return body.to_string();
    }
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}
