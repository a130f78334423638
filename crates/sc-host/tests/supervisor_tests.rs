//! Supervisor behaviour against real child processes.

#![cfg(unix)]

mod common;

use common::{WELL_BEHAVED, next, script_settings};

use sc_facade::{EventChannel, TerminatedPayload};
use sc_host::{ALREADY_RUNNING_ACK, EventHub, HostError, SPAWNED_ACK, SidecarSupervisor};

use std::sync::Arc;
use std::time::Duration;

fn supervisor_for(script: &str) -> (SidecarSupervisor, Arc<EventHub>) {
    let hub = Arc::new(EventHub::new());
    (
        SidecarSupervisor::new(script_settings(script), hub.clone()),
        hub,
    )
}

fn terminated(payload: &str) -> TerminatedPayload {
    serde_json::from_str(payload).unwrap()
}

#[tokio::test]
async fn test_stdout_lines_relayed_in_order() {
    let (supervisor, hub) = supervisor_for("for i in 1 2 3 4 5; do echo \"line $i\"; done; read x");
    let mut stdout = hub.subscribe(EventChannel::SidecarStdout);

    assert_eq!(supervisor.start().await.unwrap(), SPAWNED_ACK);

    for i in 1..=5 {
        assert_eq!(next(&mut stdout).await, format!("line {i}"));
    }
    supervisor.terminate().await;
}

#[tokio::test]
async fn test_stderr_relayed_on_its_own_channel() {
    let (supervisor, hub) = supervisor_for(WELL_BEHAVED);
    let mut stderr = hub.subscribe(EventChannel::SidecarStderr);

    supervisor.start().await.unwrap();

    assert_eq!(next(&mut stderr).await, "INFO:     warming up");
    supervisor.terminate().await;
}

#[tokio::test]
async fn given_running_when_start_again_then_skipped() {
    let (supervisor, _hub) = supervisor_for(WELL_BEHAVED);
    supervisor.start().await.unwrap();
    let pid = supervisor.pid().await;

    assert_eq!(supervisor.start().await.unwrap(), ALREADY_RUNNING_ACK);
    assert_eq!(supervisor.pid().await, pid);

    supervisor.terminate().await;
}

#[tokio::test]
async fn given_running_when_shutdown_then_command_sent_and_exit_published() {
    let (supervisor, hub) = supervisor_for(WELL_BEHAVED);
    let mut stdout = hub.subscribe(EventChannel::SidecarStdout);
    let mut exits = hub.subscribe(EventChannel::SidecarTerminated);
    supervisor.start().await.unwrap();
    next(&mut stdout).await;

    let ack = supervisor.shutdown().await.unwrap();

    assert_eq!(ack, "'sidecar shutdown' command sent.");
    assert!(!supervisor.is_running().await);
    assert_eq!(terminated(&next(&mut exits).await).code, Some(0));
}

#[tokio::test]
async fn given_output_before_exit_then_lines_precede_termination() {
    let (supervisor, hub) = supervisor_for("echo last words; exit 3");
    let mut stdout = hub.subscribe(EventChannel::SidecarStdout);
    let mut exits = hub.subscribe(EventChannel::SidecarTerminated);

    supervisor.start().await.unwrap();

    let exit = terminated(&next(&mut exits).await);
    assert_eq!(exit.code, Some(3));
    // Readers are drained before the exit is published.
    assert_eq!(stdout.try_recv().unwrap(), "last words");
    assert!(!supervisor.is_running().await);
}

#[tokio::test]
async fn given_nothing_running_when_shutdown_then_error() {
    let (supervisor, _hub) = supervisor_for(WELL_BEHAVED);

    let err = supervisor.shutdown().await.unwrap_err();

    assert!(matches!(err, HostError::NotRunning { .. }));
    assert!(
        err.to_string()
            .starts_with("No active sidecar process to shutdown.")
    );
}

#[tokio::test]
async fn given_sidecar_ignores_shutdown_then_escalated_by_signal() {
    let (supervisor, hub) = supervisor_for("exec sleep 30");
    let mut exits = hub.subscribe(EventChannel::SidecarTerminated);
    supervisor.start().await.unwrap();

    supervisor.shutdown().await.unwrap();

    let payload = tokio::time::timeout(Duration::from_secs(10), exits.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(terminated(&payload).code, None);
}

#[tokio::test]
async fn given_running_when_terminate_then_waits_for_exit() {
    let (supervisor, hub) = supervisor_for(WELL_BEHAVED);
    let mut exits = hub.subscribe(EventChannel::SidecarTerminated);
    supervisor.start().await.unwrap();

    assert!(supervisor.terminate().await);

    assert!(!supervisor.is_running().await);
    assert!(exits.try_recv().is_ok());
    assert!(!supervisor.terminate().await);
}

#[tokio::test]
async fn given_pending_shutdown_when_terminate_then_waits_for_it() {
    let (supervisor, hub) = supervisor_for("exec sleep 30");
    let mut exits = hub.subscribe(EventChannel::SidecarTerminated);
    supervisor.start().await.unwrap();
    supervisor.shutdown().await.unwrap();

    assert!(!supervisor.terminate().await);

    assert!(exits.try_recv().is_ok());
}

#[tokio::test]
async fn given_closed_supervisor_when_start_then_closed_error() {
    let (supervisor, _hub) = supervisor_for(WELL_BEHAVED);
    supervisor.close();

    let err = supervisor.start().await.unwrap_err();

    assert!(matches!(err, HostError::Closed { .. }));
    assert!(supervisor.is_closed());
}

#[tokio::test]
async fn given_missing_binary_when_start_then_spawn_error() {
    let hub = Arc::new(EventHub::new());
    let settings = sc_host::SidecarSettings {
        program: "/nonexistent/dir/api".into(),
        ..Default::default()
    };
    let supervisor = SidecarSupervisor::new(settings, hub);

    let err = supervisor.start().await.unwrap_err();

    assert!(matches!(err, HostError::ProcessSpawn { .. }));
    assert!(!supervisor.is_running().await);
}
