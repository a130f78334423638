//! Sidecar process lifecycle: spawn, output relay, stdin shutdown, escalation.

use crate::program::resolve_program;
use crate::{EventHub, HostError, HostResult, SidecarSettings};

use sc_facade::{EventChannel, TerminatedPayload};

use std::panic::Location;
use std::process::Stdio;
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use error_location::ErrorLocation;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{Mutex, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub const SPAWNED_ACK: &str = "Sidecar spawned and monitoring started.";
pub const ALREADY_RUNNING_ACK: &str = "Sidecar is already running. Skipping spawn.";

/// Wait after SIGTERM, and again after a kill, before giving up on a process.
const KILL_GRACE: Duration = Duration::from_secs(2);
/// How long to let output readers drain once the process has exited.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Owns at most one sidecar process at a time.
///
/// Responsibilities:
/// - Spawn the sidecar with piped stdio
/// - Relay its output lines to the [`EventHub`] and to `tracing`
/// - Ask it to stop over stdin, escalating to signals if it lingers
/// - Publish its exit on `sidecar-terminated`
pub struct SidecarSupervisor {
    settings: SidecarSettings,
    hub: Arc<EventHub>,
    current: Arc<Mutex<Option<RunningSidecar>>>,
    winding_down: Mutex<Vec<JoinHandle<()>>>,
    next_generation: AtomicU64,
    closed: AtomicBool,
}

/// Handle to a spawned process. The monitor task owns the `Child`.
struct RunningSidecar {
    generation: u64,
    pid: Option<u32>,
    stdin: Option<ChildStdin>,
    kill_tx: Option<oneshot::Sender<()>>,
    exited: watch::Receiver<bool>,
}

impl SidecarSupervisor {
    pub fn new(settings: SidecarSettings, hub: Arc<EventHub>) -> Self {
        Self {
            settings,
            hub,
            current: Arc::new(Mutex::new(None)),
            winding_down: Mutex::new(Vec::new()),
            next_generation: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &SidecarSettings {
        &self.settings
    }

    /// Spawn the sidecar unless one is already running.
    pub async fn start(&self) -> HostResult<String> {
        self.ensure_open()?;

        let mut current = self.current.lock().await;
        if current.is_some() {
            info!("Sidecar is already running. Skipping spawn.");
            return Ok(ALREADY_RUNNING_ACK.into());
        }

        let program = resolve_program(&self.settings.program);
        info!("Spawning sidecar: {}", program.display());

        let mut cmd = Command::new(&program);
        cmd.args(&self.settings.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.settings.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| HostError::ProcessSpawn {
            program: program.clone(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let pid = child.id();
        info!("Spawned sidecar with PID: {pid:?}");

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(relay_lines(
                stdout,
                EventChannel::SidecarStdout,
                self.hub.clone(),
            )));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(relay_lines(
                stderr,
                EventChannel::SidecarStderr,
                self.hub.clone(),
            )));
        }

        let (kill_tx, kill_rx) = oneshot::channel();
        let (exited_tx, exited_rx) = watch::channel(false);

        *current = Some(RunningSidecar {
            generation,
            pid,
            stdin: child.stdin.take(),
            kill_tx: Some(kill_tx),
            exited: exited_rx,
        });

        tokio::spawn(monitor(
            child,
            generation,
            kill_rx,
            exited_tx,
            readers,
            self.hub.clone(),
            Arc::downgrade(&self.current),
        ));

        Ok(SPAWNED_ACK.into())
    }

    /// Write the shutdown line to the sidecar's stdin and return.
    ///
    /// If the process is still alive after the shutdown timeout it is sent
    /// SIGTERM (unix) and then killed, in the background. A failed write
    /// leaves the sidecar registered.
    pub async fn shutdown(&self) -> HostResult<String> {
        self.ensure_open()?;

        let mut current = self.current.lock().await;
        let Some(mut running) = current.take() else {
            info!("No active sidecar process to shutdown.");
            return Err(HostError::not_running());
        };

        if let Err(source) = running.send_line(&self.settings.shutdown_command).await {
            warn!("Failed to write to sidecar stdin: {source}");
            *current = Some(running);
            return Err(HostError::StdinWrite {
                source,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        drop(current);

        info!("Sent '{}' command to sidecar.", self.settings.shutdown_command);
        let timeout = self.settings.shutdown_timeout();
        let handle = tokio::spawn(wind_down(running, timeout));
        let mut winding_down = self.winding_down.lock().await;
        winding_down.retain(|h| !h.is_finished());
        winding_down.push(handle);

        Ok(format!("'{}' command sent.", self.settings.shutdown_command))
    }

    /// Stop the sidecar and wait until every process this supervisor
    /// started has exited.
    ///
    /// Returns whether a running sidecar was found.
    pub async fn terminate(&self) -> bool {
        let running = self.current.lock().await.take();
        let found = running.is_some();

        if let Some(mut running) = running {
            info!("Terminating sidecar (PID: {:?})", running.pid);
            let timeout = match running.send_line(&self.settings.shutdown_command).await {
                Ok(()) => self.settings.shutdown_timeout(),
                Err(e) => {
                    warn!("Failed to send shutdown command, killing sidecar: {e}");
                    Duration::ZERO
                }
            };
            wind_down(running, timeout).await;
        }

        let pending = std::mem::take(&mut *self.winding_down.lock().await);
        for handle in pending {
            if let Err(e) = handle.await {
                error!("Sidecar shutdown task failed: {e}");
            }
        }

        found
    }

    /// Refuse further commands. Does not stop a running sidecar.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("Sidecar supervisor closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub async fn is_running(&self) -> bool {
        self.current.lock().await.is_some()
    }

    pub async fn pid(&self) -> Option<u32> {
        self.current.lock().await.as_ref().and_then(|r| r.pid)
    }

    fn ensure_open(&self) -> HostResult<()> {
        if self.is_closed() {
            return Err(HostError::closed());
        }
        Ok(())
    }
}

impl RunningSidecar {
    async fn send_line(&mut self, line: &str) -> std::io::Result<()> {
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sidecar stdin is closed")
        })?;
        stdin.write_all(format!("{line}\n").as_bytes()).await?;
        stdin.flush().await
    }

    /// Wait up to `timeout` for the process to exit.
    async fn wait_exit(&mut self, timeout: Duration) -> bool {
        let exited = &mut self.exited;
        tokio::time::timeout(timeout, async move {
            exited.wait_for(|done| *done).await.is_ok()
        })
        .await
        .unwrap_or(false)
    }

    fn kill(&mut self) {
        if let Some(kill_tx) = self.kill_tx.take() {
            kill_tx.send(()).ok();
        }
    }

    #[cfg(unix)]
    fn terminate_signal(&self) {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        if let Some(pid) = self.pid.and_then(|p| i32::try_from(p).ok()) {
            info!("Sending SIGTERM to pid {pid}");
            kill(Pid::from_raw(pid), Signal::SIGTERM).ok();
        }
    }

    #[cfg(not(unix))]
    fn terminate_signal(&self) {}
}

/// Escalate until the process is gone: wait, SIGTERM, wait, kill.
async fn wind_down(mut running: RunningSidecar, timeout: Duration) {
    if running.wait_exit(timeout).await {
        return;
    }

    warn!(
        "Sidecar still running {}s after shutdown request",
        timeout.as_secs()
    );
    running.terminate_signal();
    if running.wait_exit(KILL_GRACE).await {
        return;
    }

    info!("Force killing sidecar process (PID: {:?})", running.pid);
    running.kill();
    if !running.wait_exit(KILL_GRACE).await {
        error!("Sidecar process (PID: {:?}) did not exit after kill", running.pid);
    }
}

/// Wait for the process to exit (or be killed), then publish the exit.
async fn monitor(
    mut child: Child,
    generation: u64,
    mut kill_rx: oneshot::Receiver<()>,
    exited_tx: watch::Sender<bool>,
    readers: Vec<JoinHandle<()>>,
    hub: Arc<EventHub>,
    current: Weak<Mutex<Option<RunningSidecar>>>,
) {
    // A dropped handle counts as a kill request, so dropping the
    // supervisor takes the process down with it.
    let status = tokio::select! {
        status = child.wait() => status,
        _ = &mut kill_rx => {
            if let Err(e) = child.start_kill() {
                warn!("Failed to kill sidecar: {e}");
            }
            child.wait().await
        }
    };

    for reader in readers {
        if tokio::time::timeout(DRAIN_TIMEOUT, reader).await.is_err() {
            warn!("Sidecar output still open after exit; stopped reading");
        }
    }

    let code = match &status {
        Ok(status) => status.code(),
        Err(e) => {
            error!("Failed to wait for sidecar: {e}");
            None
        }
    };
    info!("Sidecar exited (code: {code:?})");

    if let Some(current) = current.upgrade() {
        let mut current = current.lock().await;
        if current.as_ref().is_some_and(|r| r.generation == generation) {
            *current = None;
        }
    }

    match serde_json::to_string(&TerminatedPayload { code }) {
        Ok(payload) => {
            hub.emit(EventChannel::SidecarTerminated, payload);
        }
        Err(e) => error!("Failed to encode termination payload: {e}"),
    }
    exited_tx.send_replace(true);
}

/// Forward each output line to the hub and to the log.
async fn relay_lines<R>(reader: R, channel: EventChannel, hub: Arc<EventHub>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                info!(target: "sidecar", "[{channel}] {line}");
                hub.emit(channel, line);
            }
            Err(e) => {
                warn!("Failed to read sidecar {channel}: {e}");
                break;
            }
        }
    }
}
