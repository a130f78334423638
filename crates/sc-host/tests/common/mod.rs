//! Shared fixtures: shell-script sidecars and bounded receives.

#![allow(dead_code)]

use sc_host::SidecarSettings;

use std::time::Duration;

use tokio::sync::mpsc;

pub const BANNER_LINE: &str = "INFO:     Uvicorn running on http://127.0.0.1:4040 (Press CTRL+C to quit)";

/// Prints a startup banner and exits cleanly on `sidecar shutdown`.
pub const WELL_BEHAVED: &str = r#"
echo "INFO:     Started server process"
echo "INFO:     Uvicorn running on http://127.0.0.1:4040 (Press CTRL+C to quit)"
echo "INFO:     warming up" >&2
while read line; do
  if [ "$line" = "sidecar shutdown" ]; then
    echo "shutting down"
    exit 0
  fi
done
"#;

pub fn script_settings(script: &str) -> SidecarSettings {
    SidecarSettings {
        program: "/bin/sh".into(),
        args: vec!["-c".into(), script.into()],
        shutdown_timeout_secs: 1,
        ..SidecarSettings::default()
    }
}

/// Receive one payload or panic after five seconds.
pub async fn next(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for payload")
        .expect("channel closed")
}

/// Poll `check` until it holds or five seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
