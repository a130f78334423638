use crate::log::LogStream;

use serde::{Deserialize, Serialize};

/// Notification channels emitted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventChannel {
    SidecarStdout,
    SidecarStderr,
    SidecarTerminated,
}

impl EventChannel {
    pub const ALL: [EventChannel; 3] = [
        EventChannel::SidecarStdout,
        EventChannel::SidecarStderr,
        EventChannel::SidecarTerminated,
    ];

    /// Event name as seen by the webview.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::SidecarStdout => "sidecar-stdout",
            Self::SidecarStderr => "sidecar-stderr",
            Self::SidecarTerminated => "sidecar-terminated",
        }
    }

    /// Log stream carried by this channel, if any.
    pub fn log_stream(&self) -> Option<LogStream> {
        match self {
            Self::SidecarStdout => Some(LogStream::Stdout),
            Self::SidecarStderr => Some(LogStream::Stderr),
            Self::SidecarTerminated => None,
        }
    }
}

impl std::fmt::Display for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Payload of `sidecar-terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminatedPayload {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
}
