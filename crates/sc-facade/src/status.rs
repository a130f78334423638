//! Status inference from command acknowledgements, log banners and probes.

use serde::{Deserialize, Serialize};

/// Best-effort view of the sidecar's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ServerStatus {
    #[default]
    NotStarted,
    Starting,
    StartAcknowledged,
    RunningInferredFromLogs,
    RunningVerifiedByProbe,
    Stopping,
    StopAcknowledged,
    Error(String),
}

impl ServerStatus {
    /// Rank of the running evidence behind this status.
    ///
    /// `None` for statuses that carry no evidence the backend is up.
    pub fn running_strength(&self) -> Option<u8> {
        match self {
            Self::StartAcknowledged => Some(1),
            Self::RunningInferredFromLogs => Some(2),
            Self::RunningVerifiedByProbe => Some(3),
            _ => None,
        }
    }

    /// Whether pass-through requests may be forwarded.
    pub fn is_running(&self) -> bool {
        self.running_strength().is_some()
    }

    /// Apply a transition, returning the next status if it changes anything.
    ///
    /// Running evidence is strength-ordered: a weaker signal arriving late
    /// never replaces a stronger one, and nothing promotes past a stop that
    /// is still in flight. An `Error` is only left through `StartIssued` or
    /// `ProbeVerified`.
    pub fn next(&self, transition: &Transition) -> Option<ServerStatus> {
        let next = match transition {
            Transition::StartIssued => {
                if self.is_running() || *self == Self::Starting {
                    return None;
                }
                Self::Starting
            }
            Transition::StartAcknowledged => self.promote(Self::StartAcknowledged)?,
            Transition::BannerSeen => self.promote(Self::RunningInferredFromLogs)?,
            Transition::ProbeVerified => self.promote(Self::RunningVerifiedByProbe)?,
            Transition::StopIssued => Self::Stopping,
            Transition::StopAcknowledged => Self::StopAcknowledged,
            Transition::Revert { expected, previous } => {
                if self != expected {
                    return None;
                }
                previous.clone()
            }
            Transition::ProcessExited { code } => match self {
                Self::NotStarted | Self::Stopping | Self::StopAcknowledged | Self::Error(_) => {
                    return None;
                }
                _ => Self::Error(match code {
                    Some(code) => format!("sidecar exited with code {code}"),
                    None => "sidecar terminated by signal".into(),
                }),
            },
        };

        (next != *self).then_some(next)
    }

    fn promote(&self, candidate: ServerStatus) -> Option<ServerStatus> {
        match self {
            Self::Stopping => return None,
            // Only a new start or a successful probe clears a known exit.
            Self::Error(_) if candidate != Self::RunningVerifiedByProbe => return None,
            _ => {}
        }
        match (self.running_strength(), candidate.running_strength()) {
            (Some(held), Some(incoming)) if held >= incoming => None,
            _ => Some(candidate),
        }
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => f.write_str("Not Running"),
            Self::Starting => f.write_str("Starting..."),
            Self::StartAcknowledged => f.write_str("Start command sent"),
            Self::RunningInferredFromLogs => f.write_str("Running (detected from logs)"),
            Self::RunningVerifiedByProbe => f.write_str("Running (verified by API)"),
            Self::Stopping => f.write_str("Stopping..."),
            Self::StopAcknowledged => f.write_str("Stop command sent"),
            Self::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

/// Inputs to the status machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    StartIssued,
    StartAcknowledged,
    StopIssued,
    StopAcknowledged,
    /// Undo a transient status after a failed command, unless something
    /// else has moved the status since.
    Revert {
        expected: ServerStatus,
        previous: ServerStatus,
    },
    BannerSeen,
    ProbeVerified,
    ProcessExited { code: Option<i32> },
}

/// Body of `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}
