use crate::config::{
    default_program, default_shutdown_command, default_shutdown_timeout, default_true,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarSettings {
    /// Executable to run; bare names are looked up next to the host binary
    #[serde(default = "default_program")]
    pub program: String,

    /// Extra command-line arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the sidecar (inherits the host's when unset)
    #[serde(default)]
    pub working_dir: Option<String>,

    /// Line written to the sidecar's stdin to request shutdown
    #[serde(default = "default_shutdown_command")]
    pub shutdown_command: String,

    /// Grace period before the sidecar is terminated (seconds)
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Spawn the sidecar as soon as the host starts
    #[serde(default = "default_true")]
    pub spawn_on_startup: bool,
}

impl SidecarSettings {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for SidecarSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            working_dir: None,
            shutdown_command: default_shutdown_command(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            spawn_on_startup: true,
        }
    }
}
