//! Native side of the sidecar desktop: owns the backend process and serves
//! the host bridge commands.

pub mod bridge;
pub mod config;
pub mod error;
pub mod event_hub;
pub mod http_proxy;
pub mod logging;
pub mod logging_settings;
pub mod program;
pub mod sidecar_settings;
pub mod supervisor;


pub use bridge::{LocalBridge, greet};
pub use config::{AppConfig, CONFIG_FILENAME, CONFIG_VERSION};
pub use error::{HostError, Result as HostResult};
pub use event_hub::EventHub;
pub use http_proxy::HttpProxy;
pub use logging::setup_logging;
pub use logging_settings::LoggingSettings;
pub use program::resolve_program;
pub use sidecar_settings::SidecarSettings;
pub use supervisor::{ALREADY_RUNNING_ACK, SPAWNED_ACK, SidecarSupervisor};
