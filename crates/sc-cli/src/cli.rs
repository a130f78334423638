use crate::commands::Commands;

use std::path::PathBuf;

use clap::Parser;

pub(crate) const DEFAULT_CONFIG_DIR: &str = ".sidecar";

#[derive(Parser, Debug)]
#[command(name = "scctl")]
#[command(about = "Run and query a backend sidecar from the terminal")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Directory holding config.toml (created with defaults if missing)
    #[arg(long, global = true, value_name = "DIR", default_value = DEFAULT_CONFIG_DIR)]
    pub(crate) config: PathBuf,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    /// Pretty-print JSON responses
    #[arg(long, global = true)]
    pub(crate) pretty: bool,
}
