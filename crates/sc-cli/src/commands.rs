use sc_facade::HttpMethod;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Start the sidecar, stream its output, and stop it on Ctrl-C
    Run {
        /// Route backend calls through the host bridge instead of direct HTTP
        #[arg(long)]
        via_bridge: bool,

        /// GET these endpoints once the backend is verified
        #[arg(long = "request", value_name = "ENDPOINT")]
        requests: Vec<String>,

        /// Stop the sidecar after the requests instead of waiting for Ctrl-C
        #[arg(long)]
        exit_after_requests: bool,
    },

    /// Query the backend status endpoint
    Probe,

    /// Send one request to an already-running backend
    Request {
        /// HTTP method (GET, POST, PUT, DELETE)
        #[arg(long, short = 'X', default_value = "GET")]
        method: HttpMethod,

        /// Backend path, e.g. /api/status
        endpoint: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },
}
