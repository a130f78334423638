use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, timed out, or the bridge could not carry the call.
    #[error("backend unreachable: {message}")]
    Unreachable { message: String },

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to read backend response: {message}")]
    Body { message: String },
}
