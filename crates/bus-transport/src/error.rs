use thiserror::Error;

pub type Result<T, E = TransportError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("broker connect failed: {0}")]
    Connect(String),
    #[error("publish to {topic} failed: {reason}")]
    Publish { topic: String, reason: String },
    #[error("transport not connected")]
    NotConnected,
    #[error("I/O error: {0}")]
    Io(String),
}
