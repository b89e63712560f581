use thiserror::Error;

pub type Result<T, E = SensorError> = core::result::Result<T, E>;

/// Failure kinds surfaced by the registry and read pipeline.
///
/// Callers map these onto their own surfaces (for example HTTP status codes),
/// so the three kinds stay distinguishable: an unregistered sensor or missing
/// device file is `NotFound`, malformed driver text is `Parse`, and every
/// other read-path failure (I/O, CRC mismatch, wrapped parse error) is `Read`.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("parse failure: {0}")]
    Parse(String),
    #[error("read failure: {0}")]
    Read(String),
}
