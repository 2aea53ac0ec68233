//! Byte-level persistence backends for the article list.
//!
//! A backend knows one address (a file path, a bucket and key, …) and can
//! read or overwrite the opaque blob stored there. It knows nothing about
//! articles; encoding and decoding belong to [`crate::store`].
//!
//! # Backends
//!
//! | Backend | Module | Address | Missing blob |
//! |---------|--------|---------|--------------|
//! | Local file | [`disk`] | filesystem path | file does not exist |
//! | Object store | [`object_store`] | endpoint + bucket + key | HTTP 404 `NoSuchKey` |
//!
//! [`retry::RetryBackend`] wraps any backend with exponential backoff for
//! transient failures.

pub mod disk;
#[cfg(test)]
pub mod memory;
pub mod object_store;
pub mod retry;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors a backend can report while reading or writing its blob.
///
/// "Not found" is deliberately absent: a missing blob is reported as
/// `Ok(None)` from [`Backend::read`].
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("object store returned HTTP {status} ({}): {message}", .code.as_deref().unwrap_or("no error code"))]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("invalid backend address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
}

impl BackendError {
    /// Whether retrying the same call could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::WouldBlock
            ),
            BackendError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            BackendError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            BackendError::InvalidAddress { .. } => false,
        }
    }
}

/// A byte-level read/write target for one serialized article list.
pub trait Backend {
    /// Human-readable address used in logs.
    fn address(&self) -> String;

    /// Read the current blob. A blob that does not exist yet is `Ok(None)`.
    async fn read(&self) -> Result<Option<Vec<u8>>, BackendError>;

    /// Overwrite the blob with `bytes`.
    async fn write(&self, bytes: Vec<u8>) -> Result<(), BackendError>;
}
