//! Error types for appliance API access.

use thiserror::Error;

/// Failure of a single appliance API call.
///
/// The sampler treats every variant the same way (keep last-good state,
/// retry on the next tick); the distinction exists for logging and for the
/// one-shot actions (`unlock`) that report errors to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-2xx response other than 401.
    #[error("HTTP {0}")]
    Status(u16),
    /// HTTP 401; the operator has to log in again.
    #[error("unauthorized (login required)")]
    Unauthorized,
    /// Body could not be decoded as JSON.
    #[error("decode error: {0}")]
    Decode(String),
    /// Envelope with `ok = false`.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl FetchError {
    /// Converts a reqwest error into the transport/decode taxonomy.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
