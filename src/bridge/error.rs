//! Bridge Error Types

use thiserror::Error;

use super::validation::ValidationError;

/// Generic message used when a transport failure carries nothing useful
pub const NETWORK_ERROR_MESSAGE: &str = "Network error: unable to reach the bridge service";

/// Failure taxonomy
///
/// All kinds land in `FAILED` and are retried the same way; the kind only
/// shows up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Local, pre-network
    Validation,
    /// Round trip completed, backend declined
    Declined,
    /// Round trip itself failed
    Transport,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Declined => "declined",
            FailureKind::Transport => "transport",
        }
    }
}

/// Errors returned by a [`TransferBackend`](super::backend::TransferBackend)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend answered and said no; message is passed through verbatim
    #[error("{0}")]
    Declined(String),

    #[error("{0}")]
    Transport(String),

    /// Backend answered with something we cannot interpret
    #[error("Invalid response from bridge service: {0}")]
    MalformedResponse(String),
}

impl BackendError {
    pub fn kind(&self) -> FailureKind {
        match self {
            BackendError::Declined(_) | BackendError::MalformedResponse(_) => FailureKind::Declined,
            BackendError::Transport(_) => FailureKind::Transport,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Transport("Network error: request to bridge service timed out".into())
        } else if e.is_connect() {
            BackendError::Transport(NETWORK_ERROR_MESSAGE.into())
        } else if e.is_decode() {
            BackendError::MalformedResponse(e.to_string())
        } else {
            BackendError::Transport(format!("Network error: {}", e))
        }
    }
}

impl From<&ValidationError> for FailureKind {
    fn from(_: &ValidationError) -> Self {
        FailureKind::Validation
    }
}
