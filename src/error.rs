use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

impl From<serde_json::Error> for CoordinatorError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(format!("JSON decoding error: {}", err))
    }
}

impl From<reqwest::Error> for CoordinatorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(format!("Response body error: {}", err))
        } else if let Some(status) = err.status() {
            Self::HttpStatus(status.as_u16())
        } else {
            Self::NetworkFailure(format!("Request error: {}", err))
        }
    }
}

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Geolocation is not supported on this device")]
    GeolocationUnsupported,

    #[error("Location permission denied: {0}")]
    PermissionDenied(String),

    #[error("Location request timed out after {0:?}")]
    LocationTimeout(Duration),

    #[error("Device is offline")]
    Offline,

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Server responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Clipboard write failed: {0}")]
    ClipboardFailure(String),
}

impl CoordinatorError {
    /// Classify the failure into the taxonomy that drives recovery.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoordinatorError::ConfigError(_) => ErrorKind::Config,
            CoordinatorError::GeolocationUnsupported => ErrorKind::CapabilityUnavailable,
            CoordinatorError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            CoordinatorError::LocationTimeout(_) => ErrorKind::Timeout,
            CoordinatorError::Offline
            | CoordinatorError::NetworkFailure(_)
            | CoordinatorError::HttpStatus(_) => ErrorKind::NetworkFailure,
            CoordinatorError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            CoordinatorError::ClipboardFailure(_) => ErrorKind::ClipboardFailure,
        }
    }
}

/// Failure categories, each with a single documented recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CapabilityUnavailable,
    PermissionDenied,
    Timeout,
    NetworkFailure,
    MalformedResponse,
    ClipboardFailure,
    Config,
}

/// What the coordinator does after a failure of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Continue with the `[LOCATION UNAVAILABLE]` sentinel.
    SubstituteLocationSentinel,
    /// Alert path: render the static record for the hazard.
    /// Instructions path: show a timed error status.
    FallBackOrReport,
    /// Raise a blocking notice to the user.
    NotifyUser,
    /// Refuse to start.
    Abort,
}

impl ErrorKind {
    pub fn recovery(&self) -> Recovery {
        match self {
            ErrorKind::CapabilityUnavailable | ErrorKind::PermissionDenied | ErrorKind::Timeout => {
                Recovery::SubstituteLocationSentinel
            }
            ErrorKind::NetworkFailure | ErrorKind::MalformedResponse => Recovery::FallBackOrReport,
            ErrorKind::ClipboardFailure => Recovery::NotifyUser,
            ErrorKind::Config => Recovery::Abort,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::CapabilityUnavailable => "capability_unavailable",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::ClipboardFailure => "clipboard_failure",
            ErrorKind::Config => "config",
        };
        f.write_str(name)
    }
}
