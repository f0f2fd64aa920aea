//! Gateway errors.

use std::time::Duration;

/// Coarse failure classes, for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    InvalidRequest,
    Network,
    Auth,
    Provider,
    Cancelled,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Network => "network",
            ErrorKind::Auth => "auth",
            ErrorKind::Provider => "provider",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

/// Model gateway errors.
///
/// Every variant carries a message fit to show a user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Credential missing or placeholder, or bad configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Call rejected before dispatch (empty messages, bad temperature, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request could not be sent or the response could not be parsed
    #[error("Network error: {0}")]
    Network(String),

    /// Provider or proxy refused the credential
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// Any other non-success response
    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// Call exceeded its timeout
    #[error("Request cancelled after {after:?}")]
    Cancelled { after: Duration },
}

impl GatewayError {
    /// Structured kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Configuration(_) => ErrorKind::Configuration,
            GatewayError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            GatewayError::Network(_) => ErrorKind::Network,
            GatewayError::Auth { .. } => ErrorKind::Auth,
            GatewayError::Provider { .. } => ErrorKind::Provider,
            GatewayError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Classify a non-success HTTP status with its extracted message.
    pub fn from_status(status: u16, message: String) -> Self {
        debug_assert!(!(200..300).contains(&status), "Success status is not an error");

        match status {
            401 | 403 => GatewayError::Auth { status, message },
            _ => GatewayError::Provider { status, message },
        }
    }

    /// HTTP status reported by the remote side, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Auth { status, .. } | GatewayError::Provider { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            GatewayError::Cancelled { after: timeout }
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}
