//! Error types for the webjars server.

use std::io;

use thiserror::Error;
use webjars_config::ConfigError;
use webjars_core::AssetError;
use webjars_telemetry::TelemetryError;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The archive search path could not be loaded.
    #[error("asset loading error: {0}")]
    Assets(#[from] AssetError),

    /// Logging or metrics failed to initialize.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// The listen address is not a socket address.
    #[error("invalid listen address '{addr}': {reason}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parse failure.
        reason: String,
    },

    /// The listener could not be bound.
    #[error("failed to bind {addr}")]
    Bind {
        /// The address that failed to bind.
        addr: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl ServerError {
    /// Create a new bind error.
    pub fn bind(addr: impl Into<String>, source: io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    /// Create a new invalid address error.
    pub fn invalid_address(addr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            addr: addr.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_message() {
        let err = ServerError::bind(
            "0.0.0.0:80",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("0.0.0.0:80"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_error_converts() {
        let err: ServerError = ConfigError::validation_error("no routes").into();
        assert!(matches!(err, ServerError::Config(_)));
        assert!(err.to_string().contains("no routes"));
    }
}
