//! Error types for droidtv-remote.

use thiserror::Error;

use crate::link::LinkError;

/// Main error type for remote-control operations.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The television is not connected (or the transport silently dropped).
    #[error("not connected to TV")]
    NotConnected,

    /// A request carried missing or invalid fields.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Invalid state transition attempted.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: crate::session::SessionState,
        to: crate::session::SessionState,
    },

    /// Failure reported by the device link.
    #[error("device link error: {0}")]
    Link(#[from] LinkError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// Whether the error was caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotConnected | Self::Validation(_))
    }
}

/// Convenience Result type for droidtv-remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_connected_display() {
        let err = RemoteError::NotConnected;
        assert_eq!(err.to_string(), "not connected to TV");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validation_display() {
        let err = RemoteError::Validation("No text provided".into());
        assert!(err.to_string().contains("No text provided"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_link_error_conversion() {
        let err: RemoteError = LinkError::CannotConnect("refused".into()).into();
        assert!(matches!(err, RemoteError::Link(_)));
        assert!(err.to_string().contains("refused"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: RemoteError = io_err.into();
        assert!(matches!(err, RemoteError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }
}
