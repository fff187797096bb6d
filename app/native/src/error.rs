//! Error types for Trellis.
//!
//! Every fallible operation in the window manager core returns [`WmResult`].
//! Errors fall in two groups: recoverable command failures, which the bus
//! reports back to the caller as an unsuccessful `CommandResponse`, and fatal
//! errors, which are routed through the fatal-error path.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for window manager operations.
pub type WmResult<T> = Result<T, WmError>;

/// Errors that can occur while managing the container tree.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "message")]
pub enum WmError {
    /// A container, window, workspace or monitor lookup failed.
    #[error("Container not found: {0}")]
    ContainerNotFound(String),
    /// The command could not be parsed or does not apply to its subject.
    #[error("{0}")]
    InvalidCommand(String),
    /// The command is valid but cannot be carried out in the current state.
    #[error("{0}")]
    Unsupported(String),
    /// A configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
    /// The tree broke one of its structural invariants.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    /// A window system call failed.
    #[error("Platform error: {0}")]
    Platform(String),
    /// Serializing or deserializing state failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A fatal error caused by the user's configuration.
    #[error("{0}")]
    FatalUser(String),
}

impl WmError {
    /// Creates a not-found error for the given subject.
    pub fn not_found(what: impl Into<String>) -> Self { Self::ContainerNotFound(what.into()) }

    /// Creates an invalid-command error.
    pub fn invalid(message: impl Into<String>) -> Self { Self::InvalidCommand(message.into()) }

    /// Creates an unsupported-operation error.
    pub fn unsupported(message: impl Into<String>) -> Self { Self::Unsupported(message.into()) }

    /// Creates an invariant violation error.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Creates a platform error.
    pub fn platform(message: impl Into<String>) -> Self { Self::Platform(message.into()) }

    /// Returns `true` for errors that are reported back to the caller as an
    /// unsuccessful response instead of going through the fatal path.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ContainerNotFound(_) | Self::InvalidCommand(_) | Self::Unsupported(_) | Self::Config(_)
        )
    }

    /// Returns `true` if this is a configuration-caused fatal error.
    #[must_use]
    pub const fn is_fatal_user(&self) -> bool { matches!(self, Self::FatalUser(_)) }

    /// Returns `true` if this is a lookup failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool { matches!(self, Self::ContainerNotFound(_)) }
}

impl From<serde_json::Error> for WmError {
    fn from(err: serde_json::Error) -> Self { Self::Serialization(err.to_string()) }
}

impl From<std::io::Error> for WmError {
    fn from(err: std::io::Error) -> Self { Self::Platform(err.to_string()) }
}

impl From<ConfigError> for WmError {
    fn from(err: ConfigError) -> Self { Self::Config(err.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = WmError::not_found("workspace 3");
        let msg = err.to_string();
        assert!(msg.contains("Container not found"));
        assert!(msg.contains("workspace 3"));
    }

    #[test]
    fn test_fatal_user_display_is_plain_message() {
        let err = WmError::FatalUser("at least 1 workspace required per monitor".to_string());
        assert_eq!(err.to_string(), "at least 1 workspace required per monitor");
        assert!(err.is_fatal_user());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(WmError::invalid("bad").is_recoverable());
        assert!(WmError::unsupported("nope").is_recoverable());
        assert!(WmError::not_found("x").is_recoverable());
        assert!(!WmError::invariant("broken").is_recoverable());
        assert!(!WmError::platform("os").is_recoverable());
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: WmError = json_err.into();
        assert!(matches!(err, WmError::Serialization(_)));
    }

    #[test]
    fn test_error_serializes_with_kind_tag() {
        let err = WmError::invalid("unknown verb");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "InvalidCommand");
        assert_eq!(json["message"], "unknown verb");
    }
}
