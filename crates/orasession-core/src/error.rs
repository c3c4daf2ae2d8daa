//! Error types for orasession

use thiserror::Error;

/// Core error type for session operations
///
/// Every variant carries only a message so the error can be cloned and
/// handed to every caller waiting on the same connection attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Disconnect failed: {0}")]
    DisconnectFailed(String),

    #[error("Malformed result: {0}")]
    MalformedResult(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SessionError {
    /// The underlying message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            SessionError::ConnectionFailed(msg)
            | SessionError::QueryFailed(msg)
            | SessionError::DisconnectFailed(msg)
            | SessionError::MalformedResult(msg)
            | SessionError::Configuration(msg) => msg,
        }
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::Configuration(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Configuration(err.to_string())
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Error reported by a database driver
///
/// Drivers surface failures as a message string, e.g.
/// `ORA-03114: not connected to ORACLE`. Classification works on this
/// message alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DriverError {
    pub message: String,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for driver calls
pub type DriverResult<T> = std::result::Result<T, DriverError>;
