//! Shared error type across neuro-sdk crates.

use thiserror::Error;

/// Stable error categories (host-facing API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid construction fields.
    Config,
    /// Operation invalid for the current lifecycle state.
    State,
    /// Transport dial / handshake failure.
    Connection,
    /// Caller supplied invalid arguments.
    Validation,
    /// Transport read failure.
    Read,
    /// Transport write failure.
    Write,
    /// Malformed inbound or unencodable outbound message.
    Decode,
}

impl ErrorKind {
    /// String representation used in logs and metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG_ERROR",
            ErrorKind::State => "STATE_ERROR",
            ErrorKind::Connection => "CONNECTION_ERROR",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Read => "READ_ERROR",
            ErrorKind::Write => "WRITE_ERROR",
            ErrorKind::Decode => "DECODE_ERROR",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, NeuroError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum NeuroError {
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("read error: {0}")]
    Read(String),
    #[error("write error: {0}")]
    Write(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl NeuroError {
    /// Map the error to its stable category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NeuroError::Config(_) => ErrorKind::Config,
            NeuroError::State(_) => ErrorKind::State,
            NeuroError::Connection(_) => ErrorKind::Connection,
            NeuroError::Validation(_) => ErrorKind::Validation,
            NeuroError::Read(_) => ErrorKind::Read,
            NeuroError::Write(_) => ErrorKind::Write,
            NeuroError::Decode(_) => ErrorKind::Decode,
        }
    }
}
