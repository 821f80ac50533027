//! Error types for rsplink
//!
//! Provides a unified error type for all operations, with a classification
//! helper separating expected session-end conditions from genuine faults.

use thiserror::Error;

/// Result type alias using RspError
pub type Result<T> = std::result::Result<T, RspError>;

/// Unified error type for rsplink operations
#[derive(Debug, Error)]
pub enum RspError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Contract Violations
    // -------------------------------------------------------------------------
    #[error("no connection established")]
    NotConnected,

    #[error("server not running")]
    NotRunning,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Handler Errors
    // -------------------------------------------------------------------------
    #[error("handler failed: {0}")]
    Handler(String),
}

impl RspError {
    /// Whether this error signals a normal end of session (client went away,
    /// socket closed under us) rather than a fault.
    ///
    /// The serve loop logs these at debug severity and returns to listening;
    /// anything else terminates it.
    pub fn is_session_end(&self) -> bool {
        match self {
            RspError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
