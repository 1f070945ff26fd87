//! Error handling for GrblBridge
//!
//! Provides the error types for every layer of the bridge:
//! - Connection errors (listening socket, accepted sessions)
//! - Capture errors (program file, communication log, backups)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents errors raised while binding the listening socket or while
/// driving an accepted Grbl session.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// The listening socket could not be bound or put into listen mode
    #[error("Failed to bind {addr}: {reason}")]
    BindFailed {
        /// The address that was requested.
        addr: String,
        /// The reason the bind failed.
        reason: String,
    },

    /// Accepting an incoming connection failed
    #[error("Accept failed: {reason}")]
    AcceptFailed {
        /// The reason the accept failed.
        reason: String,
    },

    /// The session socket failed while receiving
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// The reason the connection was lost.
        reason: String,
    },

    /// A reply could not be written completely to the peer
    #[error("Failed to send reply: {reason}")]
    SendFailed {
        /// The reason the write failed.
        reason: String,
    },

    /// Bind host/port could not be parsed into a socket address
    #[error("Invalid bind address: {addr}")]
    InvalidAddress {
        /// The rejected address.
        addr: String,
    },
}

/// Capture error type
///
/// Represents errors related to the program file, the communication log
/// and program backups.
#[derive(Error, Debug, Clone)]
pub enum CaptureError {
    /// A capture file could not be opened or created
    #[error("Failed to open {path}: {reason}")]
    OpenFailed {
        /// The file path.
        path: String,
        /// The reason the open failed.
        reason: String,
    },

    /// Appending or flushing a captured line failed
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// The file path.
        path: String,
        /// The reason the write failed.
        reason: String,
    },

    /// No program has been captured yet
    #[error("Program file not found: {path}")]
    ProgramFileMissing {
        /// The expected program file path.
        path: String,
    },

    /// A backup copy of the program file could not be written
    #[error("Backup of {path} failed: {reason}")]
    BackupFailed {
        /// The program file path.
        path: String,
        /// The reason the backup failed.
        reason: String,
    },
}

/// Main error type for GrblBridge
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Capture error
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a capture error
    pub fn is_capture_error(&self) -> bool {
        matches!(self, Error::Capture(_))
    }

    /// Check if this error is fatal to the listener
    pub fn is_bind_failure(&self) -> bool {
        matches!(
            self,
            Error::Connection(ConnectionError::BindFailed { .. })
                | Error::Connection(ConnectionError::InvalidAddress { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
