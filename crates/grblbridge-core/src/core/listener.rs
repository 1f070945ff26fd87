//! Bridge observer interface
//!
//! Defines the callbacks through which the bridge reports activity to a
//! presentation layer (console, GUI, metrics sink).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Severity of a connection status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Listening, or the last session ended
    Waiting,
    /// A client session is active
    Connected,
    /// The listener or a session failed
    Error,
}

impl Severity {
    /// Status lamp colour for this severity
    pub fn color(&self) -> &'static str {
        match self {
            Self::Waiting => "yellow",
            Self::Connected => "green",
            Self::Error => "red",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Connected => write!(f, "connected"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Program transfer transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramStatus {
    /// The first program line of a session arrived
    Receiving,
    /// The session that was receiving a program ended
    Received,
}

/// Observer trait for bridge activity
///
/// Implement this trait to receive log lines and status transitions.
/// Every method has a no-op default.
#[async_trait]
pub trait BridgeObserver: Send + Sync {
    /// Called for every captured program line and for lifecycle log entries
    async fn on_log_line(&self, _line: &str) {}

    /// Called on listen, connect, disconnect and error transitions
    async fn on_connection_status(&self, _message: &str, _severity: Severity) {}

    /// Called when a program transfer starts or completes
    async fn on_program_status(&self, _status: ProgramStatus, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_colors() {
        assert_eq!(Severity::Waiting.color(), "yellow");
        assert_eq!(Severity::Connected.color(), "green");
        assert_eq!(Severity::Error.color(), "red");
    }
}
