//! Bridge state snapshot
//!
//! The accept loop and the active session publish their progress here; a
//! presentation layer reads it through [`crate::ServerHandle::state`].

use serde::Serialize;
use std::net::SocketAddr;

/// Lifecycle of the current session
///
/// `Idle -> Connected -> [ReceivingProgram] -> Disconnected`. The next
/// accepted connection starts over at `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionState {
    /// No client has connected yet
    #[default]
    Idle,
    /// A client is connected, no program line seen yet
    Connected,
    /// At least one program line was captured in this session
    ReceivingProgram,
    /// The last session ended
    Disconnected,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected | Self::ReceivingProgram)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connected => write!(f, "Connected"),
            Self::ReceivingProgram => write!(f, "ReceivingProgram"),
            Self::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// Shared bridge state
#[derive(Debug, Clone, Default, Serialize)]
pub struct BridgeState {
    /// Whether the accept loop is running
    pub listening: bool,
    /// Current session lifecycle state
    pub session: SessionState,
    /// Peer of the current or last session
    pub peer: Option<SocketAddr>,
    /// Program lines captured in the current or last session
    pub lines_captured: usize,
    /// Number of sessions accepted since start
    pub sessions_served: u64,
}

impl BridgeState {
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn is_receiving_program(&self) -> bool {
        self.session == SessionState::ReceivingProgram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = BridgeState::default();
        assert!(!state.listening);
        assert_eq!(state.session, SessionState::Idle);
        assert!(!state.is_connected());
        assert_eq!(state.sessions_served, 0);
    }

    #[test]
    fn test_connected_states() {
        assert!(SessionState::Connected.is_connected());
        assert!(SessionState::ReceivingProgram.is_connected());
        assert!(!SessionState::Disconnected.is_connected());
        assert_eq!(SessionState::ReceivingProgram.to_string(), "ReceivingProgram");
    }
}
