//! Network side of the bridge
//!
//! - [`tcp`]: listening socket and the one-session-at-a-time accept loop
//! - [`session`]: per-connection Grbl line protocol
//! - [`capture`]: program file and communication log
//! - [`state`]: shared state snapshot for presentation layers

pub mod capture;
pub mod session;
pub mod state;
pub mod tcp;

pub use capture::{CapturePaths, ProgramCapture};
pub use session::{Session, SessionEnd};
pub use state::{BridgeState, SessionState};
pub use tcp::{start, BridgeConfig, BridgeServer, ServerHandle};
