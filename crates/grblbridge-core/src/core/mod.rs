//! Observer and event plumbing shared by all bridge crates

pub mod event;
pub mod listener;

pub use event::{BridgeEvent, EventDispatcher};
pub use listener::{BridgeObserver, ProgramStatus, Severity};
