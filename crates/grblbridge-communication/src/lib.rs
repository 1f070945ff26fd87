//! # GrblBridge Communication
//!
//! Emulates the device side of the Grbl line protocol over TCP so that
//! laser/CNC design software can stream a job to a machine whose controller
//! runs different firmware. Accepted G-code is captured to a program file
//! instead of being executed.

pub mod communication;
pub mod firmware;

pub use communication::{
    start, BridgeConfig, BridgeServer, BridgeState, CapturePaths, ProgramCapture, ServerHandle,
    Session, SessionEnd, SessionState,
};

pub use firmware::grbl::{
    classify, respond, ClassifiedLine, LineKind, LineSplitter, Reply, Response,
    DEFAULT_MAX_LINE_LEN, GRBL_BANNER, IDLE_STATUS_REPORT, OK_RESPONSE,
};
