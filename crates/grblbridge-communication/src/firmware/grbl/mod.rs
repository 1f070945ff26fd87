//! GRBL protocol emulation
//!
//! Implements the device side of the Grbl 1.1 line protocol, just far enough
//! for sender software to stream a job: the startup banner, `ok`
//! acknowledgments and a synthetic idle status report.

pub mod classifier;
pub mod line_splitter;
pub mod responder;

pub use classifier::{classify, ClassifiedLine, LineKind};
pub use line_splitter::{decode_lossy, LineSplitter, DEFAULT_MAX_LINE_LEN};
pub use responder::{respond, Reply, Response};

/// Identification line sent on connect
pub const GRBL_BANNER: &str = "Grbl 1.1f ['$' for help]";

/// Acknowledgment for an accepted line
pub const OK_RESPONSE: &str = "ok";

/// Status report answered to a bare `?`
pub const IDLE_STATUS_REPORT: &str = "<Idle|MPos:0.000,0.000,0.000|FS:0,0>";

/// Banner frame as written to the socket
pub fn banner_frame() -> String {
    format!("{}\r\n", GRBL_BANNER)
}
