//! Protocol responder
//!
//! Decides what goes back on the wire for each classified line, following
//! the Grbl convention that every accepted line is answered with `ok`.

use crate::firmware::grbl::classifier::{ClassifiedLine, LineKind};
use crate::firmware::grbl::{IDLE_STATUS_REPORT, OK_RESPONSE};

/// A reply frame sent to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Plain acknowledgment
    Ok,
    /// Synthetic idle status report
    IdleStatus,
}

impl Reply {
    /// The CRLF-terminated frame for this reply
    pub fn frame(&self) -> String {
        match self {
            Reply::Ok => format!("{}\r\n", OK_RESPONSE),
            Reply::IdleStatus => format!("{}\r\n", IDLE_STATUS_REPORT),
        }
    }
}

/// What the session must do with a received line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Answer without persisting anything
    Reply(Reply),
    /// Persist the program line, then acknowledge it with `ok`
    CaptureAndAck(String),
    /// Stay silent
    Ignore,
}

impl Response {
    /// The reply frame this response eventually puts on the wire
    pub fn reply(&self) -> Option<Reply> {
        match self {
            Response::Reply(reply) => Some(*reply),
            Response::CaptureAndAck(_) => Some(Reply::Ok),
            Response::Ignore => None,
        }
    }
}

/// Decide the response for a classified line
pub fn respond(line: &ClassifiedLine) -> Response {
    if line.is_bare_status_query() {
        return Response::Reply(Reply::IdleStatus);
    }

    match line.kind {
        LineKind::Empty => Response::Ignore,
        LineKind::StatusQuery | LineKind::ConfigQuery => Response::Reply(Reply::Ok),
        LineKind::ProgramLine => Response::CaptureAndAck(line.trimmed.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respond_to(raw: &str) -> Response {
        respond(&ClassifiedLine::new(raw))
    }

    #[test]
    fn test_reply_frames() {
        assert_eq!(Reply::Ok.frame(), "ok\r\n");
        assert_eq!(
            Reply::IdleStatus.frame(),
            "<Idle|MPos:0.000,0.000,0.000|FS:0,0>\r\n"
        );
    }

    #[test]
    fn test_bare_status_query_gets_status_frame() {
        assert_eq!(respond_to("?"), Response::Reply(Reply::IdleStatus));
        assert_eq!(respond_to("?\r"), Response::Reply(Reply::IdleStatus));
    }

    #[test]
    fn test_queries_are_acknowledged_not_captured() {
        assert_eq!(respond_to("$$"), Response::Reply(Reply::Ok));
        assert_eq!(respond_to("$I"), Response::Reply(Reply::Ok));
        assert_eq!(respond_to("?extra"), Response::Reply(Reply::Ok));
    }

    #[test]
    fn test_program_line_is_captured_trimmed() {
        let response = respond_to("  G1 X10 Y10 \r");
        assert_eq!(response, Response::CaptureAndAck("G1 X10 Y10".to_string()));
        assert_eq!(response.reply(), Some(Reply::Ok));
    }

    #[test]
    fn test_empty_line_is_ignored() {
        assert_eq!(respond_to(""), Response::Ignore);
        assert_eq!(respond_to(" \r"), Response::Ignore);
        assert_eq!(Response::Ignore.reply(), None);
    }
}
