//! Command classification
//!
//! Tags each received line by its leading character. G-code content is never
//! validated; anything that is not a query is program content.

use serde::{Deserialize, Serialize};

/// Kind of a received line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    /// Nothing but whitespace
    Empty,
    /// Leading `?`
    StatusQuery,
    /// Leading `$`
    ConfigQuery,
    /// Anything else
    ProgramLine,
}

/// A received line with its trimmed form and kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// The line as received, without the `\n` terminator
    pub raw: String,
    /// The line with surrounding whitespace removed
    pub trimmed: String,
    /// The classification
    pub kind: LineKind,
}

impl ClassifiedLine {
    /// Classify a raw received line
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim().to_string();
        let kind = if trimmed.is_empty() {
            LineKind::Empty
        } else {
            classify(&trimmed)
        };
        Self { raw, trimmed, kind }
    }

    /// True for a status request carrying no other content
    ///
    /// Covers a lone `?` as well as a whitespace-only line that still holds
    /// a `?` byte.
    pub fn is_bare_status_query(&self) -> bool {
        match self.kind {
            LineKind::StatusQuery => self.trimmed == "?",
            LineKind::Empty => self.raw.contains('?'),
            LineKind::ConfigQuery | LineKind::ProgramLine => false,
        }
    }
}

/// Classify a trimmed, non-empty line by its leading character
pub fn classify(trimmed: &str) -> LineKind {
    match trimmed.chars().next() {
        Some('?') => LineKind::StatusQuery,
        Some('$') => LineKind::ConfigQuery,
        Some(_) => LineKind::ProgramLine,
        None => LineKind::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_leading_character() {
        assert_eq!(classify("?"), LineKind::StatusQuery);
        assert_eq!(classify("$$"), LineKind::ConfigQuery);
        assert_eq!(classify("$I"), LineKind::ConfigQuery);
        assert_eq!(classify("G1 X10 Y10"), LineKind::ProgramLine);
        assert_eq!(classify("M5"), LineKind::ProgramLine);
    }

    #[test]
    fn test_malformed_gcode_is_still_program() {
        assert_eq!(classify("not gcode at all"), LineKind::ProgramLine);
        assert_eq!(classify("G1 X?"), LineKind::ProgramLine);
    }

    #[test]
    fn test_classified_line_trims() {
        let line = ClassifiedLine::new("  G0 X0 Y0\r");
        assert_eq!(line.trimmed, "G0 X0 Y0");
        assert_eq!(line.raw, "  G0 X0 Y0\r");
        assert_eq!(line.kind, LineKind::ProgramLine);

        assert_eq!(ClassifiedLine::new("\r").kind, LineKind::Empty);
        assert_eq!(ClassifiedLine::new(" $$ ").kind, LineKind::ConfigQuery);
    }

    #[test]
    fn test_bare_status_query() {
        assert!(ClassifiedLine::new("?").is_bare_status_query());
        assert!(ClassifiedLine::new(" ?\r").is_bare_status_query());
        assert!(!ClassifiedLine::new("?foo").is_bare_status_query());
        assert!(!ClassifiedLine::new("$$").is_bare_status_query());
        assert!(!ClassifiedLine::new("").is_bare_status_query());
    }
}
