//! Line splitting for the inbound Grbl stream
//!
//! TCP delivers the client's stream in arbitrary chunks: one read may carry
//! several lines, half a line, or half a UTF-8 sequence. The splitter keeps
//! the unterminated tail between reads and only hands out complete lines.
//! Every byte is scanned once, when its chunk arrives.

/// Longest accepted line, terminator excluded
pub const DEFAULT_MAX_LINE_LEN: usize = 256;

/// Reassembles newline-terminated lines from raw socket chunks
#[derive(Debug, Clone)]
pub struct LineSplitter {
    pending: Vec<u8>,
    max_line_len: usize,
    // Set while the rest of an over-long line is skipped up to its `\n`.
    overflowed: Option<usize>,
}

impl LineSplitter {
    /// Create an empty splitter with the default line limit
    pub fn new() -> Self {
        Self::with_max_line_len(DEFAULT_MAX_LINE_LEN)
    }

    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_line_len: max_line_len.max(1),
            overflowed: None,
        }
    }

    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    /// Feed one received chunk and return every line it completed
    ///
    /// Returned lines are raw: the `\n` terminator is removed but surrounding
    /// whitespace (including a `\r`) is kept. A line longer than the limit is
    /// dropped as a whole, up to and including its terminator.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(offset) = rest.iter().position(|&b| b == b'\n') {
            let head = &rest[..offset];
            rest = &rest[offset + 1..];

            if let Some(dropped) = self.overflowed.take() {
                report_overflow(dropped + head.len());
            } else if self.pending.len() + head.len() > self.max_line_len {
                report_overflow(self.pending.len() + head.len());
                self.pending.clear();
            } else {
                self.pending.extend_from_slice(head);
                lines.push(decode_lossy(&self.pending));
                self.pending.clear();
            }
        }

        match self.overflowed.as_mut() {
            Some(dropped) => *dropped += rest.len(),
            None if self.pending.len() + rest.len() > self.max_line_len => {
                self.overflowed = Some(self.pending.len() + rest.len());
                self.pending.clear();
            }
            None => self.pending.extend_from_slice(rest),
        }

        lines
    }

    /// Bytes of an incomplete line still waiting for a terminator
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// True while the tail of an over-long line is being skipped
    pub fn is_discarding(&self) -> bool {
        self.overflowed.is_some()
    }

    /// Discard the incomplete tail, returning it decoded if it held any text
    pub fn take_remainder(&mut self) -> Option<String> {
        if let Some(dropped) = self.overflowed.take() {
            report_overflow(dropped);
        }

        let remainder = decode_lossy(&std::mem::take(&mut self.pending));
        if remainder.trim().is_empty() {
            None
        } else {
            Some(remainder)
        }
    }
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_overflow(len: usize) {
    tracing::warn!("Dropping over-long line ({} bytes without terminator)", len);
}

/// Decode bytes as UTF-8, dropping invalid sequences instead of failing
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    let mut dropped = 0usize;
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }
    if dropped > 0 {
        tracing::debug!("Dropped {} undecodable byte(s) from received line", dropped);
    }
    text
}
