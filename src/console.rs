//! Terminal presentation of bridge activity
//!
//! Sent frames (`→`) are shown in green, received program lines (`←`) in
//! blue, and status messages take the colour of their severity lamp.

use async_trait::async_trait;
use grblbridge_core::{BridgeObserver, ProgramStatus, Severity};

const RESET: &str = "\x1b[0m";

/// Observer printing log lines and status transitions to stdout
#[derive(Debug, Clone, Copy)]
pub struct ConsoleObserver {
    color: bool,
}

impl ConsoleObserver {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Render one log line, coloured by direction
    pub fn render_log_line(&self, line: &str) -> String {
        let code = if line.contains('→') {
            Some("32")
        } else if line.contains('←') {
            Some("34")
        } else {
            None
        };
        self.paint(line, code)
    }

    /// Render a status message with its lamp
    pub fn render_status(&self, message: &str, severity: Severity) -> String {
        let code = match severity.color() {
            "green" => "32",
            "red" => "31",
            _ => "33",
        };
        let lamp = self.paint("●", Some(code));
        format!("{} {}", lamp, message)
    }

    fn paint(&self, text: &str, code: Option<&str>) -> String {
        match code {
            Some(code) if self.color => format!("\x1b[{}m{}{}", code, text, RESET),
            _ => text.to_string(),
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl BridgeObserver for ConsoleObserver {
    async fn on_log_line(&self, line: &str) {
        println!("{}", self.render_log_line(line));
    }

    async fn on_connection_status(&self, message: &str, severity: Severity) {
        tracing::debug!(%severity, "{}", message);
        println!("{}", self.render_status(message, severity));
    }

    async fn on_program_status(&self, status: ProgramStatus, message: &str) {
        tracing::debug!(?status, "{}", message);
        println!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rendering() {
        let console = ConsoleObserver::new(false);
        assert_eq!(console.render_log_line("← G1 X10"), "← G1 X10");
        assert_eq!(
            console.render_status("Connection lost", Severity::Waiting),
            "● Connection lost"
        );
    }

    #[test]
    fn test_colored_rendering() {
        let console = ConsoleObserver::default();
        assert_eq!(
            console.render_log_line("→ ok"),
            "\x1b[32m→ ok\x1b[0m"
        );
        assert_eq!(
            console.render_log_line("← G0 X0"),
            "\x1b[34m← G0 X0\x1b[0m"
        );
        assert_eq!(console.render_log_line("[TCP] idle"), "[TCP] idle");
        assert!(console
            .render_status("Error: boom", Severity::Error)
            .starts_with("\x1b[31m●"));
    }
}
