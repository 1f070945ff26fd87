//! Event system for bridge notifications
//!
//! Provides:
//! - Event types mirroring the observer callbacks
//! - Event dispatcher that republishes callbacks over a broadcast channel

use crate::core::listener::{BridgeObserver, ProgramStatus, Severity};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Bridge event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// A log line was produced
    LogLine(String),
    /// Connection status changed
    ConnectionStatus {
        /// Rendered status message.
        message: String,
        /// Severity of the transition.
        severity: Severity,
    },
    /// Program transfer status changed
    ProgramStatus {
        /// The transition.
        status: ProgramStatus,
        /// Rendered status message.
        message: String,
    },
}

impl std::fmt::Display for BridgeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeEvent::LogLine(line) => write!(f, "{}", line),
            BridgeEvent::ConnectionStatus { message, severity } => {
                write!(f, "[{}] {}", severity, message)
            }
            BridgeEvent::ProgramStatus { message, .. } => write!(f, "{}", message),
        }
    }
}

/// Event dispatcher for publishing events to subscribers
#[derive(Clone)]
pub struct EventDispatcher {
    /// Broadcast sender channel for bridge events.
    tx: broadcast::Sender<BridgeEvent>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    ///
    /// # Arguments
    /// * `buffer_size` - Size of the broadcast buffer (default 100)
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    /// Create a new event dispatcher with default buffer size
    pub fn default_with_buffer() -> Self {
        Self::new(100)
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// Events published while nobody is subscribed are dropped.
    pub fn publish(&self, event: BridgeEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Bridge event dropped, no subscribers");
        }
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::default_with_buffer()
    }
}

#[async_trait]
impl BridgeObserver for EventDispatcher {
    async fn on_log_line(&self, line: &str) {
        self.publish(BridgeEvent::LogLine(line.to_string()));
    }

    async fn on_connection_status(&self, message: &str, severity: Severity) {
        self.publish(BridgeEvent::ConnectionStatus {
            message: message.to_string(),
            severity,
        });
    }

    async fn on_program_status(&self, status: ProgramStatus, message: &str) {
        self.publish(BridgeEvent::ProgramStatus {
            status,
            message: message.to_string(),
        });
    }
}
