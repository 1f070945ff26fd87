//! # GrblBridge
//!
//! Emulates a Grbl 1.1 controller over TCP so that laser/CNC design software
//! can stream G-code to a machine whose controller runs different firmware.
//! Streamed program lines are acknowledged like a real Grbl device and
//! captured to a program file for the downstream controller.
//!
//! ## Architecture
//!
//! GrblBridge is organized as a workspace with multiple crates:
//!
//! 1. **grblbridge-core** - Errors, observer trait, events, message catalog
//! 2. **grblbridge-communication** - Grbl line protocol, capture, TCP listener
//! 3. **grblbridge-settings** - Configuration files and validation
//! 4. **grblbridge** - Console presentation, backups and the CLI binary

pub mod backup;
pub mod console;

pub use backup::{backup_file_name, backup_message, create_backup, read_program};
pub use console::ConsoleObserver;

pub use grblbridge_core::{
    BridgeEvent, BridgeObserver, CaptureError, Catalog, ConnectionError, Error, EventDispatcher,
    Language, MessageKey, ProgramStatus, Result, Severity,
};

pub use grblbridge_communication::{
    start, BridgeConfig, BridgeServer, BridgeState, CapturePaths, ServerHandle, SessionState,
};

pub use grblbridge_settings::{CaptureSettings, Config, ServerSettings, SettingsError, UiSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - stderr output, keeping stdout for the bridge console
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
