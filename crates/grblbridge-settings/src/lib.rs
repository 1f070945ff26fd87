//! GrblBridge Settings Crate
//!
//! Handles bridge configuration: file formats, defaults, validation and the
//! conversion into the runtime listener configuration.

pub mod config;
pub mod error;

pub use config::{CaptureSettings, Config, ServerSettings, UiSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
