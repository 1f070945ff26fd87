//! # GrblBridge Core
//!
//! Core types, traits, and utilities for GrblBridge.
//! Provides the error taxonomy, the observer interface through which the
//! bridge reports to a presentation layer, and the localized status texts.

pub mod core;
pub mod error;
pub mod messages;

pub use core::{
    event::{BridgeEvent, EventDispatcher},
    BridgeObserver, ProgramStatus, Severity,
};

pub use error::{CaptureError, ConnectionError, Error, Result};

pub use messages::{Catalog, Language, MessageKey};
