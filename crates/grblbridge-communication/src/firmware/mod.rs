//! Firmware dialects emulated by the bridge

pub mod grbl;
