//! Joycon-bridge: shared-buffer protocol for a simulated Joy-Con
//!
//! This library owns the fixed-layout buffer exchanged with a native
//! emulation engine: HID reports, raw input state, IMU history and the
//! device status block.

pub mod config;
pub mod engine;
pub mod joycon;

// Re-export commonly used items
pub use config::{Config, ConfigError};
pub use engine::{Engine, EngineContext, MockEngine};
pub use joycon::{Joycon, JoyconError, NsButton, SharedBuffer, StatusEvent, StatusListener};
