//! Simulated Joy-Con support
//!
//! This module provides the host side of the shared-buffer protocol:
//! - Buffer layout and byte codec
//! - Report, button, stick and IMU access
//! - Status change detection
//! - The `Joycon` lifecycle wrapper around an engine

pub mod asset;
pub mod buffer;
pub mod codec;
pub mod constants;
pub mod controller;
pub mod error;
pub mod imu;
pub mod status;
pub mod types;

// Re-export commonly used items
pub use asset::{AssetSource, DeviceAsset, FsAssetSource, MemoryAssetSource};
pub use buffer::SharedBuffer;
pub use controller::Joycon;
pub use error::{EngineOp, JoyconError, Lifecycle, Result};
pub use imu::ImuRing;
pub use status::{ChannelListener, StatusListener, StatusNotifier};
pub use types::*;
