//! Joy-Con error types

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Engine operations that report a native status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EngineOp {
    Init,
    Free,
    ReplayOutputReport,
    SynthesizeInputReport,
}

impl fmt::Display for EngineOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineOp::Init => "init",
            EngineOp::Free => "free",
            EngineOp::ReplayOutputReport => "replay_output_report",
            EngineOp::SynthesizeInputReport => "synthesize_input_report",
        };
        f.write_str(name)
    }
}

/// Where a Joycon is in its init/free lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Ready,
    Freed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Created => f.write_str("not initialized"),
            Lifecycle::Ready => f.write_str("ready"),
            Lifecycle::Freed => f.write_str("freed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum JoyconError {
    #[error("{region} payload of {len} bytes exceeds the {max}-byte region")]
    LayoutViolation {
        region: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Engine call {op} failed with status {status}")]
    EngineCall { op: EngineOp, status: i32 },

    #[error("Buffer access while joycon is {0}")]
    UninitializedAccess(Lifecycle),

    #[error("Joycon is already {0}; init must be called exactly once")]
    AlreadyInitialized(Lifecycle),

    #[error("A status listener is already subscribed")]
    ListenerSlotOccupied,

    #[error("Failed to load device asset '{}': {source}", path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, JoyconError>;

/// Turn a native status into a result; 0 is success
pub fn check_status(op: EngineOp, status: i32) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        Err(JoyconError::EngineCall { op, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status() {
        assert!(check_status(EngineOp::Init, 0).is_ok());
        match check_status(EngineOp::Free, -3) {
            Err(JoyconError::EngineCall { op, status }) => {
                assert_eq!(op, EngineOp::Free);
                assert_eq!(status, -3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_error_messages() {
        let err = JoyconError::LayoutViolation { region: "output report", len: 49, max: 48 };
        assert_eq!(err.to_string(), "output report payload of 49 bytes exceeds the 48-byte region");

        let err = JoyconError::UninitializedAccess(Lifecycle::Freed);
        assert_eq!(err.to_string(), "Buffer access while joycon is freed");
    }
}
