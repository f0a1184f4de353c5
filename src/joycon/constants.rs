//! Shared buffer layout
//!
//! Every byte offset the host and the engine agree on lives here:
//! - Region sizes and positions
//! - Input state sub-fields (buttons, sticks, axes, NFC/IR)
//! - Status block field offsets
//!
//! Nothing outside this module spells out an offset literal.

use std::ops::Range;

/// A fixed `offset + len` window inside the shared buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub offset: usize,
    pub len: usize,
}

impl Region {
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// First byte past the region
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

// ============================================================================
// Sizes
// ============================================================================

/// Standard HID report: id byte + 48 payload bytes
pub const OUTPUT_REPORT_SIZE: usize = 49;

/// Full sensor-data input report (id 0x31): id byte + 361 payload bytes
pub const INPUT_REPORT_LARGE_SIZE: usize = 362;

/// Device status block
pub const STATUS_SIZE: usize = 12;

/// Raw, transport-independent controller state
pub const INPUT_STATE_SIZE: usize = 176;

/// Distance between two historical samples of the same sensor
pub const AXES_SAMPLE_STRIDE: usize = 12;

/// Number of historical samples kept per sensor
pub const IMU_HISTORY_LEN: usize = 3;

/// Maximum number of i16 values per sensor in one IMU update (3 samples x 3 axes)
pub const IMU_MAX_SIZE: usize = IMU_HISTORY_LEN * 3;

/// Upper bound of the legal stick range
pub const STICK_MAX_VALUE: u16 = 4096;

/// Resting stick position seeded at init
pub const STICK_CENTER: u16 = STICK_MAX_VALUE / 2;

/// Report id of the large sensor-data input report
pub const LARGE_INPUT_REPORT_ID: u8 = 0x31;

/// Bumped whenever any offset below changes; handed to the engine at init
pub const LAYOUT_VERSION: u8 = 1;

// ============================================================================
// Top-level regions
// ============================================================================

pub const OUTPUT_REPORT: Region = Region::new(0, OUTPUT_REPORT_SIZE);

/// Always reserves the large size, whatever report is currently stored
pub const INPUT_REPORT: Region = Region::new(OUTPUT_REPORT.end(), INPUT_REPORT_LARGE_SIZE);

pub const INPUT_STATE: Region = Region::new(INPUT_REPORT.end(), INPUT_STATE_SIZE);

pub const STATUS: Region = Region::new(INPUT_STATE.end(), STATUS_SIZE);

/// Total shared buffer size
pub const BUFFER_SIZE: usize = OUTPUT_REPORT_SIZE + INPUT_REPORT_LARGE_SIZE + STATUS_SIZE + INPUT_STATE_SIZE;

/// Payload bytes following the id byte of a standard report
pub const REPORT_PAYLOAD_SIZE: usize = OUTPUT_REPORT_SIZE - 1;

/// Payload bytes following the id byte of a large input report
pub const LARGE_REPORT_PAYLOAD_SIZE: usize = INPUT_REPORT_LARGE_SIZE - 1;

// ============================================================================
// Input state fields
// ============================================================================

/// u32 bitmask, bit n = button ordinal n
pub const BUTTONS: Region = Region::new(INPUT_STATE.offset, 4);

/// Left x, left y, right x, right y as u16
pub const STICKS: Region = Region::new(BUTTONS.end(), 8);

pub const LEFT_STICK_OFFSET: usize = STICKS.offset;
pub const RIGHT_STICK_OFFSET: usize = STICKS.offset + 4;

/// Interleaved accelerometer/gyroscope history
pub const AXES: Region = Region::new(STICKS.end(), AXES_SAMPLE_STRIDE * IMU_HISTORY_LEN);

pub const ACCEL_BASE_OFFSET: usize = AXES.offset;
pub const GYRO_BASE_OFFSET: usize = AXES.offset + 6;

/// Opaque NFC tag / IR camera bytes, up to the end of input state
pub const NFC_IR: Region = Region::new(AXES.end(), INPUT_STATE.end() - AXES.end());

// ============================================================================
// Status block fields
// ============================================================================

pub const STATUS_PLAYER_OFFSET: usize = STATUS.offset;
pub const STATUS_VIBRATOR_OFFSET: usize = STATUS.offset + 1;
pub const STATUS_IMU_OFFSET: usize = STATUS.offset + 2;
pub const STATUS_START_PUSH_OFFSET: usize = STATUS.offset + 3;
pub const STATUS_START_NFC_OFFSET: usize = STATUS.offset + 4;

// ============================================================================
// Layout checks
// ============================================================================

const _: () = assert!(STATUS.end() == BUFFER_SIZE);
const _: () = assert!(NFC_IR.end() == INPUT_STATE.end());
const _: () = assert!(AXES.end() <= NFC_IR.offset);
const _: () = assert!(GYRO_BASE_OFFSET + 6 <= ACCEL_BASE_OFFSET + AXES_SAMPLE_STRIDE);
const _: () = assert!(STATUS_START_NFC_OFFSET < STATUS.end());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_offsets() {
        assert_eq!(BUFFER_SIZE, 599);
        assert_eq!(INPUT_REPORT.offset, 49);
        assert_eq!(INPUT_STATE.offset, 411);
        assert_eq!(STATUS.offset, 587);
        assert_eq!(STICKS.offset, 415);
        assert_eq!(AXES.offset, 423);
        assert_eq!(NFC_IR.offset, 459);
        assert_eq!(NFC_IR.len, 128);
    }

    #[test]
    fn test_regions_do_not_overlap() {
        let regions = [OUTPUT_REPORT, INPUT_REPORT, INPUT_STATE, STATUS];
        for pair in regions.windows(2) {
            assert_eq!(pair[0].end(), pair[1].offset);
        }
    }
}
