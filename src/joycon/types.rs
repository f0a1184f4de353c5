//! Joy-Con type definitions
//!
//! Typed views of every buffer region. These are the messages that cross
//! the engine boundary; only the codec knows how they map onto bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::joycon::constants::{
    LARGE_INPUT_REPORT_ID, LARGE_REPORT_PAYLOAD_SIZE, REPORT_PAYLOAD_SIZE, STICK_CENTER,
};

/// Named controller buttons.
///
/// The declaration order is the bit index inside the button mask, so
/// reordering variants changes the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NsButton {
    Y,
    X,
    B,
    A,
    LSR,
    LSL,
    R,
    ZR,
    Minus,
    Plus,
    RStick,
    LStick,
    Home,
    Capture,
    Nop,
    ChargingGrip,
    Down,
    Up,
    Right,
    Left,
    RSR,
    RSL,
    L,
    ZL,
}

impl NsButton {
    /// All buttons in bit order
    pub const ALL: [NsButton; 24] = [
        NsButton::Y,
        NsButton::X,
        NsButton::B,
        NsButton::A,
        NsButton::LSR,
        NsButton::LSL,
        NsButton::R,
        NsButton::ZR,
        NsButton::Minus,
        NsButton::Plus,
        NsButton::RStick,
        NsButton::LStick,
        NsButton::Home,
        NsButton::Capture,
        NsButton::Nop,
        NsButton::ChargingGrip,
        NsButton::Down,
        NsButton::Up,
        NsButton::Right,
        NsButton::Left,
        NsButton::RSR,
        NsButton::RSL,
        NsButton::L,
        NsButton::ZL,
    ];

    /// Bit index inside the button mask
    pub fn bit(self) -> u32 {
        self as u32
    }

    pub fn mask(self) -> u32 {
        1 << self.bit()
    }
}

/// 4-byte button bitmask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState(pub u32);

impl ButtonState {
    pub fn is_pressed(&self, button: NsButton) -> bool {
        self.0 & button.mask() != 0
    }

    pub fn set(&mut self, button: NsButton, pressed: bool) {
        if pressed {
            self.0 |= button.mask();
        } else {
            self.0 &= !button.mask();
        }
    }

    /// Apply `(button, pressed)` pairs in order and return the result
    pub fn apply(mut self, changes: &[(NsButton, bool)]) -> Self {
        for &(button, pressed) in changes {
            self.set(button, pressed);
        }
        self
    }

    /// Currently pressed buttons, in bit order
    pub fn pressed(&self) -> Vec<NsButton> {
        NsButton::ALL
            .iter()
            .copied()
            .filter(|b| self.is_pressed(*b))
            .collect()
    }

    /// One flag per named button, indexed by bit
    pub fn to_bits(&self) -> [bool; 24] {
        let mut bits = [false; 24];
        for button in NsButton::ALL {
            bits[button.bit() as usize] = self.is_pressed(button);
        }
        bits
    }
}

/// Raw stick position (legal range 0..=4096)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stick {
    pub x: u16,
    pub y: u16,
}

impl Stick {
    pub const CENTERED: Stick = Stick { x: STICK_CENTER, y: STICK_CENTER };

    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl Default for Stick {
    fn default() -> Self {
        Self::CENTERED
    }
}

/// Both sticks as stored in the buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickState {
    pub left: Stick,
    pub right: Stick,
}

/// Which inertial sensor a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sensor {
    Accelerometer,
    Gyroscope,
}

/// One raw tri-axis sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImuSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl ImuSample {
    pub fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// A HID report: leading id byte plus payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFrame {
    pub id: u8,
    pub payload: Vec<u8>,
}

impl ReportFrame {
    pub fn new(id: u8, payload: Vec<u8>) -> Self {
        Self { id, payload }
    }

    /// Payload length of an input report carrying `id`
    pub fn input_payload_len(id: u8) -> usize {
        if id == LARGE_INPUT_REPORT_ID {
            LARGE_REPORT_PAYLOAD_SIZE
        } else {
            REPORT_PAYLOAD_SIZE
        }
    }
}

/// Status tuple reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub player: u8,
    pub vibrator_enabled: bool,
    pub imu_enabled: bool,
    /// One-shot: the host started pushing input
    pub start_push: bool,
    /// One-shot: the engine wants NFC/IR data
    pub start_nfc: bool,
}

/// Discrete change raised by the status notifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEvent {
    PlayerChanged(u8),
    VibratorEnableChanged(bool),
    ImuEnableChanged(bool),
    StartPush,
    FetchNfcIr,
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::PlayerChanged(index) => write!(f, "player changed to {}", index),
            StatusEvent::VibratorEnableChanged(on) => write!(f, "vibrator enabled = {}", on),
            StatusEvent::ImuEnableChanged(on) => write!(f, "IMU enabled = {}", on),
            StatusEvent::StartPush => write!(f, "start push"),
            StatusEvent::FetchNfcIr => write!(f, "fetch NFC/IR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_bits_follow_declaration_order() {
        for (index, button) in NsButton::ALL.iter().enumerate() {
            assert_eq!(button.bit() as usize, index);
        }
        assert_eq!(NsButton::ZL.mask(), 1 << 23);
    }

    #[test]
    fn test_press_then_release_leaves_clear() {
        let state = ButtonState::default().apply(&[(NsButton::A, true), (NsButton::A, false)]);
        assert!(!state.is_pressed(NsButton::A));
        assert_eq!(state.0, 0);
    }

    #[test]
    fn test_pressed_lists_in_bit_order() {
        let state = ButtonState::default().apply(&[(NsButton::ZL, true), (NsButton::Y, true)]);
        assert_eq!(state.pressed(), vec![NsButton::Y, NsButton::ZL]);
        let bits = state.to_bits();
        assert!(bits[0] && bits[23]);
        assert_eq!(bits.iter().filter(|b| **b).count(), 2);
    }

    #[test]
    fn test_input_payload_len_by_id() {
        assert_eq!(ReportFrame::input_payload_len(0x31), 361);
        assert_eq!(ReportFrame::input_payload_len(0x21), 48);
        assert_eq!(ReportFrame::input_payload_len(0x30), 48);
    }
}
