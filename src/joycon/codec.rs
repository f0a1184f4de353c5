//! Byte-level codec for the shared buffer
//!
//! Pure functions over a full `BUFFER_SIZE` byte slice. This is the only
//! place where typed values are turned into little-endian bytes at layout
//! offsets; everything else goes through these helpers.

use log::trace;

use crate::joycon::constants::*;
use crate::joycon::error::{JoyconError, Result};
use crate::joycon::types::{
    ButtonState, ImuSample, ReportFrame, Sensor, Stick, StickState, StatusReport,
};

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn write_u16(buf: &mut [u8], at: usize, value: u16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn read_i16(buf: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([buf[at], buf[at + 1]])
}

fn write_i16(buf: &mut [u8], at: usize, value: i16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn ensure_fits(region: &'static str, len: usize, max: usize) -> Result<()> {
    if len > max {
        return Err(JoyconError::LayoutViolation { region, len, max });
    }
    Ok(())
}

// ============================================================================
// Reports
// ============================================================================

/// Write only the input report id byte; payload bytes are left as they are
pub fn write_input_report_id(buf: &mut [u8], id: u8) {
    buf[INPUT_REPORT.offset] = id;
}

/// Read the input report, sizing the payload by the stored id
pub fn read_input_report(buf: &[u8]) -> ReportFrame {
    let id = buf[INPUT_REPORT.offset];
    let start = INPUT_REPORT.offset + 1;
    let len = ReportFrame::input_payload_len(id);
    ReportFrame::new(id, buf[start..start + len].to_vec())
}

/// Write an input report; the payload may not exceed the size implied by `id`
pub fn write_input_report(buf: &mut [u8], id: u8, payload: &[u8]) -> Result<()> {
    ensure_fits("input report", payload.len(), ReportFrame::input_payload_len(id))?;
    let start = INPUT_REPORT.offset + 1;
    buf[INPUT_REPORT.offset] = id;
    buf[start..start + payload.len()].copy_from_slice(payload);
    trace!("input report 0x{:02x}: {} payload bytes", id, payload.len());
    Ok(())
}

/// Write the output report id and payload; rejected before any byte is written
pub fn write_output_report(buf: &mut [u8], id: u8, payload: &[u8]) -> Result<()> {
    ensure_fits("output report", payload.len(), REPORT_PAYLOAD_SIZE)?;
    let start = OUTPUT_REPORT.offset + 1;
    buf[OUTPUT_REPORT.offset] = id;
    buf[start..start + payload.len()].copy_from_slice(payload);
    trace!("output report 0x{:02x}: {} payload bytes", id, payload.len());
    Ok(())
}

pub fn read_output_report(buf: &[u8]) -> ReportFrame {
    let id = buf[OUTPUT_REPORT.offset];
    let start = OUTPUT_REPORT.offset + 1;
    ReportFrame::new(id, buf[start..start + REPORT_PAYLOAD_SIZE].to_vec())
}

// ============================================================================
// Input state
// ============================================================================

pub fn read_buttons(buf: &[u8]) -> ButtonState {
    let at = BUTTONS.offset;
    ButtonState(u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]))
}

/// Store the whole mask in one 4-byte copy
pub fn write_buttons(buf: &mut [u8], buttons: ButtonState) {
    buf[BUTTONS.range()].copy_from_slice(&buttons.0.to_le_bytes());
}

fn read_stick(buf: &[u8], at: usize) -> Stick {
    Stick::new(read_u16(buf, at), read_u16(buf, at + 2))
}

fn write_stick(buf: &mut [u8], at: usize, stick: Stick) {
    write_u16(buf, at, stick.x);
    write_u16(buf, at + 2, stick.y);
}

pub fn read_sticks(buf: &[u8]) -> StickState {
    StickState {
        left: read_stick(buf, LEFT_STICK_OFFSET),
        right: read_stick(buf, RIGHT_STICK_OFFSET),
    }
}

pub fn write_left_stick(buf: &mut [u8], stick: Stick) {
    write_stick(buf, LEFT_STICK_OFFSET, stick);
}

pub fn write_right_stick(buf: &mut [u8], stick: Stick) {
    write_stick(buf, RIGHT_STICK_OFFSET, stick);
}

/// Byte offset of history slot `slot` (0..3) for `sensor`
pub fn sample_offset(sensor: Sensor, slot: usize) -> usize {
    debug_assert!(slot < IMU_HISTORY_LEN);
    let base = match sensor {
        Sensor::Accelerometer => ACCEL_BASE_OFFSET,
        Sensor::Gyroscope => GYRO_BASE_OFFSET,
    };
    base + slot * AXES_SAMPLE_STRIDE
}

pub fn write_sample(buf: &mut [u8], sensor: Sensor, slot: usize, sample: ImuSample) {
    let pos = sample_offset(sensor, slot);
    write_i16(buf, pos, sample.x);
    write_i16(buf, pos + 2, sample.y);
    write_i16(buf, pos + 4, sample.z);
    trace!("{:?} slot {} <- {:?}", sensor, slot, sample);
}

pub fn read_sample(buf: &[u8], sensor: Sensor, slot: usize) -> ImuSample {
    let pos = sample_offset(sensor, slot);
    ImuSample::new(read_i16(buf, pos), read_i16(buf, pos + 2), read_i16(buf, pos + 4))
}

/// All history slots of one sensor, in slot order (not age order)
pub fn read_samples(buf: &[u8], sensor: Sensor) -> [ImuSample; IMU_HISTORY_LEN] {
    let mut samples = [ImuSample::default(); IMU_HISTORY_LEN];
    for (slot, sample) in samples.iter_mut().enumerate() {
        *sample = read_sample(buf, sensor, slot);
    }
    samples
}

/// Raw copy of the whole input state region
pub fn read_input_state(buf: &[u8]) -> Vec<u8> {
    buf[INPUT_STATE.range()].to_vec()
}

/// Copy opaque NFC/IR bytes to the start of their region
pub fn write_nfc_ir(buf: &mut [u8], data: &[u8]) -> Result<()> {
    ensure_fits("NFC/IR", data.len(), NFC_IR.len)?;
    buf[NFC_IR.offset..NFC_IR.offset + data.len()].copy_from_slice(data);
    Ok(())
}

pub fn read_nfc_ir(buf: &[u8]) -> Vec<u8> {
    buf[NFC_IR.range()].to_vec()
}

// ============================================================================
// Status block
// ============================================================================

pub fn read_status(buf: &[u8]) -> StatusReport {
    StatusReport {
        player: buf[STATUS_PLAYER_OFFSET],
        vibrator_enabled: buf[STATUS_VIBRATOR_OFFSET] != 0,
        imu_enabled: buf[STATUS_IMU_OFFSET] != 0,
        start_push: buf[STATUS_START_PUSH_OFFSET] != 0,
        start_nfc: buf[STATUS_START_NFC_OFFSET] != 0,
    }
}

/// Encode a status tuple; reserved bytes are zeroed
pub fn write_status(buf: &mut [u8], status: StatusReport) {
    buf[STATUS.range()].fill(0);
    buf[STATUS_PLAYER_OFFSET] = status.player;
    buf[STATUS_VIBRATOR_OFFSET] = status.vibrator_enabled as u8;
    buf[STATUS_IMU_OFFSET] = status.imu_enabled as u8;
    buf[STATUS_START_PUSH_OFFSET] = status.start_push as u8;
    buf[STATUS_START_NFC_OFFSET] = status.start_nfc as u8;
}
