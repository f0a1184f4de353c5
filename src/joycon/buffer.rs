//! Shared buffer handle
//!
//! A cloneable handle to the single fixed-size byte region shared by the
//! host and the engine. Every field access runs inside one short exclusive
//! section, so a 4-byte mask or a 2-byte field is never observed torn.
//! Nothing spans more than one field; ordering across fields is the
//! caller's concern.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::joycon::codec;
use crate::joycon::constants::{BUFFER_SIZE, IMU_HISTORY_LEN};
use crate::joycon::error::Result;
use crate::joycon::types::{
    ButtonState, ImuSample, NsButton, ReportFrame, Sensor, Stick, StickState, StatusReport,
};

#[derive(Clone)]
pub struct SharedBuffer {
    bytes: Arc<RwLock<Box<[u8]>>>,
}

impl SharedBuffer {
    /// Allocate a zeroed buffer of `BUFFER_SIZE` bytes
    pub fn new() -> Self {
        Self {
            bytes: Arc::new(RwLock::new(vec![0u8; BUFFER_SIZE].into_boxed_slice())),
        }
    }

    pub fn len(&self) -> usize {
        BUFFER_SIZE
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    // A poisoned lock still guards valid bytes; a panicking writer can at
    // worst leave one field half-updated.
    fn read_guard(&self) -> RwLockReadGuard<'_, Box<[u8]>> {
        self.bytes.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Box<[u8]>> {
        self.bytes.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` with shared access to the raw bytes
    pub fn read<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let guard = self.read_guard();
        f(&guard[..])
    }

    /// Run `f` with exclusive access to the raw bytes
    pub fn write<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let mut guard = self.write_guard();
        f(&mut guard[..])
    }

    /// Copy of the whole buffer
    pub fn snapshot(&self) -> Vec<u8> {
        self.read(|buf| buf.to_vec())
    }

    /// Whether two handles point at the same region
    pub fn same_region(&self, other: &SharedBuffer) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    // ------------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------------

    pub fn set_input_report_id(&self, id: u8) {
        self.write(|buf| codec::write_input_report_id(buf, id));
    }

    pub fn set_input_report(&self, id: u8, payload: &[u8]) -> Result<()> {
        self.write(|buf| codec::write_input_report(buf, id, payload))
    }

    pub fn input_report(&self) -> ReportFrame {
        self.read(codec::read_input_report)
    }

    pub fn set_output_report(&self, id: u8, payload: &[u8]) -> Result<()> {
        self.write(|buf| codec::write_output_report(buf, id, payload))
    }

    pub fn output_report(&self) -> ReportFrame {
        self.read(codec::read_output_report)
    }

    // ------------------------------------------------------------------------
    // Input state
    // ------------------------------------------------------------------------

    /// Read-modify-write of the button mask under a single exclusive section
    pub fn set_buttons(&self, changes: &[(NsButton, bool)]) -> ButtonState {
        self.write(|buf| {
            let updated = codec::read_buttons(buf).apply(changes);
            codec::write_buttons(buf, updated);
            updated
        })
    }

    pub fn buttons(&self) -> ButtonState {
        self.read(codec::read_buttons)
    }

    pub fn set_left_stick(&self, stick: Stick) {
        self.write(|buf| codec::write_left_stick(buf, stick));
    }

    pub fn set_right_stick(&self, stick: Stick) {
        self.write(|buf| codec::write_right_stick(buf, stick));
    }

    pub fn sticks(&self) -> StickState {
        self.read(codec::read_sticks)
    }

    pub fn write_sample(&self, sensor: Sensor, slot: usize, sample: ImuSample) {
        self.write(|buf| codec::write_sample(buf, sensor, slot, sample));
    }

    pub fn sample(&self, sensor: Sensor, slot: usize) -> ImuSample {
        self.read(|buf| codec::read_sample(buf, sensor, slot))
    }

    pub fn samples(&self, sensor: Sensor) -> [ImuSample; IMU_HISTORY_LEN] {
        self.read(|buf| codec::read_samples(buf, sensor))
    }

    /// Raw bytes of the whole input state region
    pub fn input_state_bytes(&self) -> Vec<u8> {
        self.read(codec::read_input_state)
    }

    pub fn set_nfc_ir(&self, data: &[u8]) -> Result<()> {
        self.write(|buf| codec::write_nfc_ir(buf, data))
    }

    pub fn nfc_ir(&self) -> Vec<u8> {
        self.read(codec::read_nfc_ir)
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    pub fn set_status(&self, status: StatusReport) {
        self.write(|buf| codec::write_status(buf, status));
    }

    pub fn status(&self) -> StatusReport {
        self.read(codec::read_status)
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &BUFFER_SIZE)
            .field("handles", &Arc::strong_count(&self.bytes))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_bytes() {
        let host = SharedBuffer::new();
        let engine = host.clone();
        engine.set_output_report(0x10, &[1, 2, 3]).unwrap();

        assert!(host.same_region(&engine));
        assert_eq!(host.output_report().id, 0x10);
        assert_eq!(host.snapshot().len(), 599);
        assert!(!SharedBuffer::new().same_region(&host));
    }

    #[test]
    fn test_set_buttons_folds_in_call_order() {
        let buffer = SharedBuffer::new();
        buffer.set_buttons(&[(NsButton::A, true), (NsButton::B, true)]);
        buffer.set_buttons(&[]);
        let state = buffer.set_buttons(&[(NsButton::A, false), (NsButton::Home, true)]);

        assert_eq!(state, buffer.buttons());
        assert_eq!(state.0, NsButton::B.mask() | NsButton::Home.mask());
    }

    #[test]
    fn test_concurrent_button_writers_never_lose_bits() {
        let buffer = SharedBuffer::new();
        let handles: Vec<_> = NsButton::ALL
            .iter()
            .copied()
            .map(|button| {
                let buffer = buffer.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        buffer.set_buttons(&[(button, true)]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(buffer.buttons().0, 0x00FF_FFFF);
    }
}
