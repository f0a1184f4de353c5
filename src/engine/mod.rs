//! Emulation engine abstraction
//!
//! The engine is the native side that owns the transport. The Joycon only
//! talks to it through this trait: it hands over the shared buffer once at
//! init, then signals which regions to consume or refresh.

pub mod mock;

pub use mock::{EngineCall, MockEngine};

use crossbeam_channel::{Sender, TrySendError};
use log::warn;

use crate::joycon::asset::DeviceAsset;
use crate::joycon::buffer::SharedBuffer;
use crate::joycon::types::{ButtonState, ImuSample, StatusReport, StickState};

/// Native status code meaning success
pub const ENGINE_OK: i32 = 0;

/// Engine-side handle for reporting status back to the Joycon
#[derive(Debug, Clone)]
pub struct StatusSender {
    sender: Sender<StatusReport>,
}

impl StatusSender {
    pub fn new(sender: Sender<StatusReport>) -> Self {
        Self { sender }
    }

    /// Queue a status report; returns false if it could not be queued
    pub fn report(&self, status: StatusReport) -> bool {
        match self.sender.try_send(status) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Status queue full, dropping {:?}", status);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Everything the engine receives at init and may keep for its lifetime
#[derive(Debug, Clone)]
pub struct EngineContext {
    pub buffer: SharedBuffer,
    pub asset: DeviceAsset,
    pub status: StatusSender,
    /// Layout version the buffer was built with
    pub layout_version: u8,
}

/// Operations the Joycon hands off to the emulation engine.
///
/// Status-returning calls use native codes: `ENGINE_OK` on success, anything
/// else is a failure the Joycon surfaces unchanged. Update calls are one-way.
pub trait Engine {
    /// One-time setup; the engine keeps the buffer handle until `free`
    fn init(&mut self, context: EngineContext) -> i32;

    fn free(&mut self) -> i32;

    /// Consume the output report region
    fn replay_output_report(&mut self) -> i32;

    /// Produce a report into the input report region
    fn synthesize_input_report(&mut self) -> i32;

    fn update_buttons(&mut self, buttons: ButtonState);

    fn update_sticks(&mut self, sticks: StickState);

    /// `None` means no update for that sensor this cycle
    fn update_imu(&mut self, accel: Option<&[ImuSample]>, gyro: Option<&[ImuSample]>);

    fn update_nfc(&mut self, nfc: &[u8]);

    fn update_ir(&mut self, ir: &[u8]);
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn init(&mut self, context: EngineContext) -> i32 {
        (**self).init(context)
    }

    fn free(&mut self) -> i32 {
        (**self).free()
    }

    fn replay_output_report(&mut self) -> i32 {
        (**self).replay_output_report()
    }

    fn synthesize_input_report(&mut self) -> i32 {
        (**self).synthesize_input_report()
    }

    fn update_buttons(&mut self, buttons: ButtonState) {
        (**self).update_buttons(buttons)
    }

    fn update_sticks(&mut self, sticks: StickState) {
        (**self).update_sticks(sticks)
    }

    fn update_imu(&mut self, accel: Option<&[ImuSample]>, gyro: Option<&[ImuSample]>) {
        (**self).update_imu(accel, gyro)
    }

    fn update_nfc(&mut self, nfc: &[u8]) {
        (**self).update_nfc(nfc)
    }

    fn update_ir(&mut self, ir: &[u8]) {
        (**self).update_ir(ir)
    }
}
