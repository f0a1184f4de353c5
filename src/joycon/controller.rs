//! Joycon host API
//!
//! Owns the shared buffer, the IMU ring cursors and the status notifier,
//! and drives an [`Engine`]. Every buffer operation requires a completed
//! `init` and fails once `free` has run.

use crossbeam_channel::{bounded, Receiver};
use log::{debug, info, warn};

use crate::engine::{Engine, EngineContext, StatusSender};
use crate::joycon::asset::DeviceAsset;
use crate::joycon::buffer::SharedBuffer;
use crate::joycon::constants::{IMU_HISTORY_LEN, LAYOUT_VERSION, STICK_CENTER, STICK_MAX_VALUE};
use crate::joycon::error::{check_status, EngineOp, JoyconError, Lifecycle, Result};
use crate::joycon::imu::ImuRing;
use crate::joycon::status::{StatusListener, StatusNotifier};
use crate::joycon::types::{
    ButtonState, ImuSample, NsButton, ReportFrame, Sensor, Stick, StickState, StatusEvent,
    StatusReport,
};

/// Default depth of the engine status queue
pub const DEFAULT_STATUS_QUEUE_CAPACITY: usize = 32;

/// A simulated Joy-Con bound to one engine
pub struct Joycon<E: Engine> {
    engine: E,
    buffer: SharedBuffer,
    imu: ImuRing,
    notifier: StatusNotifier,
    lifecycle: Lifecycle,
    status_capacity: usize,
    status_rx: Option<Receiver<StatusReport>>,
}

impl<E: Engine> Joycon<E> {
    /// Create a Joycon with a fresh zeroed buffer
    pub fn new(engine: E) -> Self {
        Self::with_status_capacity(engine, DEFAULT_STATUS_QUEUE_CAPACITY)
    }

    /// Create a Joycon whose engine status queue holds up to `capacity` reports
    pub fn with_status_capacity(engine: E, capacity: usize) -> Self {
        Self {
            engine,
            buffer: SharedBuffer::new(),
            imu: ImuRing::new(),
            notifier: StatusNotifier::new(),
            lifecycle: Lifecycle::Created,
            status_capacity: capacity.max(1),
            status_rx: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn ready_buffer(&self) -> Result<&SharedBuffer> {
        match self.lifecycle {
            Lifecycle::Ready => Ok(&self.buffer),
            other => Err(JoyconError::UninitializedAccess(other)),
        }
    }

    /// Raw buffer handle, for engine-side code and diagnostics
    pub fn buffer(&self) -> Result<&SharedBuffer> {
        self.ready_buffer()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Hand the buffer to the engine, then center both sticks.
    ///
    /// Must be called exactly once. If the engine reports failure the Joycon
    /// stays uninitialized and the status is returned unchanged.
    pub fn init(&mut self, asset: DeviceAsset) -> Result<()> {
        if self.lifecycle != Lifecycle::Created {
            return Err(JoyconError::AlreadyInitialized(self.lifecycle));
        }

        info!("Initializing joycon with asset {}", asset.path.display());
        let (tx, rx) = bounded(self.status_capacity);
        let context = EngineContext {
            buffer: self.buffer.clone(),
            asset,
            status: StatusSender::new(tx),
            layout_version: LAYOUT_VERSION,
        };
        check_status(EngineOp::Init, self.engine.init(context))?;

        self.status_rx = Some(rx);
        self.lifecycle = Lifecycle::Ready;
        self.buffer.set_left_stick(Stick::CENTERED);
        self.buffer.set_right_stick(Stick::CENTERED);

        info!("✓ Joycon ready (sticks centered at {})", STICK_CENTER);
        Ok(())
    }

    /// Release engine resources. The buffer is unusable afterwards.
    pub fn free(&mut self) -> Result<()> {
        self.ready_buffer()?;
        check_status(EngineOp::Free, self.engine.free())?;

        self.lifecycle = Lifecycle::Freed;
        self.status_rx = None;
        info!("✓ Joycon freed");
        Ok(())
    }

    // ========================================================================
    // Reports
    // ========================================================================

    pub fn set_input_report_id(&self, id: u8) -> Result<()> {
        self.ready_buffer()?.set_input_report_id(id);
        Ok(())
    }

    /// Current input report; 361 payload bytes for id 0x31, 48 otherwise
    pub fn input_report(&self) -> Result<ReportFrame> {
        Ok(self.ready_buffer()?.input_report())
    }

    pub fn set_output_report(&self, id: u8, payload: &[u8]) -> Result<()> {
        self.ready_buffer()?.set_output_report(id, payload)
    }

    pub fn output_report(&self) -> Result<ReportFrame> {
        Ok(self.ready_buffer()?.output_report())
    }

    // ========================================================================
    // Input state
    // ========================================================================

    /// Apply `(button, pressed)` pairs in order; the mask is stored in one write
    pub fn set_buttons(&self, changes: &[(NsButton, bool)]) -> Result<ButtonState> {
        let state = self.ready_buffer()?.set_buttons(changes);
        debug!("Buttons now {:#010x}", state.0);
        Ok(state)
    }

    pub fn buttons(&self) -> Result<ButtonState> {
        Ok(self.ready_buffer()?.buttons())
    }

    pub fn set_left_stick(&self, x: u16, y: u16) -> Result<()> {
        let buffer = self.ready_buffer()?;
        Self::check_stick_range("left", x, y);
        buffer.set_left_stick(Stick::new(x, y));
        Ok(())
    }

    pub fn set_right_stick(&self, x: u16, y: u16) -> Result<()> {
        let buffer = self.ready_buffer()?;
        Self::check_stick_range("right", x, y);
        buffer.set_right_stick(Stick::new(x, y));
        Ok(())
    }

    // Out-of-range values are still written; the engine decides what they mean.
    fn check_stick_range(side: &str, x: u16, y: u16) {
        if x > STICK_MAX_VALUE || y > STICK_MAX_VALUE {
            debug!("{} stick ({}, {}) beyond {}", side, x, y, STICK_MAX_VALUE);
        }
    }

    pub fn sticks(&self) -> Result<StickState> {
        Ok(self.ready_buffer()?.sticks())
    }

    /// Overwrite the oldest accelerometer sample
    pub fn set_accelerometer(&mut self, x: i16, y: i16, z: i16) -> Result<usize> {
        self.write_imu(Sensor::Accelerometer, ImuSample::new(x, y, z))
    }

    /// Overwrite the oldest gyroscope sample
    pub fn set_gyroscope(&mut self, x: i16, y: i16, z: i16) -> Result<usize> {
        self.write_imu(Sensor::Gyroscope, ImuSample::new(x, y, z))
    }

    fn write_imu(&mut self, sensor: Sensor, sample: ImuSample) -> Result<usize> {
        self.ready_buffer()?;
        Ok(self.imu.write_sample(&self.buffer, sensor, sample))
    }

    /// Stored samples for `sensor`, oldest first
    pub fn imu_history(&self, sensor: Sensor) -> Result<[ImuSample; IMU_HISTORY_LEN]> {
        let buffer = self.ready_buffer()?;
        Ok(self.imu.history(buffer, sensor))
    }

    /// Slot the next sample for `sensor` will overwrite
    pub fn imu_cursor(&self, sensor: Sensor) -> usize {
        self.imu.cursor(sensor)
    }

    pub fn nfc_ir(&self) -> Result<Vec<u8>> {
        Ok(self.ready_buffer()?.nfc_ir())
    }

    // ========================================================================
    // Engine pass-through
    // ========================================================================

    /// Ask the engine to consume the output report region
    pub fn replay_output_report(&mut self) -> Result<()> {
        self.ready_buffer()?;
        debug!("Replaying output report");
        check_status(EngineOp::ReplayOutputReport, self.engine.replay_output_report())
    }

    /// Ask the engine to produce a report into the input report region
    pub fn synthesize_input_report(&mut self) -> Result<()> {
        self.ready_buffer()?;
        debug!("Synthesizing input report");
        check_status(EngineOp::SynthesizeInputReport, self.engine.synthesize_input_report())
    }

    /// Tell the engine the button mask changed
    pub fn push_buttons(&mut self) -> Result<()> {
        let buttons = self.ready_buffer()?.buttons();
        self.engine.update_buttons(buttons);
        Ok(())
    }

    /// Tell the engine the sticks changed
    pub fn push_sticks(&mut self) -> Result<()> {
        let sticks = self.ready_buffer()?.sticks();
        self.engine.update_sticks(sticks);
        Ok(())
    }

    /// Hand the engine the stored history (oldest first) of the selected sensors
    pub fn push_imu(&mut self, accel: bool, gyro: bool) -> Result<()> {
        let buffer = self.ready_buffer()?;
        let accel_samples = accel.then(|| self.imu.history(buffer, Sensor::Accelerometer));
        let gyro_samples = gyro.then(|| self.imu.history(buffer, Sensor::Gyroscope));
        self.engine.update_imu(
            accel_samples.as_ref().map(|s| &s[..]),
            gyro_samples.as_ref().map(|s| &s[..]),
        );
        Ok(())
    }

    /// Store NFC tag bytes in the NFC/IR region and notify the engine
    pub fn push_nfc(&mut self, data: &[u8]) -> Result<()> {
        self.ready_buffer()?.set_nfc_ir(data)?;
        self.engine.update_nfc(data);
        Ok(())
    }

    /// Store IR camera bytes in the NFC/IR region and notify the engine
    pub fn push_ir(&mut self, data: &[u8]) -> Result<()> {
        self.ready_buffer()?.set_nfc_ir(data)?;
        self.engine.update_ir(data);
        Ok(())
    }

    // ========================================================================
    // Status
    // ========================================================================

    pub fn subscribe(&mut self, listener: Box<dyn StatusListener>) -> Result<()> {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self) -> Option<Box<dyn StatusListener>> {
        self.notifier.unsubscribe()
    }

    /// Run one status report through change detection
    pub fn dispatch_status(&mut self, report: StatusReport) -> Vec<StatusEvent> {
        self.notifier.on_status(report)
    }

    /// Drain status reports queued by the engine callback
    pub fn poll_status(&mut self) -> Result<Vec<StatusEvent>> {
        self.ready_buffer()?;
        let reports: Vec<StatusReport> = match &self.status_rx {
            Some(rx) => rx.try_iter().collect(),
            None => {
                warn!("No status queue while ready");
                Vec::new()
            }
        };
        let mut events = Vec::new();
        for report in reports {
            events.extend(self.notifier.on_status(report));
        }
        Ok(events)
    }

    /// Read the status block the engine wrote into the buffer
    pub fn poll_status_block(&mut self) -> Result<Vec<StatusEvent>> {
        let report = self.ready_buffer()?.status();
        Ok(self.notifier.on_status(report))
    }

    /// Last observed `(player, vibrator_enabled, imu_enabled)`
    pub fn cached_status(&self) -> (u8, bool, bool) {
        self.notifier.cached()
    }
}
