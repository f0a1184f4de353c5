//! Mock emulation engine for testing.
//!
//! This engine logs and records every call instead of driving a real
//! transport. Clones share state, so a test can keep one handle while the
//! Joycon owns another.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::{Engine, EngineContext, StatusSender, ENGINE_OK};
use crate::joycon::buffer::SharedBuffer;
use crate::joycon::error::EngineOp;
use crate::joycon::types::{ButtonState, ImuSample, ReportFrame, StatusReport, StickState};

/// Status returned by the mock when called before `init` or after `free`
pub const MOCK_NOT_READY: i32 = -1;

/// Default id of the report produced by `synthesize_input_report`
pub const MOCK_INPUT_REPORT_ID: u8 = 0x30;

/// One recorded engine call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EngineCall {
    Init { asset_path: String, asset_len: usize, layout_version: u8 },
    Free,
    ReplayOutputReport { report: ReportFrame },
    SynthesizeInputReport { report: ReportFrame },
    UpdateButtons { buttons: ButtonState },
    UpdateSticks { sticks: StickState },
    UpdateImu { accel: Option<Vec<ImuSample>>, gyro: Option<Vec<ImuSample>> },
    UpdateNfc { data: Vec<u8> },
    UpdateIr { data: Vec<u8> },
}

#[derive(Default)]
struct MockState {
    calls: Vec<EngineCall>,
    buffer: Option<SharedBuffer>,
    status: Option<StatusSender>,
    failures: HashMap<EngineOp, i32>,
    input_report_id: Option<u8>,
}

/// Mock engine that records calls instead of emulating a transport.
#[derive(Clone, Default)]
pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

impl MockEngine {
    /// Create a new mock engine.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make `op` return `status` from now on (0 clears the failure)
    pub fn fail_with(&self, op: EngineOp, status: i32) {
        let mut state = self.state();
        if status == ENGINE_OK {
            state.failures.remove(&op);
        } else {
            state.failures.insert(op, status);
        }
    }

    /// Report id used by `synthesize_input_report`
    pub fn set_input_report_id(&self, id: u8) {
        self.state().input_report_id = Some(id);
    }

    /// All calls so far, oldest first
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state().calls.clone()
    }

    /// Recorded calls as pretty JSON
    pub fn trace_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.state().calls)
    }

    pub fn is_initialized(&self) -> bool {
        self.state().buffer.is_some()
    }

    /// Buffer handle received at init, if any
    pub fn buffer(&self) -> Option<SharedBuffer> {
        self.state().buffer.clone()
    }

    /// Fire the status callback the way a native engine would
    pub fn emit_status(&self, status: StatusReport) -> bool {
        let sender = self.state().status.clone();
        match sender {
            Some(sender) => {
                info!("[MOCK ENGINE] Status callback: {:?}", status);
                sender.report(status)
            }
            None => {
                warn!("[MOCK ENGINE] Status callback before init");
                false
            }
        }
    }

    /// Write the status block into the shared buffer
    pub fn write_status_block(&self, status: StatusReport) -> bool {
        match self.buffer() {
            Some(buffer) => {
                info!("[MOCK ENGINE] Status block: {:?}", status);
                buffer.set_status(status);
                true
            }
            None => false,
        }
    }

    fn status_for(&self, op: EngineOp) -> i32 {
        let state = self.state();
        if let Some(status) = state.failures.get(&op) {
            return *status;
        }
        if op != EngineOp::Init && state.buffer.is_none() {
            return MOCK_NOT_READY;
        }
        ENGINE_OK
    }

    fn record(&self, call: EngineCall) {
        self.state().calls.push(call);
    }
}

impl Engine for MockEngine {
    fn init(&mut self, context: EngineContext) -> i32 {
        info!(
            "[MOCK ENGINE] Init: asset={} ({} bytes), layout v{}",
            context.asset.path.display(),
            context.asset.bytes.len(),
            context.layout_version
        );
        self.record(EngineCall::Init {
            asset_path: context.asset.path.display().to_string(),
            asset_len: context.asset.bytes.len(),
            layout_version: context.layout_version,
        });

        let status = self.status_for(EngineOp::Init);
        if status == ENGINE_OK {
            let mut state = self.state();
            state.buffer = Some(context.buffer);
            state.status = Some(context.status);
        }
        status
    }

    fn free(&mut self) -> i32 {
        info!("[MOCK ENGINE] Free");
        self.record(EngineCall::Free);

        let status = self.status_for(EngineOp::Free);
        if status == ENGINE_OK {
            let mut state = self.state();
            state.buffer = None;
            state.status = None;
        }
        status
    }

    fn replay_output_report(&mut self) -> i32 {
        let status = self.status_for(EngineOp::ReplayOutputReport);
        if status != ENGINE_OK {
            return status;
        }
        if let Some(buffer) = self.buffer() {
            let report = buffer.output_report();
            info!("[MOCK ENGINE] Replay output report 0x{:02x}", report.id);
            self.record(EngineCall::ReplayOutputReport { report });
        }
        status
    }

    fn synthesize_input_report(&mut self) -> i32 {
        let status = self.status_for(EngineOp::SynthesizeInputReport);
        if status != ENGINE_OK {
            return status;
        }
        let id = self.state().input_report_id.unwrap_or(MOCK_INPUT_REPORT_ID);
        if let Some(buffer) = self.buffer() {
            // Echo the raw input state as the report payload
            let mut payload = buffer.input_state_bytes();
            payload.truncate(ReportFrame::input_payload_len(id));
            if let Err(e) = buffer.set_input_report(id, &payload) {
                warn!("[MOCK ENGINE] Failed to write input report: {}", e);
                return MOCK_NOT_READY;
            }
            info!("[MOCK ENGINE] Synthesized input report 0x{:02x}", id);
            self.record(EngineCall::SynthesizeInputReport { report: buffer.input_report() });
        }
        status
    }

    fn update_buttons(&mut self, buttons: ButtonState) {
        info!("[MOCK ENGINE] Buttons: {:#010x}", buttons.0);
        self.record(EngineCall::UpdateButtons { buttons });
    }

    fn update_sticks(&mut self, sticks: StickState) {
        info!(
            "[MOCK ENGINE] Sticks: L=({}, {}) R=({}, {})",
            sticks.left.x, sticks.left.y, sticks.right.x, sticks.right.y
        );
        self.record(EngineCall::UpdateSticks { sticks });
    }

    fn update_imu(&mut self, accel: Option<&[ImuSample]>, gyro: Option<&[ImuSample]>) {
        info!(
            "[MOCK ENGINE] IMU: accel={} gyro={}",
            accel.map_or(0, |a| a.len()),
            gyro.map_or(0, |g| g.len())
        );
        self.record(EngineCall::UpdateImu {
            accel: accel.map(|a| a.to_vec()),
            gyro: gyro.map(|g| g.to_vec()),
        });
    }

    fn update_nfc(&mut self, nfc: &[u8]) {
        info!("[MOCK ENGINE] NFC: {} bytes", nfc.len());
        self.record(EngineCall::UpdateNfc { data: nfc.to_vec() });
    }

    fn update_ir(&mut self, ir: &[u8]) {
        info!("[MOCK ENGINE] IR: {} bytes", ir.len());
        self.record(EngineCall::UpdateIr { data: ir.to_vec() });
    }
}
