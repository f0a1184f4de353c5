//! Joycon Bridge - Demo Application
//!
//! Drives a simulated Joy-Con through one full cycle against the mock
//! engine: init, input updates, report exchange, status polling, free.

use anyhow::Context;
use joycon_bridge::config::Config;
use joycon_bridge::joycon::{AssetSource, FsAssetSource, NsButton, Sensor, StatusListener};
use joycon_bridge::{Joycon, MockEngine};
use log::info;

/// Logs every status event
struct LoggingListener;

impl StatusListener for LoggingListener {
    fn on_player_change(&mut self, index: u8) {
        info!("Player changed: {}", index);
    }

    fn on_vibrator_enable(&mut self, enabled: bool) {
        info!("Vibrator enabled: {}", enabled);
    }

    fn on_imu_enable(&mut self, enabled: bool) {
        info!("IMU enabled: {}", enabled);
    }

    fn on_start_push(&mut self) {
        info!("Host started pushing input");
    }

    fn on_fetch_nfc_ir(&mut self) {
        info!("Engine requested NFC/IR data");
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    println!("=== Joycon Bridge ===");
    println!();

    let config = Config::load_default().context("loading configs/default.toml")?;
    println!("✓ Loaded configuration from configs/default.toml");

    let assets = FsAssetSource::new(&config.device.asset_root);
    let asset = assets
        .open(&config.device.asset_path)
        .context("loading device asset")?;

    let engine = MockEngine::new();
    let mut joycon = Joycon::with_status_capacity(engine.clone(), config.engine.status_queue_capacity);
    joycon.subscribe(Box::new(LoggingListener))?;
    joycon.init(asset)?;

    // Input state
    joycon.set_buttons(&[(NsButton::A, true), (NsButton::R, true)])?;
    joycon.set_left_stick(3000, 2048)?;
    for i in 0..3 {
        joycon.set_accelerometer(100 * i, -50, 4096)?;
        joycon.set_gyroscope(0, 10 * i, -10)?;
    }
    joycon.push_buttons()?;
    joycon.push_sticks()?;
    joycon.push_imu(true, true)?;

    // Report exchange
    joycon.set_output_report(0x01, &[0x00, 0x01, 0x40, 0x40, 0x00, 0x01, 0x40, 0x40])?;
    joycon.replay_output_report()?;
    joycon.synthesize_input_report()?;
    let report = joycon.input_report()?;
    println!("Input report 0x{:02x}: {} payload bytes", report.id, report.payload.len());

    // Status from the engine, both through the callback and the status block
    engine.emit_status(joycon_bridge::joycon::StatusReport {
        player: 1,
        vibrator_enabled: true,
        start_push: true,
        ..Default::default()
    });
    let events = joycon.poll_status()?;
    println!("Status events from callback: {}", events.len());

    engine.write_status_block(joycon_bridge::joycon::StatusReport {
        player: 1,
        vibrator_enabled: true,
        imu_enabled: true,
        ..Default::default()
    });
    let events = joycon.poll_status_block()?;
    println!("Status events from status block: {}", events.len());

    println!(
        "Accelerometer history: {:?}",
        joycon.imu_history(Sensor::Accelerometer)?
    );

    joycon.free()?;
    println!();
    println!("Engine trace:");
    println!("{}", engine.trace_json()?);

    Ok(())
}
