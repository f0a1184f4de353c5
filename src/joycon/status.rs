//! Status change detection
//!
//! The engine reports a status tuple on every poll. The notifier keeps the
//! last observed player index and feature flags and only raises an event on
//! a transition. The two one-shot signals carry no state and fire every
//! time they are observed set.

use crossbeam_channel::{Sender, TrySendError};
use log::{debug, warn};

use crate::joycon::error::{JoyconError, Result};
use crate::joycon::types::{StatusEvent, StatusReport};

/// Receiver of status events. Every callback defaults to a no-op.
pub trait StatusListener: Send {
    fn on_player_change(&mut self, _index: u8) {}

    fn on_vibrator_enable(&mut self, _enabled: bool) {}

    fn on_imu_enable(&mut self, _enabled: bool) {}

    fn on_start_push(&mut self) {}

    fn on_fetch_nfc_ir(&mut self) {}
}

impl StatusEvent {
    /// Invoke the matching listener callback
    pub fn dispatch(&self, listener: &mut dyn StatusListener) {
        match *self {
            StatusEvent::PlayerChanged(index) => listener.on_player_change(index),
            StatusEvent::VibratorEnableChanged(enabled) => listener.on_vibrator_enable(enabled),
            StatusEvent::ImuEnableChanged(enabled) => listener.on_imu_enable(enabled),
            StatusEvent::StartPush => listener.on_start_push(),
            StatusEvent::FetchNfcIr => listener.on_fetch_nfc_ir(),
        }
    }
}

/// Forwards every event into a channel for consumption on another thread
pub struct ChannelListener {
    sender: Sender<StatusEvent>,
}

impl ChannelListener {
    pub fn new(sender: Sender<StatusEvent>) -> Self {
        Self { sender }
    }

    fn forward(&self, event: StatusEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => warn!("Status channel full, dropping event: {}", event),
            Err(TrySendError::Disconnected(event)) => {
                debug!("Status channel closed, dropping event: {}", event)
            }
        }
    }
}

impl StatusListener for ChannelListener {
    fn on_player_change(&mut self, index: u8) {
        self.forward(StatusEvent::PlayerChanged(index));
    }

    fn on_vibrator_enable(&mut self, enabled: bool) {
        self.forward(StatusEvent::VibratorEnableChanged(enabled));
    }

    fn on_imu_enable(&mut self, enabled: bool) {
        self.forward(StatusEvent::ImuEnableChanged(enabled));
    }

    fn on_start_push(&mut self) {
        self.forward(StatusEvent::StartPush);
    }

    fn on_fetch_nfc_ir(&mut self) {
        self.forward(StatusEvent::FetchNfcIr);
    }
}

/// Cached status plus a single listener slot
#[derive(Default)]
pub struct StatusNotifier {
    player: u8,
    vibrate: bool,
    imu: bool,
    listener: Option<Box<dyn StatusListener>>,
}

impl StatusNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupy the listener slot; fails if a listener is already subscribed
    pub fn subscribe(&mut self, listener: Box<dyn StatusListener>) -> Result<()> {
        if self.listener.is_some() {
            return Err(JoyconError::ListenerSlotOccupied);
        }
        self.listener = Some(listener);
        debug!("Status listener subscribed");
        Ok(())
    }

    /// Empty the listener slot, handing back whatever was subscribed
    pub fn unsubscribe(&mut self) -> Option<Box<dyn StatusListener>> {
        let previous = self.listener.take();
        if previous.is_some() {
            debug!("Status listener unsubscribed");
        }
        previous
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Last observed `(player, vibrator_enabled, imu_enabled)`
    pub fn cached(&self) -> (u8, bool, bool) {
        (self.player, self.vibrate, self.imu)
    }

    /// Compare against the cache, update it, and notify the listener.
    ///
    /// Events are raised in a fixed order: player, vibrator, IMU, push, NFC/IR.
    /// The raised events are also returned, whether or not a listener is set.
    pub fn on_status(&mut self, report: StatusReport) -> Vec<StatusEvent> {
        let mut events = Vec::new();

        if report.player != self.player {
            self.player = report.player;
            events.push(StatusEvent::PlayerChanged(report.player));
        }
        if report.vibrator_enabled != self.vibrate {
            self.vibrate = report.vibrator_enabled;
            events.push(StatusEvent::VibratorEnableChanged(report.vibrator_enabled));
        }
        if report.imu_enabled != self.imu {
            self.imu = report.imu_enabled;
            events.push(StatusEvent::ImuEnableChanged(report.imu_enabled));
        }
        if report.start_push {
            events.push(StatusEvent::StartPush);
        }
        if report.start_nfc {
            events.push(StatusEvent::FetchNfcIr);
        }

        for event in &events {
            debug!("Status event: {}", event);
            if let Some(listener) = self.listener.as_deref_mut() {
                event.dispatch(listener);
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn report(player: u8) -> StatusReport {
        StatusReport { player, ..Default::default() }
    }

    #[test]
    fn test_player_transition_fires_once() {
        let mut notifier = StatusNotifier::new();
        assert_eq!(notifier.on_status(report(1)), vec![StatusEvent::PlayerChanged(1)]);
        assert_eq!(notifier.on_status(report(2)), vec![StatusEvent::PlayerChanged(2)]);
        assert!(notifier.on_status(report(2)).is_empty());
        assert_eq!(notifier.cached(), (2, false, false));
    }

    #[test]
    fn test_flags_fire_on_transition_only() {
        let mut notifier = StatusNotifier::new();
        let on = StatusReport { vibrator_enabled: true, imu_enabled: true, ..Default::default() };

        assert_eq!(
            notifier.on_status(on),
            vec![StatusEvent::VibratorEnableChanged(true), StatusEvent::ImuEnableChanged(true)]
        );
        assert!(notifier.on_status(on).is_empty());
        assert_eq!(
            notifier.on_status(StatusReport::default()),
            vec![StatusEvent::VibratorEnableChanged(false), StatusEvent::ImuEnableChanged(false)]
        );
    }

    #[test]
    fn test_one_shots_fire_every_time() {
        let mut notifier = StatusNotifier::new();
        let push = StatusReport { start_push: true, start_nfc: true, ..Default::default() };

        for _ in 0..2 {
            assert_eq!(
                notifier.on_status(push),
                vec![StatusEvent::StartPush, StatusEvent::FetchNfcIr]
            );
        }
    }

    #[test]
    fn test_fixed_event_order() {
        let mut notifier = StatusNotifier::new();
        let all = StatusReport {
            player: 4,
            vibrator_enabled: true,
            imu_enabled: true,
            start_push: true,
            start_nfc: true,
        };
        assert_eq!(
            notifier.on_status(all),
            vec![
                StatusEvent::PlayerChanged(4),
                StatusEvent::VibratorEnableChanged(true),
                StatusEvent::ImuEnableChanged(true),
                StatusEvent::StartPush,
                StatusEvent::FetchNfcIr,
            ]
        );
    }

    #[test]
    fn test_single_slot_subscription() {
        let (tx, rx) = bounded(8);
        let mut notifier = StatusNotifier::new();
        notifier.subscribe(Box::new(ChannelListener::new(tx.clone()))).unwrap();

        let err = notifier.subscribe(Box::new(ChannelListener::new(tx))).unwrap_err();
        assert!(matches!(err, JoyconError::ListenerSlotOccupied));

        notifier.on_status(report(1));
        assert_eq!(rx.try_recv().unwrap(), StatusEvent::PlayerChanged(1));

        assert!(notifier.unsubscribe().is_some());
        assert!(!notifier.has_listener());
        notifier.on_status(report(2));
        assert!(rx.try_recv().is_err());
        assert!(notifier.unsubscribe().is_none());
    }

    #[test]
    fn test_full_channel_drops_event() {
        let (tx, rx) = bounded(1);
        let mut notifier = StatusNotifier::new();
        notifier.subscribe(Box::new(ChannelListener::new(tx))).unwrap();

        let push = StatusReport { start_push: true, ..Default::default() };
        notifier.on_status(push);
        notifier.on_status(push);
        assert_eq!(rx.len(), 1);
    }
}
