//! IMU history ring
//!
//! Each sensor keeps three historical samples in the buffer. A private
//! cursor per sensor picks the slot to overwrite next, so the newest write
//! always replaces the oldest sample. Slots are never shifted.

use log::trace;

use crate::joycon::buffer::SharedBuffer;
use crate::joycon::constants::IMU_HISTORY_LEN;
use crate::joycon::types::{ImuSample, Sensor};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImuRing {
    accel_cursor: usize,
    gyro_cursor: usize,
}

impl ImuRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot the next write for `sensor` will land in
    pub fn cursor(&self, sensor: Sensor) -> usize {
        match sensor {
            Sensor::Accelerometer => self.accel_cursor,
            Sensor::Gyroscope => self.gyro_cursor,
        }
    }

    fn cursor_mut(&mut self, sensor: Sensor) -> &mut usize {
        match sensor {
            Sensor::Accelerometer => &mut self.accel_cursor,
            Sensor::Gyroscope => &mut self.gyro_cursor,
        }
    }

    /// Write one sample at the cursor, then advance it; returns the slot written
    pub fn write_sample(&mut self, buffer: &SharedBuffer, sensor: Sensor, sample: ImuSample) -> usize {
        let cursor = self.cursor_mut(sensor);
        let slot = *cursor;
        buffer.write_sample(sensor, slot, sample);
        *cursor = (slot + 1) % IMU_HISTORY_LEN;
        trace!("{:?} cursor {} -> {}", sensor, slot, *cursor);
        slot
    }

    /// Stored samples ordered oldest first
    pub fn history(&self, buffer: &SharedBuffer, sensor: Sensor) -> [ImuSample; IMU_HISTORY_LEN] {
        let slots = buffer.samples(sensor);
        let oldest = self.cursor(sensor);
        let mut ordered = [ImuSample::default(); IMU_HISTORY_LEN];
        for (i, sample) in ordered.iter_mut().enumerate() {
            *sample = slots[(oldest + i) % IMU_HISTORY_LEN];
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_cycles() {
        let buffer = SharedBuffer::new();
        let mut ring = ImuRing::new();
        let slots: Vec<usize> = (0..7)
            .map(|i| ring.write_sample(&buffer, Sensor::Accelerometer, ImuSample::new(i, 0, 0)))
            .collect();
        assert_eq!(slots, vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(ring.cursor(Sensor::Accelerometer), 1);
    }

    #[test]
    fn test_fourth_write_replaces_oldest() {
        let buffer = SharedBuffer::new();
        let mut ring = ImuRing::new();
        let s0 = ImuSample::new(1, 2, 3);
        let s1 = ImuSample::new(4, 5, 6);
        let s2 = ImuSample::new(7, 8, 9);
        let s3 = ImuSample::new(-1, -2, -3);
        for s in [s0, s1, s2] {
            ring.write_sample(&buffer, Sensor::Accelerometer, s);
        }
        assert_eq!(buffer.samples(Sensor::Accelerometer), [s0, s1, s2]);

        ring.write_sample(&buffer, Sensor::Accelerometer, s3);
        assert_eq!(buffer.samples(Sensor::Accelerometer), [s3, s1, s2]);
        assert_eq!(ring.history(&buffer, Sensor::Accelerometer), [s1, s2, s3]);
    }

    #[test]
    fn test_sensors_are_independent() {
        let buffer = SharedBuffer::new();
        let mut ring = ImuRing::new();
        ring.write_sample(&buffer, Sensor::Accelerometer, ImuSample::new(10, 10, 10));
        ring.write_sample(&buffer, Sensor::Accelerometer, ImuSample::new(20, 20, 20));
        let slot = ring.write_sample(&buffer, Sensor::Gyroscope, ImuSample::new(-5, -5, -5));

        assert_eq!(slot, 0);
        assert_eq!(ring.cursor(Sensor::Accelerometer), 2);
        assert_eq!(ring.cursor(Sensor::Gyroscope), 1);
        assert_eq!(buffer.sample(Sensor::Accelerometer, 0), ImuSample::new(10, 10, 10));
        assert_eq!(buffer.sample(Sensor::Gyroscope, 0), ImuSample::new(-5, -5, -5));
    }
}
