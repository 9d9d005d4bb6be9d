//! Recording fakes for the hardware seams, shared by the motion tests.
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;

use crate::robot::channel::ServoChannel;
use crate::robot::servo::ServoBank;

#[derive(Debug, Default)]
pub struct RecordingBank {
    pub writes: Vec<(ServoChannel, u32)>,
    pub failing: Option<ServoChannel>,
}

impl RecordingBank {
    pub fn writes_for(&self, channel: ServoChannel) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, pulse)| *pulse)
            .collect()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct WriteFailed;

impl ServoBank for RecordingBank {
    type Error = WriteFailed;

    fn write_duty(&mut self, channel: ServoChannel, pulse_width_ns: u32) -> Result<(), WriteFailed> {
        if self.failing == Some(channel) {
            return Err(WriteFailed);
        }
        self.writes.push((channel, pulse_width_ns));
        Ok(())
    }
}

/// Records every requested pause in milliseconds.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub pauses: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.pauses.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.pauses.push(ms);
    }
}
