//! Logical position of every servo channel.
//!
//! Positions start at zero and are only written by the trajectory coordinator
//! once a motion has finished.
use super::channel::{ServoChannel, CHANNEL_COUNT};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServoState {
    angles: [u16; CHANNEL_COUNT],
}

impl ServoState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical angle in degrees.
    pub fn get(&self, channel: ServoChannel) -> u16 {
        self.angles[channel]
    }

    /// Overwrite the tracked angle. The caller has already clamped it to the
    /// channel range.
    pub fn set(&mut self, channel: ServoChannel, angle: u16) {
        debug_assert!(angle <= channel.range_max());
        self.angles[channel] = angle;
    }

    /// Treat the current physical pose as the new zero for every channel.
    pub fn reset_all(&mut self) {
        self.angles = [0; CHANNEL_COUNT];
    }

    /// Snapshot ordered as [`ServoChannel::ALL`].
    pub fn positions(&self) -> [u16; CHANNEL_COUNT] {
        self.angles
    }
}
