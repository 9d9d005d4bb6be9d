//! Servo channel enumeration and per-channel calibration.
//!
//! Defines the [`ServoChannel`] enum identifying each actuator of the arm and
//! the immutable [`ChannelConfig`] describing its logical range and pulse
//! bounds. Also provides indexing helpers so per-channel arrays can be
//! addressed by channel.
use core::fmt::Display;
use core::ops::{Index, IndexMut};

use fugit::HertzU32;

use crate::config::{CHANNEL_CONFIGS, SERVO_FREQUENCY, SERVO_MAX_PULSE_US, SERVO_MIN_PULSE_US};

pub const CHANNEL_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoChannel {
    Turntable = 0,
    Claw = 1,
    ArmC = 2,
    ArmD = 3,
}

impl ServoChannel {
    pub const ALL: [ServoChannel; CHANNEL_COUNT] = [
        ServoChannel::Turntable,
        ServoChannel::Claw,
        ServoChannel::ArmC,
        ServoChannel::ArmD,
    ];

    pub fn config(self) -> &'static ChannelConfig {
        &CHANNEL_CONFIGS[self as usize]
    }

    /// Logical range maximum in degrees.
    pub fn range_max(self) -> u16 {
        self.config().range_max
    }
}

impl Display for ServoChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ServoChannel::Turntable => f.write_str("turntable"),
            ServoChannel::Claw => f.write_str("claw"),
            ServoChannel::ArmC => f.write_str("arm C"),
            ServoChannel::ArmD => f.write_str("arm D"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    InvalidChannel(u8),
}

impl Display for ChannelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChannelError::InvalidChannel(id) => write!(f, "Invalid servo channel {id}"),
        }
    }
}

impl TryFrom<u8> for ServoChannel {
    type Error = ChannelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ServoChannel::Turntable),
            1 => Ok(ServoChannel::Claw),
            2 => Ok(ServoChannel::ArmC),
            3 => Ok(ServoChannel::ArmD),
            _ => Err(ChannelError::InvalidChannel(value)),
        }
    }
}

/// Calibration of one servo output. Immutable after configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    pub channel: ServoChannel,
    /// Logical range in degrees (180 or 270).
    pub range_max: u16,
    pub min_pulse_us: u32,
    pub max_pulse_us: u32,
    pub frequency: HertzU32,
}

impl ChannelConfig {
    /// Config with the shared pulse bounds and PWM frequency.
    pub const fn standard(channel: ServoChannel, range_max: u16) -> Self {
        Self {
            channel,
            range_max,
            min_pulse_us: SERVO_MIN_PULSE_US,
            max_pulse_us: SERVO_MAX_PULSE_US,
            frequency: SERVO_FREQUENCY,
        }
    }

    /// Period of one PWM cycle in nanoseconds.
    pub fn period_ns(&self) -> u32 {
        1_000_000_000 / self.frequency.raw()
    }
}

impl<T> Index<ServoChannel> for [T; CHANNEL_COUNT] {
    type Output = T;

    fn index(&self, channel: ServoChannel) -> &Self::Output {
        &self[channel as usize]
    }
}

impl<T> IndexMut<ServoChannel> for [T; CHANNEL_COUNT] {
    fn index_mut(&mut self, channel: ServoChannel) -> &mut Self::Output {
        &mut self[channel as usize]
    }
}
