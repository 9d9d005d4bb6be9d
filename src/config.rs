//! Compile-time configuration for the arm firmware.
//!
//! Network, servo calibration and motion timing constants live here so the
//! tasks and the motion code agree on them.
use fugit::HertzU32;

use crate::robot::channel::{ChannelConfig, ServoChannel};

// NETWORK
pub const PORT: u16 = 8080;
/// One `recv` worth of command text. Longer payloads are truncated.
pub const RX_BUF_SIZE: usize = 1024;
pub const TX_BUF_SIZE: usize = 512;
pub const COMMAND_CHANNEL_SIZE: usize = 1;

/// Polls of the link state while waiting for WiFi on the retry path.
pub const WIFI_RETRY_POLLS: u32 = 20;
pub const WIFI_POLL_INTERVAL_MS: u64 = 500;

// SERVO CALIBRATION
pub const SERVO_FREQUENCY: HertzU32 = HertzU32::from_raw(50);
pub const SERVO_MIN_PULSE_US: u32 = 500; // 0°
pub const SERVO_MAX_PULSE_US: u32 = 2400; // 180°
/// Angle range the duty-cycle mapping is calibrated for.
pub const HARDWARE_RANGE_DEG: f32 = 180.0;

//[turntable, claw, arm C, arm D] on GPIO [4, 5, 6, 7]
pub static CHANNEL_CONFIGS: [ChannelConfig; 4] = [
    ChannelConfig::standard(ServoChannel::Turntable, 270),
    ChannelConfig::standard(ServoChannel::Claw, 180),
    ChannelConfig::standard(ServoChannel::ArmC, 270),
    ChannelConfig::standard(ServoChannel::ArmD, 270),
];

// MOTION TIMING
pub const MAX_SPEED: u8 = 10;
pub const MIN_SPEED: u8 = 1;
/// Largest single move request, the widest channel range.
pub const MAX_MOVE_DEG: u16 = 270;
pub const BASE_STEP_DELAY_MS: u32 = 50; // speed 1
pub const STEP_DELAY_PER_SPEED_MS: u32 = 4;
pub const MIN_STEP_DELAY_MS: u32 = 10;
/// Wait after zeroing the position store before a gesture starts.
pub const INIT_SETTLE_MS: u32 = 1000;
