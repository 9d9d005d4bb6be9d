//! Angle to servo pulse conversion.
//!
//! The duty-cycle mapping is calibrated for a 180° actuator, so logical angles
//! of wider channels are linearly rescaled onto 0..=180 first.
use crate::config::HARDWARE_RANGE_DEG;
use crate::robot::channel::ChannelConfig;

/// Pulse width in nanoseconds for a hardware angle in `0..=180` degrees.
///
/// Out of range inputs are clamped; the mapping never fails.
pub fn duty(config: &ChannelConfig, angle_deg: f32) -> u32 {
    let angle = angle_deg.clamp(0.0, HARDWARE_RANGE_DEG);
    let pulse_width_range = (config.max_pulse_us - config.min_pulse_us) as f32;
    let pulse_us = config.min_pulse_us as f32 + (angle / HARDWARE_RANGE_DEG) * pulse_width_range;
    (pulse_us * 1000.0) as u32
}

/// Rescales a logical angle in `0..=range_max` onto the hardware `0..=180`.
pub fn to_hardware_angle(config: &ChannelConfig, logical_deg: u16) -> f32 {
    let logical = logical_deg.min(config.range_max) as f32;
    (logical / config.range_max as f32) * HARDWARE_RANGE_DEG
}

/// Pulse width in nanoseconds for a logical angle of the channel.
pub fn logical_duty(config: &ChannelConfig, logical_deg: u16) -> u32 {
    duty(config, to_hardware_angle(config, logical_deg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::channel::ServoChannel;

    #[test]
    fn test_duty_bounds() {
        let config = ServoChannel::Claw.config();
        assert_eq!(duty(config, 0.0), 500_000);
        assert_eq!(duty(config, 180.0), 2_400_000);
        assert_eq!(duty(config, 90.0), 1_450_000);
    }

    #[test]
    fn test_duty_clamps_input() {
        let config = ServoChannel::Claw.config();
        assert_eq!(duty(config, -20.0), 500_000);
        assert_eq!(duty(config, 400.0), 2_400_000);
    }

    #[test]
    fn test_rescale_wide_channel() {
        let config = ServoChannel::Turntable.config();
        assert_eq!(to_hardware_angle(config, 0), 0.0);
        assert_eq!(to_hardware_angle(config, 135), 90.0);
        assert_eq!(to_hardware_angle(config, 270), 180.0);
        assert_eq!(logical_duty(config, 270), 2_400_000);
    }

    #[test]
    fn test_rescale_native_channel_is_identity() {
        let config = ServoChannel::Claw.config();
        assert_eq!(to_hardware_angle(config, 45), 45.0);
        assert_eq!(logical_duty(config, 90), duty(config, 90.0));
    }

    #[test]
    fn test_duty_is_monotonic() {
        let config = ServoChannel::ArmC.config();
        let mut last = 0;
        for angle in 0..=270 {
            let pulse = logical_duty(config, angle);
            assert!(pulse >= last);
            last = pulse;
        }
    }
}
