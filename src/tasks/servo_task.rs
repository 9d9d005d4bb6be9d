//! LEDC setup for the four arm servos.
extern crate alloc;

use alloc::boxed::Box;
use esp_hal::gpio::AnyPin;
use esp_hal::ledc::channel::{self, Channel, ChannelIFace, Number};
use esp_hal::ledc::timer::{self, LSClockSource, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::peripherals::LEDC;
use esp_hal::time::Rate;
use log::info;

use crate::config::SERVO_FREQUENCY;
use crate::robot::servo::ArmServos;

pub type ArmPwm = Channel<'static, LowSpeed>;

#[derive(Debug)]
pub enum ServoSetupError {
    Timer(timer::Error),
    Channel(channel::Error),
}

impl From<timer::Error> for ServoSetupError {
    fn from(e: timer::Error) -> Self {
        ServoSetupError::Timer(e)
    }
}

impl From<channel::Error> for ServoSetupError {
    fn from(e: channel::Error) -> Self {
        ServoSetupError::Channel(e)
    }
}

/// Builds the servo bank from the LEDC peripheral.
///
/// `pins` are ordered as [`crate::robot::channel::ServoChannel::ALL`]. The
/// outputs start with a 0% duty, so no servo moves until the first command.
pub fn setup_servos(
    ledc: LEDC<'static>,
    pins: [AnyPin<'static>; 4],
) -> Result<ArmServos<ArmPwm>, ServoSetupError> {
    info!("Configuring servo outputs");
    let mut ledc = Ledc::new(ledc);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

    let mut timer = ledc.timer::<LowSpeed>(timer::Number::Timer0);
    timer.configure(timer::config::Config {
        duty: timer::config::Duty::Duty14Bit,
        clock_source: LSClockSource::APBClk,
        frequency: Rate::from_hz(SERVO_FREQUENCY.raw()),
    })?;
    // Leak the timer to get static lifetime for the channels.
    let timer: &'static timer::Timer<'static, LowSpeed> = Box::leak(Box::new(timer));

    let [p0, p1, p2, p3] = pins;
    let mut outputs: [ArmPwm; 4] = [
        ledc.channel(Number::Channel0, p0),
        ledc.channel(Number::Channel1, p1),
        ledc.channel(Number::Channel2, p2),
        ledc.channel(Number::Channel3, p3),
    ];
    for output in outputs.iter_mut() {
        output.configure(channel::config::Config {
            timer,
            duty_pct: 0,
            pin_config: channel::config::PinConfig::PushPull,
        })?;
    }

    Ok(ArmServos::new(outputs))
}
