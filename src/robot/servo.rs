use core::fmt::Debug;

use embedded_hal::pwm::SetDutyCycle;
use log::debug;

use super::channel::{ChannelConfig, ServoChannel, CHANNEL_COUNT};

/// Hardware seam used by the trajectory coordinator: write one pulse width to
/// one channel.
pub trait ServoBank {
    type Error: Debug;

    fn write_duty(&mut self, channel: ServoChannel, pulse_width_ns: u32)
        -> Result<(), Self::Error>;
}

#[derive(Debug)]
pub struct Servo<PWM> {
    pwm: PWM,
    pulse_ns: Option<u32>,
    config: ChannelConfig,
}

impl<PWM> Servo<PWM>
where
    PWM: SetDutyCycle,
{
    pub fn new(pwm: PWM, config: ChannelConfig) -> Self {
        Self {
            pwm,
            pulse_ns: None,
            config,
        }
    }

    /// Drives the output with a pulse of `pulse_ns` nanoseconds.
    ///
    /// # Returns
    /// * `Ok(())` on success, or when the pulse is already applied
    /// * `Err(PWM::Error)` if the PWM driver fails to update the duty cycle
    pub fn set_pulse_ns(&mut self, pulse_ns: u32) -> Result<(), PWM::Error> {
        //Avoid setting the same pulse again
        if self.pulse_ns == Some(pulse_ns) {
            return Ok(());
        }

        // Scale pulse to PWM register resolution
        // THE WIDTH OF THE PULSE DRIVES THE ANGLE, NOT FREQ
        let max_duty = self.pwm.max_duty_cycle() as u64;
        let period_ns = self.config.period_ns() as u64;
        let duty = ((pulse_ns as u64 * max_duty) / period_ns).min(max_duty) as u16;
        debug!("{} pulse {}ns -> duty {}", self.config.channel, pulse_ns, duty);

        self.pwm.set_duty_cycle(duty)?;
        self.pulse_ns = Some(pulse_ns);
        Ok(())
    }

    pub fn pulse_ns(&self) -> Option<u32> {
        self.pulse_ns
    }
}

/// The four arm servos, indexed by [`ServoChannel`].
pub struct ArmServos<PWM> {
    servos: [Servo<PWM>; CHANNEL_COUNT],
}

impl<PWM> ArmServos<PWM>
where
    PWM: SetDutyCycle,
{
    /// Takes the PWM outputs ordered as [`ServoChannel::ALL`].
    pub fn new(outputs: [PWM; CHANNEL_COUNT]) -> Self {
        let [turntable, claw, arm_c, arm_d] = outputs;
        Self {
            servos: [
                Servo::new(turntable, *ServoChannel::Turntable.config()),
                Servo::new(claw, *ServoChannel::Claw.config()),
                Servo::new(arm_c, *ServoChannel::ArmC.config()),
                Servo::new(arm_d, *ServoChannel::ArmD.config()),
            ],
        }
    }

    pub fn servo(&self, channel: ServoChannel) -> &Servo<PWM> {
        &self.servos[channel]
    }
}

impl<PWM> ServoBank for ArmServos<PWM>
where
    PWM: SetDutyCycle,
{
    type Error = PWM::Error;

    fn write_duty(
        &mut self,
        channel: ServoChannel,
        pulse_width_ns: u32,
    ) -> Result<(), Self::Error> {
        self.servos[channel].set_pulse_ns(pulse_width_ns)
    }
}
