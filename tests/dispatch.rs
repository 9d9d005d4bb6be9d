use claw_arm::dispatch::Dispatcher;
use claw_arm::robot::channel::ServoChannel;
use claw_arm::robot::commands::{CommandResult, Status};
use claw_arm::robot::servo::ArmServos;
use embassy_futures::block_on;
use embedded_hal::pwm::{ErrorKind, ErrorType, SetDutyCycle};
use embedded_hal_async::delay::DelayNs;

#[derive(Debug, Default)]
struct FakePwm {
    duties: Vec<u16>,
}

impl ErrorType for FakePwm {
    type Error = ErrorKind;
}

impl SetDutyCycle for FakePwm {
    fn max_duty_cycle(&self) -> u16 {
        16383
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duties.push(duty);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct TotalDelay {
    total_ms: u64,
}

impl DelayNs for TotalDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ms += ns as u64 / 1_000_000;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms as u64;
    }
}

fn arm() -> Dispatcher<ArmServos<FakePwm>, TotalDelay> {
    let servos = ArmServos::new([
        FakePwm::default(),
        FakePwm::default(),
        FakePwm::default(),
        FakePwm::default(),
    ]);
    Dispatcher::new(servos, TotalDelay::default())
}

#[test]
fn test_every_payload_shape_opens_the_claw() {
    for payload in [
        r#"{"action": "open_claw"}"#,
        "{'action': 'open_claw'}",
        "action: open_claw",
        "action=open_claw",
        "open_claw",
        "  OPEN_CLAW\r\n",
    ] {
        let mut arm = arm();
        let result = block_on(arm.dispatch_bytes(payload.as_bytes()));
        assert_eq!(
            result,
            CommandResult::success("open_claw", "Claw opened"),
            "payload {payload:?}"
        );
        assert_eq!(arm.state().get(ServoChannel::Claw), 90);
    }
}

#[test]
fn test_close_claw_response_json() {
    let mut arm = arm();
    let result = block_on(arm.dispatch(r#"{"action": "close_claw"}"#));
    assert_eq!(
        result.to_json(),
        r#"{"status":"success","action":"close_claw","message":"Claw closed"}"#
    );
    assert_eq!(arm.state().get(ServoChannel::Claw), 0);
}

#[test]
fn test_unknown_and_empty_commands() {
    let mut arm = arm();

    let result = block_on(arm.dispatch("spin_wildly"));
    assert_eq!(result.status, Status::Error);
    assert!(result
        .message
        .starts_with("Unknown action: spin_wildly. Available actions: extend_gripper, "));
    assert!(result.message.ends_with("dance"));

    let result = block_on(arm.dispatch(r#"{"action": "   "}"#));
    assert_eq!(
        result.to_json(),
        r#"{"status":"error","message":"No valid action found in message"}"#
    );

    let result = block_on(arm.dispatch("   "));
    assert_eq!(
        result.to_json(),
        r#"{"status":"error","message":"No valid action found in message"}"#
    );
}

#[test]
fn test_gripper_reaches_pulse_for_target() {
    let mut arm = arm();
    block_on(arm.dispatch("move_arms_down"));

    // 30° of a 270° channel is 20° of hardware travel
    let expected_ns = 500_000 + (20.0f32 / 180.0 * 1_900_000.0) as u32;
    for channel in [ServoChannel::ArmC, ServoChannel::ArmD] {
        assert_eq!(arm.state().get(channel), 30);
        let pulse = arm.coordinator().bank().servo(channel).pulse_ns().unwrap();
        assert!(pulse.abs_diff(expected_ns) <= 1_000, "{channel}: {pulse}");
    }
    assert_eq!(
        arm.coordinator().bank().servo(ServoChannel::Turntable).pulse_ns(),
        None
    );
}

#[test]
fn test_dance_returns_home() {
    let mut arm = arm();
    let result = block_on(arm.dispatch("dance"));

    assert_eq!(result, CommandResult::success("dance", "Dance completed"));
    assert_eq!(arm.state().positions(), [0, 0, 0, 0]);
    for channel in ServoChannel::ALL {
        assert_eq!(
            arm.coordinator().bank().servo(channel).pulse_ns(),
            Some(500_000)
        );
    }
    // settle time plus 23 phase pauses alone are over ten seconds
    assert!(arm.coordinator().delay().total_ms > 10_000);
}
