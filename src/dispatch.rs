//! Command dispatcher.
//!
//! Turns one received command into a gesture run and a [`CommandResult`].
//! Owns the position store, so commands are serialized through `&mut self`.
extern crate alloc;

use alloc::string::String;
use embedded_hal_async::delay::DelayNs;
use log::{info, warn};

use crate::config::INIT_SETTLE_MS;
use crate::motion::gestures::GestureLibrary;
use crate::motion::trajectory::TrajectoryCoordinator;
use crate::robot::commands::{parse_action, CommandError, CommandResult};
use crate::robot::servo::ServoBank;
use crate::robot::state::ServoState;

pub struct Dispatcher<B, D> {
    coordinator: TrajectoryCoordinator<B, D>,
    state: ServoState,
    library: GestureLibrary,
}

impl<B, D> Dispatcher<B, D>
where
    B: ServoBank,
    D: DelayNs,
{
    pub fn new(bank: B, delay: D) -> Self {
        Self::with_library(bank, delay, GestureLibrary::default())
    }

    pub fn with_library(bank: B, delay: D, library: GestureLibrary) -> Self {
        Self {
            coordinator: TrajectoryCoordinator::new(bank, delay),
            state: ServoState::new(),
            library,
        }
    }

    /// Decodes a raw socket payload and dispatches it.
    pub async fn dispatch_bytes(&mut self, payload: &[u8]) -> CommandResult {
        match core::str::from_utf8(payload) {
            Ok(text) => {
                let cleaned = text.replace(['\r', '\n'], "");
                self.dispatch(&cleaned).await
            }
            Err(_) => {
                warn!("Received {} bytes of invalid UTF-8", payload.len());
                CommandError::InvalidEncoding.into()
            }
        }
    }

    /// Runs the gesture named in `raw` and reports the outcome.
    ///
    /// The position store is zeroed before a recognized gesture starts: the
    /// pose the arm is in right now is the reference for this command.
    pub async fn dispatch(&mut self, raw: &str) -> CommandResult {
        let action = match parse_action(raw) {
            Ok(action) => action,
            Err(e) => {
                warn!("{e}: {raw:?}");
                return e.into();
            }
        };

        let Some(gesture) = self.library.get(&action) else {
            let err = CommandError::UnknownAction {
                action,
                available: self.available_actions(),
            };
            warn!("{err}");
            return err.into();
        };

        info!("Processing action: {action}");
        self.state.reset_all();
        info!("Servos initialized, current pose is the new zero");
        self.coordinator.pause(INIT_SETTLE_MS).await;

        let result = self
            .library
            .execute(gesture, &mut self.coordinator, &mut self.state)
            .await;
        self.log_positions();
        CommandResult::success(result.name, result.message)
    }

    /// Comma separated list of every known action.
    pub fn available_actions(&self) -> String {
        let mut list = String::new();
        for (i, name) in self.library.names().enumerate() {
            if i > 0 {
                list.push_str(", ");
            }
            list.push_str(name);
        }
        list
    }

    pub fn state(&self) -> &ServoState {
        &self.state
    }

    pub fn coordinator(&self) -> &TrajectoryCoordinator<B, D> {
        &self.coordinator
    }

    fn log_positions(&self) {
        let [turntable, claw, arm_c, arm_d] = self.state.positions();
        info!(
            "Current positions: turntable {turntable}°, claw {claw}°, arm C {arm_c}°, arm D {arm_d}°"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::testing::{RecordingBank, RecordingDelay};
    use crate::robot::channel::ServoChannel;
    use crate::robot::commands::Status;
    use embassy_futures::block_on;

    fn dispatcher() -> Dispatcher<RecordingBank, RecordingDelay> {
        Dispatcher::new(RecordingBank::default(), RecordingDelay::default())
    }

    #[test]
    fn test_dispatch_close_claw() {
        let mut dispatcher = dispatcher();
        let result = block_on(dispatcher.dispatch(r#"{"action": "close_claw"}"#));
        assert_eq!(result, CommandResult::success("close_claw", "Claw closed"));
        assert_eq!(dispatcher.state().get(ServoChannel::Claw), 0);
    }

    #[test]
    fn test_dispatch_unknown_action() {
        let mut dispatcher = dispatcher();
        let result = block_on(dispatcher.dispatch("spin_wildly"));
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.action, None);
        assert_eq!(
            result.message,
            "Unknown action: spin_wildly. Available actions: extend_gripper, retract_gripper, \
             open_claw, close_claw, turn_table_left, turn_table_right, move_arms_up, \
             move_arms_down, dance"
        );
        assert!(dispatcher.coordinator().bank().writes.is_empty());
    }

    #[test]
    fn test_dispatch_blank() {
        let mut dispatcher = dispatcher();
        let result = block_on(dispatcher.dispatch("   "));
        assert_eq!(result, CommandResult::error("No valid action found in message"));
        assert!(dispatcher.coordinator().delay().pauses.is_empty());
    }

    #[test]
    fn test_each_command_starts_from_zero() {
        let mut dispatcher = dispatcher();
        block_on(dispatcher.dispatch("turn_table_right"));
        assert_eq!(dispatcher.state().get(ServoChannel::Turntable), 45);

        // reset before the second command, so the table does not accumulate
        block_on(dispatcher.dispatch("action: turn_table_right"));
        assert_eq!(dispatcher.state().get(ServoChannel::Turntable), 45);
    }

    #[test]
    fn test_unrecognized_command_keeps_positions() {
        let mut dispatcher = dispatcher();
        block_on(dispatcher.dispatch("extend_gripper"));
        block_on(dispatcher.dispatch("spin_wildly"));
        assert_eq!(dispatcher.state().get(ServoChannel::ArmC), 45);
    }

    #[test]
    fn test_settle_pause_before_gesture() {
        let mut dispatcher = dispatcher();
        block_on(dispatcher.dispatch("open_claw"));
        assert_eq!(
            dispatcher.coordinator().delay().pauses.first(),
            Some(&INIT_SETTLE_MS)
        );
    }

    #[test]
    fn test_dispatch_bytes() {
        let mut dispatcher = dispatcher();
        let result = block_on(dispatcher.dispatch_bytes(b"action=open_claw\r\n"));
        assert_eq!(result, CommandResult::success("open_claw", "Claw opened"));

        let result = block_on(dispatcher.dispatch_bytes(&[0xff, 0xfe, b'x']));
        assert_eq!(result, CommandResult::error("Invalid UTF-8 data received"));
    }
}
