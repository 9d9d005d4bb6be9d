//! Named gestures of the arm.
//!
//! A gesture is data: a list of figures, each a list of phases repeated a
//! number of times. A phase is one synchronized trajectory run followed by a
//! fixed pause. New gestures only need a new table entry.
use embedded_hal_async::delay::DelayNs;
use log::info;

use super::trajectory::{MoveRequest, TrajectoryCoordinator};
use crate::robot::channel::ServoChannel::{self, ArmC, ArmD, Claw, Turntable};
use crate::robot::servo::ServoBank;
use crate::robot::state::ServoState;

const GRIPPER_SPEED: u8 = 3;
const DANCE_SPEED: u8 = 2;

const fn cw(channel: ServoChannel, degrees: u16, speed: u8) -> MoveRequest {
    MoveRequest::clockwise(channel, degrees, speed)
}

const fn ccw(channel: ServoChannel, degrees: u16, speed: u8) -> MoveRequest {
    MoveRequest::counterclockwise(channel, degrees, speed)
}

#[derive(Debug)]
pub struct Phase {
    pub moves: &'static [MoveRequest],
    pub pause_ms: u32,
}

#[derive(Debug)]
pub struct Figure {
    pub name: &'static str,
    pub phases: &'static [Phase],
    pub repeat: u8,
}

#[derive(Debug)]
pub struct Gesture {
    pub name: &'static str,
    /// Reply message once the gesture has completed.
    pub message: &'static str,
    pub figures: &'static [Figure],
}

impl Gesture {
    /// Number of trajectory runs the gesture performs.
    pub fn run_count(&self) -> usize {
        self.figures
            .iter()
            .map(|f| f.phases.len() * f.repeat as usize)
            .sum()
    }
}

/// Single phase gesture without a trailing pause.
macro_rules! simple_gesture {
    ($name:literal, $message:literal, [$($mv:expr),+ $(,)?]) => {
        Gesture {
            name: $name,
            message: $message,
            figures: &[Figure {
                name: $name,
                phases: &[Phase {
                    moves: &[$($mv),+],
                    pause_ms: 0,
                }],
                repeat: 1,
            }],
        }
    };
}

/// Forward phase followed by its exact reverse.
macro_rules! there_and_back {
    ($pause:expr, [$($mv:expr),+ $(,)?]) => {
        &[
            Phase {
                moves: &[$($mv),+],
                pause_ms: $pause,
            },
            Phase {
                moves: &[$($mv.reversed()),+],
                pause_ms: $pause,
            },
        ]
    };
}

const DANCE: Gesture = Gesture {
    name: "dance",
    message: "Dance completed",
    figures: &[
        Figure {
            name: "multi-directional wave",
            phases: there_and_back!(
                500,
                [
                    cw(Turntable, 40, DANCE_SPEED),
                    ccw(Claw, 45, DANCE_SPEED),
                    cw(ArmC, 90, DANCE_SPEED),
                    ccw(ArmD, 90, DANCE_SPEED),
                ]
            ),
            repeat: 1,
        },
        Figure {
            name: "cross pattern",
            phases: there_and_back!(
                500,
                [
                    cw(Turntable, 60, DANCE_SPEED),
                    cw(Claw, 60, DANCE_SPEED),
                    ccw(ArmC, 120, DANCE_SPEED),
                    cw(ArmD, 120, DANCE_SPEED),
                ]
            ),
            repeat: 1,
        },
        Figure {
            name: "claw and arm coordination",
            phases: there_and_back!(
                300,
                [
                    cw(Claw, 90, DANCE_SPEED),
                    cw(ArmC, 60, DANCE_SPEED),
                    ccw(ArmD, 60, DANCE_SPEED),
                ]
            ),
            repeat: 3,
        },
        Figure {
            name: "spiral",
            phases: there_and_back!(
                500,
                [
                    cw(Turntable, 80, DANCE_SPEED),
                    cw(Claw, 180, DANCE_SPEED),
                    cw(ArmC, 270, DANCE_SPEED),
                    ccw(ArmD, 270, DANCE_SPEED),
                ]
            ),
            repeat: 1,
        },
        Figure {
            name: "synchronized multi-directional",
            phases: there_and_back!(
                300,
                [
                    cw(Turntable, 15, DANCE_SPEED),
                    ccw(Claw, 20, DANCE_SPEED),
                    cw(ArmC, 30, DANCE_SPEED),
                    ccw(ArmD, 30, DANCE_SPEED),
                ]
            ),
            repeat: 3,
        },
        Figure {
            name: "alternating wave",
            phases: there_and_back!(
                400,
                [
                    cw(Turntable, 30, DANCE_SPEED),
                    ccw(Claw, 30, DANCE_SPEED),
                    cw(ArmC, 45, DANCE_SPEED),
                    ccw(ArmD, 45, DANCE_SPEED),
                ]
            ),
            repeat: 2,
        },
        Figure {
            name: "return to zero",
            // a full range counterclockwise move clamps at 0 from any angle
            phases: &[Phase {
                moves: &[
                    ccw(Turntable, 270, DANCE_SPEED),
                    ccw(Claw, 180, DANCE_SPEED),
                    ccw(ArmC, 270, DANCE_SPEED),
                    ccw(ArmD, 270, DANCE_SPEED),
                ],
                pause_ms: 500,
            }],
            repeat: 1,
        },
    ],
};

pub static GESTURES: [Gesture; 9] = [
    simple_gesture!(
        "extend_gripper",
        "Gripper extended",
        [cw(ArmC, 45, GRIPPER_SPEED), cw(ArmD, 45, GRIPPER_SPEED)]
    ),
    simple_gesture!(
        "retract_gripper",
        "Gripper retracted",
        [ccw(ArmC, 45, GRIPPER_SPEED), ccw(ArmD, 45, GRIPPER_SPEED)]
    ),
    simple_gesture!("open_claw", "Claw opened", [cw(Claw, 90, GRIPPER_SPEED)]),
    simple_gesture!("close_claw", "Claw closed", [ccw(Claw, 90, GRIPPER_SPEED)]),
    simple_gesture!(
        "turn_table_left",
        "Table turned left",
        [ccw(Turntable, 45, GRIPPER_SPEED)]
    ),
    simple_gesture!(
        "turn_table_right",
        "Table turned right",
        [cw(Turntable, 45, GRIPPER_SPEED)]
    ),
    simple_gesture!(
        "move_arms_up",
        "Arms moved up",
        [ccw(ArmC, 30, GRIPPER_SPEED), ccw(ArmD, 30, GRIPPER_SPEED)]
    ),
    simple_gesture!(
        "move_arms_down",
        "Arms moved down",
        [cw(ArmC, 30, GRIPPER_SPEED), cw(ArmD, 30, GRIPPER_SPEED)]
    ),
    DANCE,
];

/// Completion report of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureResult {
    pub name: &'static str,
    pub message: &'static str,
}

/// Static lookup from action name to gesture.
pub struct GestureLibrary {
    gestures: &'static [Gesture],
}

impl Default for GestureLibrary {
    fn default() -> Self {
        Self::new(&GESTURES)
    }
}

impl GestureLibrary {
    pub const fn new(gestures: &'static [Gesture]) -> Self {
        Self { gestures }
    }

    pub fn get(&self, name: &str) -> Option<&'static Gesture> {
        self.gestures.iter().find(|g| g.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.gestures.iter().map(|g| g.name)
    }

    /// Plays every phase of `gesture` in order.
    pub async fn execute<B, D>(
        &self,
        gesture: &'static Gesture,
        coordinator: &mut TrajectoryCoordinator<B, D>,
        state: &mut ServoState,
    ) -> GestureResult
    where
        B: ServoBank,
        D: DelayNs,
    {
        info!("Executing gesture {}", gesture.name);
        for figure in gesture.figures {
            for round in 0..figure.repeat {
                if gesture.figures.len() > 1 {
                    info!("{}: {} ({}/{})", gesture.name, figure.name, round + 1, figure.repeat);
                }
                for phase in figure.phases {
                    coordinator.run(state, phase.moves).await;
                    coordinator.pause(phase.pause_ms).await;
                }
            }
        }
        info!("Gesture {} completed", gesture.name);
        GestureResult {
            name: gesture.name,
            message: gesture.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::testing::{RecordingBank, RecordingDelay};
    use crate::motion::trajectory::Direction;
    use embassy_futures::block_on;
    use std::vec::Vec;

    fn coordinator() -> TrajectoryCoordinator<RecordingBank, RecordingDelay> {
        TrajectoryCoordinator::new(RecordingBank::default(), RecordingDelay::default())
    }

    #[test]
    fn test_library_names() {
        let library = GestureLibrary::default();
        let names: Vec<_> = library.names().collect();
        assert_eq!(
            names,
            [
                "extend_gripper",
                "retract_gripper",
                "open_claw",
                "close_claw",
                "turn_table_left",
                "turn_table_right",
                "move_arms_up",
                "move_arms_down",
                "dance",
            ]
        );
        assert!(library.get("dance").is_some());
        assert!(library.get("spin_wildly").is_none());
    }

    #[test]
    fn test_dance_shape() {
        let dance = GestureLibrary::default().get("dance").unwrap();
        assert_eq!(dance.figures.len(), 7);
        // 1 + 1 + 3 + 1 + 3 + 2 forward/reverse pairs, then the return to zero
        assert_eq!(dance.run_count(), 23);

        for figure in &dance.figures[..6] {
            let [forward, back] = figure.phases else {
                panic!("{} is not a forward/reverse pair", figure.name);
            };
            for (f, b) in forward.moves.iter().zip(back.moves) {
                assert_eq!(f.channel, b.channel);
                assert_eq!(f.degrees, b.degrees);
                assert_eq!(f.direction.reverse(), b.direction);
            }
        }

        let home = dance.figures.last().unwrap();
        assert_eq!(home.phases[0].moves.len(), 4);
        assert!(home.phases[0]
            .moves
            .iter()
            .all(|m| m.direction == Direction::Counterclockwise && m.degrees == m.channel.range_max()));
    }

    #[test]
    fn test_open_then_close_claw() {
        let library = GestureLibrary::default();
        let mut coord = coordinator();
        let mut state = ServoState::new();

        let result =
            block_on(library.execute(library.get("open_claw").unwrap(), &mut coord, &mut state));
        assert_eq!(result.message, "Claw opened");
        assert_eq!(state.get(ServoChannel::Claw), 90);

        block_on(library.execute(library.get("close_claw").unwrap(), &mut coord, &mut state));
        assert_eq!(state.get(ServoChannel::Claw), 0);
        // single phase gestures have no trailing pause
        assert!(coord.delay().pauses.iter().all(|p| *p == 42));
    }

    #[test]
    fn test_extend_gripper_moves_both_arms() {
        let library = GestureLibrary::default();
        let mut coord = coordinator();
        let mut state = ServoState::new();

        block_on(library.execute(library.get("extend_gripper").unwrap(), &mut coord, &mut state));

        assert_eq!(state.get(ServoChannel::ArmC), 45);
        assert_eq!(state.get(ServoChannel::ArmD), 45);
        assert_eq!(state.get(ServoChannel::Turntable), 0);
    }

    #[test]
    fn test_dance_ends_at_zero() {
        let library = GestureLibrary::default();
        let mut coord = coordinator();
        let mut state = ServoState::new();
        state.set(ServoChannel::ArmC, 200);

        block_on(library.execute(library.get("dance").unwrap(), &mut coord, &mut state));

        assert_eq!(state, ServoState::new());
        let phase_pauses = coord
            .delay()
            .pauses
            .iter()
            .filter(|p| [300, 400, 500].contains(*p))
            .count();
        assert_eq!(phase_pauses, 23);
    }
}
