//! Synchronized multi-servo motion.
//!
//! A run takes several move requests, plans each one from the position store,
//! then steps every channel together: all writes of one step are issued back
//! to back and a single pause separates steps, so every channel starts at the
//! same time and the longest plan sets the duration. The position store is
//! only written once the last step has been issued.
extern crate alloc;

use alloc::vec::Vec;
use core::fmt::Display;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec as FixedVec;
use log::{debug, info, warn};

use super::mapping::logical_duty;
use crate::config::{
    BASE_STEP_DELAY_MS, MAX_MOVE_DEG, MAX_SPEED, MIN_SPEED, MIN_STEP_DELAY_MS,
    STEP_DELAY_PER_SPEED_MS,
};
use crate::robot::channel::{ServoChannel, CHANNEL_COUNT};
use crate::robot::servo::ServoBank;
use crate::robot::state::ServoState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    Counterclockwise,
}

impl Direction {
    pub const fn reverse(self) -> Self {
        match self {
            Direction::Clockwise => Direction::Counterclockwise,
            Direction::Counterclockwise => Direction::Clockwise,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::Clockwise => f.write_str("clockwise"),
            Direction::Counterclockwise => f.write_str("counterclockwise"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct DirectionError;

impl Display for DirectionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Invalid direction, use 'clockwise' or 'counterclockwise'")
    }
}

impl TryFrom<&str> for Direction {
    type Error = DirectionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("clockwise") {
            Ok(Direction::Clockwise)
        } else if value.eq_ignore_ascii_case("counterclockwise") {
            Ok(Direction::Counterclockwise)
        } else {
            Err(DirectionError)
        }
    }
}

/// One channel's share of a motion. Out of range values are clamped on
/// construction, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub channel: ServoChannel,
    pub degrees: u16,
    pub direction: Direction,
    pub speed: u8,
}

impl MoveRequest {
    pub const fn new(channel: ServoChannel, degrees: u16, direction: Direction, speed: u8) -> Self {
        let degrees = if degrees > MAX_MOVE_DEG {
            MAX_MOVE_DEG
        } else {
            degrees
        };
        let speed = if speed < MIN_SPEED {
            MIN_SPEED
        } else if speed > MAX_SPEED {
            MAX_SPEED
        } else {
            speed
        };
        Self {
            channel,
            degrees,
            direction,
            speed,
        }
    }

    pub const fn clockwise(channel: ServoChannel, degrees: u16, speed: u8) -> Self {
        Self::new(channel, degrees, Direction::Clockwise, speed)
    }

    pub const fn counterclockwise(channel: ServoChannel, degrees: u16, speed: u8) -> Self {
        Self::new(channel, degrees, Direction::Counterclockwise, speed)
    }

    /// Same move in the opposite direction.
    pub const fn reversed(self) -> Self {
        Self::new(self.channel, self.degrees, self.direction.reverse(), self.speed)
    }

    /// The request with degrees and speed brought back into range, for
    /// requests built as struct literals.
    pub const fn clamped(self) -> Self {
        Self::new(self.channel, self.degrees, self.direction, self.speed)
    }
}

/// Stepped path of one channel from its stored angle to its clamped target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryPlan {
    pub channel: ServoChannel,
    pub start: u16,
    pub target: u16,
    pub direction: Direction,
    pub step_size: u16,
    pub step_count: u32,
}

impl TrajectoryPlan {
    pub fn new(request: &MoveRequest, start: u16) -> Self {
        let request = request.clamped();
        let range_max = request.channel.range_max() as i32;
        let start = start.min(range_max as u16);
        let offset = match request.direction {
            Direction::Clockwise => request.degrees as i32,
            Direction::Counterclockwise => -(request.degrees as i32),
        };
        let target = (start as i32 + offset).clamp(0, range_max) as u16;

        let step_size = request.speed as u16;
        let distance = start.abs_diff(target) as u32;
        // round(distance / step_size), halves away from zero
        let step_count = ((2 * distance + step_size as u32) / (2 * step_size as u32)).max(1);

        Self {
            channel: request.channel,
            start,
            target,
            direction: request.direction,
            step_size,
            step_count,
        }
    }

    /// Logical angle at `step`. Intermediate steps advance by `step_size`
    /// without passing the target; the last step lands exactly on it.
    ///
    /// This differs from a plain `start ± step_size * step` when the distance
    /// is not a multiple of `step_size`: 45° at speed 2 ends on 45 rather
    /// than 46, and 9° at speed 4 ends on 9 rather than 8.
    pub fn angle_at(&self, step: u32) -> u16 {
        if step >= self.step_count {
            return self.target;
        }
        let travelled = (self.step_size as u32 * step).min(u16::MAX as u32) as u16;
        match self.direction {
            Direction::Clockwise => self.start.saturating_add(travelled).min(self.target),
            Direction::Counterclockwise => self.start.saturating_sub(travelled).max(self.target),
        }
    }
}

/// Pause between steps, shared by every channel of a run and derived from the
/// average requested speed.
pub fn step_delay_ms(requests: &[MoveRequest]) -> u32 {
    if requests.is_empty() {
        return BASE_STEP_DELAY_MS;
    }
    let total: u32 = requests.iter().map(|r| r.clamped().speed as u32).sum();
    let avg_speed = total as f32 / requests.len() as f32;
    let delay = BASE_STEP_DELAY_MS as f32 - (avg_speed - 1.0) * STEP_DELAY_PER_SPEED_MS as f32;
    (delay as i32).max(MIN_STEP_DELAY_MS as i32) as u32
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotionResult {
    /// Stored angle of every channel touched by the run.
    pub final_angles: FixedVec<(ServoChannel, u16), CHANNEL_COUNT>,
    pub steps: u32,
    pub step_delay_ms: u32,
}

impl MotionResult {
    pub fn angle(&self, channel: ServoChannel) -> Option<u16> {
        self.final_angles
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, angle)| *angle)
    }

    fn record(&mut self, channel: ServoChannel, angle: u16) {
        if let Some(entry) = self.final_angles.iter_mut().find(|(c, _)| *c == channel) {
            entry.1 = angle;
        } else {
            // at most one entry per channel, cannot overflow
            let _ = self.final_angles.push((channel, angle));
        }
    }
}

/// Drives the servo bank through synchronized trajectories.
pub struct TrajectoryCoordinator<B, D> {
    bank: B,
    delay: D,
}

impl<B, D> TrajectoryCoordinator<B, D>
where
    B: ServoBank,
    D: DelayNs,
{
    pub fn new(bank: B, delay: D) -> Self {
        Self { bank, delay }
    }

    /// Runs every request as one synchronized motion and stores the targets
    /// once the motion is complete.
    ///
    /// A failed PWM write is logged and the motion carries on.
    pub async fn run(&mut self, state: &mut ServoState, requests: &[MoveRequest]) -> MotionResult {
        if requests.is_empty() {
            return MotionResult::default();
        }

        let plans: Vec<TrajectoryPlan> = requests
            .iter()
            .map(|request| TrajectoryPlan::new(request, state.get(request.channel)))
            .collect();
        let max_steps = plans.iter().map(|p| p.step_count).max().unwrap_or(1);
        let delay_ms = step_delay_ms(requests);

        info!(
            "Moving {} servos simultaneously for {} steps ({}ms/step)",
            plans.len(),
            max_steps,
            delay_ms
        );
        for plan in &plans {
            debug!(
                "{} {}: from {}° to {}° in {} steps",
                plan.channel, plan.direction, plan.start, plan.target, plan.step_count
            );
        }

        for step in 0..=max_steps {
            for plan in plans.iter().filter(|p| step <= p.step_count) {
                let angle = plan.angle_at(step);
                let pulse = logical_duty(plan.channel.config(), angle);
                if let Err(e) = self.bank.write_duty(plan.channel, pulse) {
                    warn!(
                        "{} failed to set angle {}° at step {}/{}: {:?}",
                        plan.channel, angle, step, plan.step_count, e
                    );
                }
            }
            self.delay.delay_ms(delay_ms).await;
        }

        let mut result = MotionResult {
            steps: max_steps,
            step_delay_ms: delay_ms,
            ..Default::default()
        };
        for plan in &plans {
            state.set(plan.channel, plan.target);
            result.record(plan.channel, plan.target);
        }
        info!("Simultaneous movement completed!");
        result
    }

    /// Single channel motion.
    pub async fn move_servo(&mut self, state: &mut ServoState, request: MoveRequest) -> MotionResult {
        self.run(state, core::slice::from_ref(&request)).await
    }

    /// Fixed pause between phases of a gesture.
    pub async fn pause(&mut self, ms: u32) {
        if ms > 0 {
            self.delay.delay_ms(ms).await;
        }
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}
