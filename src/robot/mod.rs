//! Core arm types.
//!
//! This module defines the main types for the arm, including:
//! - [`channel`]: Servo channel enumeration, calibration and indexing helpers.
//! - [`servo`]: PWM servo wrapper and the [`servo::ServoBank`] hardware seam.
//! - [`state`]: Logical position of every channel.
//! - [`commands`]: Command text parsing and the structured reply.
pub mod channel;
pub mod commands;
pub mod servo;
pub mod state;
