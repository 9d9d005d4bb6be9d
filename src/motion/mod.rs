//! Motion algorithms for the arm.
//!
//! - [`mapping`] converts logical angles into servo pulse widths.
//! - [`trajectory`] runs synchronized, stepped motions of several servos.
//! - [`gestures`] holds the named gesture scripts built on top of it.
//!
//! Used by the dispatcher to play a gesture for each received command.
pub mod gestures;
pub mod mapping;
pub mod trajectory;

#[cfg(test)]
pub(crate) mod testing;
