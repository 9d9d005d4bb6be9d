//! Library root for the claw arm firmware.
//!
//! Re-exports all main modules: [`robot`], [`motion`], [`dispatch`] and, with
//! the `firmware` feature, the embassy [`tasks`].
//! Everything but the tasks is hardware agnostic and runs on the host in tests.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod dispatch;
pub mod motion;
pub mod robot;
#[cfg(feature = "firmware")]
pub mod tasks;
