//! Asynchronous tasks of the arm firmware.
//!
//! This module contains the Embassy async tasks for the runtime, including:
//! - [`net_task`]: Manages WiFi, the TCP listener and command reception.
//! - [`motion_task`]: Owns the dispatcher and plays one command at a time.
//! - [`servo_task`]: Configures the LEDC peripheral into the arm servo bank.
//!
//! Tasks are spawned from `main.rs` and communicate via Embassy channels: the
//! net task forwards each payload and waits for the reply before accepting
//! the next connection, so the dispatcher never sees two commands at once.
pub mod motion_task;
pub mod net_task;
pub mod servo_task;
