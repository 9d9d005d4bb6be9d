//! Motion task.
//!
//! Receives raw command payloads from the net task, dispatches them to the
//! gesture library and sends the structured result back.
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Receiver, Sender},
};
use embassy_time::Delay;
use heapless::Vec;
use log::info;

use super::servo_task::ArmPwm;
use crate::config::{COMMAND_CHANNEL_SIZE, RX_BUF_SIZE};
use crate::dispatch::Dispatcher;
use crate::robot::commands::CommandResult;
use crate::robot::servo::ArmServos;

pub type ArmDispatcher = Dispatcher<ArmServos<ArmPwm>, Delay>;

/// One received payload, exactly as read from the socket.
pub struct ArmRequest {
    pub payload: Vec<u8, RX_BUF_SIZE>,
}

impl ArmRequest {
    pub fn new(bytes: &[u8]) -> Self {
        let mut payload = Vec::new();
        let len = bytes.len().min(RX_BUF_SIZE);
        // cannot fail, the length is bounded by the capacity
        let _ = payload.extend_from_slice(&bytes[..len]);
        Self { payload }
    }
}

#[embassy_executor::task]
pub async fn motion_task(
    mut dispatcher: ArmDispatcher,
    requests: Receiver<'static, CriticalSectionRawMutex, ArmRequest, COMMAND_CHANNEL_SIZE>,
    replies: Sender<'static, CriticalSectionRawMutex, CommandResult, COMMAND_CHANNEL_SIZE>,
) {
    info!("[MOTION_TASK] ready");
    loop {
        let request = requests.receive().await;
        info!("[MOTION_TASK] received {} bytes", request.payload.len());
        let result = dispatcher.dispatch_bytes(&request.payload).await;
        info!("[MOTION_TASK] {:?}: {}", result.status, result.message);
        replies.send(result).await;
    }
}
