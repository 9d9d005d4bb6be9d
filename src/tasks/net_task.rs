//! Networking and TCP command server task.
//!
//! Manages the WiFi connection, accepts one client at a time, forwards its
//! single payload to the motion task and writes the JSON reply back before
//! closing the connection.
//!
//! Socket errors are logged and the listener moves on to the next client.
extern crate alloc;

use alloc::string::String;
use embassy_net::{tcp::TcpSocket, IpListenEndpoint, Runner, Stack};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Receiver, Sender},
};
use embassy_time::{with_timeout, Duration, Timer};
use embedded_io_async::Write;
use esp_wifi::wifi::{ClientConfiguration, Configuration, WifiController, WifiDevice};
use log::{error, info, warn};

use super::motion_task::ArmRequest;
use crate::config::{
    COMMAND_CHANNEL_SIZE, PORT, RX_BUF_SIZE, TX_BUF_SIZE, WIFI_POLL_INTERVAL_MS,
    WIFI_RETRY_POLLS,
};
use crate::robot::commands::CommandResult;

#[derive(Debug)]
pub enum WifiError {
    Controller(esp_wifi::wifi::WifiError),
    Timeout,
}

impl From<esp_wifi::wifi::WifiError> for WifiError {
    fn from(e: esp_wifi::wifi::WifiError) -> Self {
        WifiError::Controller(e)
    }
}

#[embassy_executor::task]
pub async fn runner_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

#[embassy_executor::task]
pub async fn net_task(
    stack: Stack<'static>,
    requests: Sender<'static, CriticalSectionRawMutex, ArmRequest, COMMAND_CHANNEL_SIZE>,
    replies: Receiver<'static, CriticalSectionRawMutex, CommandResult, COMMAND_CHANNEL_SIZE>,
) {
    let mut rx_buf = [0u8; RX_BUF_SIZE];
    let mut tx_buf = [0u8; TX_BUF_SIZE];

    while !stack.is_link_up() {
        Timer::after_millis(WIFI_POLL_INTERVAL_MS).await;
    }
    stack.wait_config_up().await;

    if let Some(config) = stack.config_v4() {
        info!(
            "[NET_TASK] Robot command server listening at {}:{}",
            config.address, PORT
        );
    }

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);

        match socket
            .accept(IpListenEndpoint {
                port: PORT,
                addr: None,
            })
            .await
        {
            Ok(_) => {
                info!("[NET_TASK] Connection from {:?}", socket.remote_endpoint());
                handle_connection(&mut socket, &requests, &replies).await;
            }
            Err(e) => {
                error!("[NET_TASK] Accept failed: {:?}", e);
                Timer::after_millis(WIFI_POLL_INTERVAL_MS).await; // Backoff delay
                continue;
            }
        }

        socket.close();
        if let Err(e) = socket.flush().await {
            warn!("[NET_TASK] Closing the connection failed: {:?}", e);
        }
        socket.abort();
    }
}

/// Reads one payload, waits for the motion task to play it and sends back
/// the JSON result.
pub async fn handle_connection(
    socket: &mut TcpSocket<'_>,
    requests: &Sender<'static, CriticalSectionRawMutex, ArmRequest, COMMAND_CHANNEL_SIZE>,
    replies: &Receiver<'static, CriticalSectionRawMutex, CommandResult, COMMAND_CHANNEL_SIZE>,
) {
    let mut rx_buf = [0u8; RX_BUF_SIZE];
    let n = match socket.read(&mut rx_buf).await {
        Ok(0) => {
            warn!("[NET_TASK] Client closed without sending a command");
            return;
        }
        Ok(n) => n,
        Err(e) => {
            error!("[NET_TASK] Read error: {:?}", e);
            return;
        }
    };

    requests.send(ArmRequest::new(&rx_buf[..n])).await;
    let response: String = replies.receive().await.to_json();

    match socket.write_all(response.as_bytes()).await {
        Ok(()) => info!("[NET_TASK] Response sent: {}", response),
        Err(e) => error!("[NET_TASK] Error sending response: {:?}", e),
    }
}

/// Connects to the access point given at build time.
///
/// On a failed first attempt the radio is restarted and the connection
/// retried once, bounded by a timeout.
pub async fn configurate_and_start_wifi(
    wifi_controller: &mut WifiController<'_>,
) -> Result<(), WifiError> {
    let ssid = env!("WIFI_SSID");
    let password = env!("WIFI_PASS");
    let config = Configuration::Client(ClientConfiguration {
        ssid: String::from(ssid),
        password: String::from(password),
        ..Default::default()
    });

    info!("Connecting to wifi: {ssid}");
    wifi_controller.set_configuration(&config)?;
    wifi_controller.set_power_saving(esp_wifi::config::PowerSaveMode::None)?;
    wifi_controller.start_async().await?;

    if let Err(e) = wifi_controller.connect_async().await {
        warn!("Wifi connection failed ({e:?}), restarting the radio and retrying");
        wifi_controller.stop_async().await?;
        Timer::after_millis(2000).await;
        wifi_controller.start_async().await?;
        Timer::after_millis(3000).await;

        let retry_window = Duration::from_millis(WIFI_RETRY_POLLS as u64 * WIFI_POLL_INTERVAL_MS);
        with_timeout(retry_window, wifi_controller.connect_async())
            .await
            .map_err(|_| WifiError::Timeout)??;
    }

    if let Ok(rssi) = wifi_controller.rssi() {
        info!("Wifi connected! signal: {}", rssi)
    }
    Ok(())
}
