#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

extern crate alloc;

use alloc::boxed::Box;
use claw_arm::config::COMMAND_CHANNEL_SIZE;
use claw_arm::dispatch::Dispatcher;
use claw_arm::robot::commands::CommandResult;
use claw_arm::tasks::motion_task::{motion_task, ArmRequest};
use claw_arm::tasks::net_task::{configurate_and_start_wifi, net_task, runner_task};
use claw_arm::tasks::servo_task::setup_servos;
use core::future::pending;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, StackResources};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_time::Delay;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{AnyPin, Pin};
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};

esp_bootloader_esp_idf::esp_app_desc!();

//SERVOS: [turntable, claw, arm C, arm D]
//GPIO:   [4, 5, 6, 7]

static COMMANDS: Channel<CriticalSectionRawMutex, ArmRequest, COMMAND_CHANNEL_SIZE> =
    Channel::new();
static REPLIES: Channel<CriticalSectionRawMutex, CommandResult, COMMAND_CHANNEL_SIZE> =
    Channel::new();

macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.init_with(|| $val)
    }};
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger_from_env();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let p = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: 72 * 1024);

    let timer0 = TimerGroup::new(p.TIMG1);
    esp_hal_embassy::init(timer0.timer0);

    // take important peripherals
    let mut rng = esp_hal::rng::Rng::new(p.RNG);
    let timer1 = TimerGroup::new(p.TIMG0);
    let wifi_init = esp_wifi::init(timer1.timer0, rng, p.RADIO_CLK)
        .expect("Failed to initialize WIFI controller");
    let wifi_init = Box::leak(Box::new(wifi_init));
    let (mut wifi_controller, interfaces) =
        esp_wifi::wifi::new(wifi_init, p.WIFI).expect("Failed to initialize WIFI controller");

    let servo_pins: [AnyPin<'static>; 4] = [
        p.GPIO4.degrade(),
        p.GPIO5.degrade(),
        p.GPIO6.degrade(),
        p.GPIO7.degrade(),
    ];
    let servos = match setup_servos(p.LEDC, servo_pins) {
        Ok(servos) => servos,
        Err(e) => {
            error!("Servo setup failed: {:?}", e);
            return pending().await;
        }
    };

    info!("ESP32-C3 robot arm command server starting...");
    if let Err(e) = configurate_and_start_wifi(&mut wifi_controller).await {
        error!("WiFi connection failed: {:?}. Power cycle the board to retry", e);
        return pending().await;
    }

    //Get the embassy net stack up and working.
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let config = NetConfig::dhcpv4(Default::default());
    let device = interfaces.sta;
    let (stack, runner) = embassy_net::new(
        device,
        config,
        mk_static!(StackResources<3>, StackResources::new()),
        seed,
    );

    let dispatcher = Dispatcher::new(servos, Delay);

    spawner
        .spawn(runner_task(runner))
        .expect("Fail spawning runner task");
    spawner
        .spawn(motion_task(
            dispatcher,
            COMMANDS.receiver(),
            REPLIES.sender(),
        ))
        .expect("Fail spawning motion task");
    spawner
        .spawn(net_task(stack, COMMANDS.sender(), REPLIES.receiver()))
        .expect("Fail spawning net task");

    loop {
        pending::<()>().await;
    }
}
