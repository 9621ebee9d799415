//! Pendulum - Stepper and Status LED Firmware
//!
//! Main firmware binary for an RP2040 board driving a TMC5160 over SPI.
//!
//! Four timer channels run on a high-priority interrupt executor:
//! - Timer0: slow LED blink
//! - Timer1: fast LED blink
//! - Timer2: step pulse train
//! - Timer3: auxiliary flag
//!
//! The control loop runs in `main`. Every five seconds it reverses the
//! motor through the driver's shaft bit and swaps the LED blink rate.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::Spi;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartTx};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pendulum_core::callbacks::{AuxFlag, ToggleOutput};
use pendulum_core::config::TimerChannel;
use pendulum_core::control::ModeSwitch;
use pendulum_drivers::stepper::{Tmc5160, Tmc5160Config};
use pendulum_hal::spi::{Mode, SpiConfig};
use pendulum_hal::uart::UartConfig;
use pendulum_hal::PeriodicTimer;
use pendulum_hal_embassy::TimerSlot;
use pendulum_hal_rp2040::GpioOutput;

use crate::board::BOARD;
use crate::callbacks::{SharedLed, SharedToggle};

mod board;
mod callbacks;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Executor for the timer channel tasks
static TIMER_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    TIMER_EXECUTOR.on_interrupt()
}

// Timer channel control blocks
static SLOW_FLASH: TimerSlot = TimerSlot::new(BOARD.timers.slow_flash_us);
static FAST_FLASH: TimerSlot = TimerSlot::new(BOARD.timers.fast_flash_us);
static STEP: TimerSlot = TimerSlot::new(BOARD.timers.step_us);
static AUX: TimerSlot = TimerSlot::new(BOARD.timers.aux_us);

// Callback state (must live forever for the timer tasks)
static LED: StaticCell<SharedLed> = StaticCell::new();
static SLOW_FLASH_CB: StaticCell<SharedToggle> = StaticCell::new();
static FAST_FLASH_CB: StaticCell<SharedToggle> = StaticCell::new();
static STEP_CB: StaticCell<ToggleOutput<GpioOutput<'static>>> = StaticCell::new();
static AUX_CB: StaticCell<AuxFlag> = StaticCell::new();

// Serial transmit buffer
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Pendulum firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Driver enabled in hardware for the whole run; direction comes from
    // the shaft bit, so DIR stays low
    let _enable = GpioOutput::new(p.PIN_6, false);
    let _dir = GpioOutput::new(p.PIN_9, false);

    // Setup SPI0 for the TMC5160
    let spi_config = SpiConfig::new(BOARD.driver.spi_frequency_hz, Mode::Mode3);
    let spi = Spi::new_blocking(
        p.SPI0,
        p.PIN_2,
        p.PIN_3,
        p.PIN_4,
        pendulum_hal_rp2040::spi::to_rp_config(&spi_config),
    );
    let cs = Output::new(p.PIN_5, Level::High);
    let spi = match ExclusiveDevice::new(spi, cs, Delay) {
        Ok(device) => device,
        Err(e) => match e {},
    };

    let mut driver = Tmc5160::new(spi, Tmc5160Config::from(&BOARD.driver));
    match driver.initialize() {
        Ok(()) => {
            info!("TMC5160 initialized");
            debug!("  Run current: {}mA", BOARD.driver.rms_current_ma);
            debug!("  Microsteps: {}", BOARD.driver.microsteps);
            debug!("  TOFF: {}", BOARD.driver.toff);
        }
        Err(e) => warn!("TMC5160 init failed: {:?}", Debug2Format(&e)),
    }
    if let Some(status) = driver.last_status() {
        debug!("TMC5160 SPI_STATUS: {=u8:#x}", status.raw());
        if status.driver_error() {
            warn!("TMC5160 reports a driver error");
        }
    }

    // Setup UART0 TX for the diagnostic serial line
    let uart_config =
        pendulum_hal_rp2040::uart::to_rp_config(&UartConfig::with_baudrate(BOARD.serial_baud));
    let tx_buf = TX_BUF.init([0u8; 64]);
    let mut serial = BufferedUartTx::new(p.UART0, Irqs, p.PIN_0, tx_buf, uart_config);
    info!("Serial initialized at {} baud", BOARD.serial_baud);

    // Callback state
    let led_pin = ToggleOutput::new(GpioOutput::new(p.PIN_25, false));
    let led: &'static SharedLed = LED.init(Mutex::new(RefCell::new(led_pin)));
    let slow_cb = SLOW_FLASH_CB.init(SharedToggle::new(led));
    let fast_cb = FAST_FLASH_CB.init(SharedToggle::new(led));
    let step_cb = STEP_CB.init(ToggleOutput::new(GpioOutput::new(p.PIN_8, false)));
    let aux_cb = AUX_CB.init(AuxFlag::new());

    // Startup: slow blink running, fast blink attached then stopped
    let slow = SLOW_FLASH.attach();
    let mut fast = FAST_FLASH.attach();
    fast.stop();
    STEP.attach();
    AUX.attach();

    // Timer tasks preempt the control loop
    interrupt::SWI_IRQ_1.set_priority(Priority::P1);
    let timer_spawner = TIMER_EXECUTOR.start(interrupt::SWI_IRQ_1);
    timer_spawner
        .spawn(tasks::timer_task(TimerChannel::SlowFlash, &SLOW_FLASH, slow_cb))
        .unwrap();
    timer_spawner
        .spawn(tasks::timer_task(TimerChannel::FastFlash, &FAST_FLASH, fast_cb))
        .unwrap();
    timer_spawner
        .spawn(tasks::timer_task(TimerChannel::Step, &STEP, step_cb))
        .unwrap();
    timer_spawner
        .spawn(tasks::timer_task(TimerChannel::Aux, &AUX, aux_cb))
        .unwrap();

    info!("Timer channels running");

    let mode_switch = ModeSwitch::new(driver, slow, fast);
    tasks::control_loop(mode_switch, &mut serial, BOARD.mode_switch_interval_ms).await
}
