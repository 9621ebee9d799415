//! Flash mode control loop
//!
//! Every interval: reverse the stepper, swap the LED blink rate and report
//! the new mode on the diagnostic serial line. Failures are logged and the
//! loop carries on; nothing is retried.

use core::fmt::Debug;

use defmt::*;
use embassy_time::Timer;
use embedded_io_async::Write;
use pendulum_core::control::ModeSwitch;
use pendulum_core::traits::ShaftControl;
use pendulum_hal::PeriodicTimer;

/// Run the control loop forever
pub async fn control_loop<D, S, F, W>(
    mut mode_switch: ModeSwitch<D, S, F>,
    serial: &mut W,
    interval_ms: u32,
) -> !
where
    D: ShaftControl,
    D::Error: Debug,
    S: PeriodicTimer,
    F: PeriodicTimer,
    W: Write,
{
    info!("Control loop started, switching every {}ms", interval_ms);

    loop {
        Timer::after_millis(interval_ms as u64).await;

        let switch = mode_switch.switch();
        if let Err(e) = &switch.shaft {
            warn!(
                "Failed to set shaft direction {}: {:?}",
                switch.direction,
                Debug2Format(e)
            );
        }

        let line = switch.mode.message();
        info!("{}", line);
        if let Err(e) = write_line(serial, line).await {
            warn!("Serial write failed: {:?}", Debug2Format(&e));
        }

        let (fast, slow) = (mode_switch.fast_armed(), mode_switch.slow_armed());
        let (running, stopped) = if switch.mode.is_fast() { (fast, slow) } else { (slow, fast) };
        debug!(
            "Switch {}: {} armed={}, {} armed={}",
            mode_switch.switch_count(),
            switch.mode.armed_channel().name(),
            running,
            switch.mode.stopped_channel().name(),
            stopped
        );
    }
}

/// Write one CRLF-terminated line
async fn write_line<W: Write>(serial: &mut W, line: &str) -> Result<(), W::Error> {
    serial.write_all(line.as_bytes()).await?;
    serial.write_all(b"\r\n").await?;
    serial.flush().await
}
