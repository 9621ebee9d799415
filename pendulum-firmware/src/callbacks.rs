//! Timer callbacks bound to board outputs

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use pendulum_core::callbacks::ToggleOutput;
use pendulum_hal::TimerCallback;
use pendulum_hal_rp2040::GpioOutput;

/// Status LED shared by the slow and fast flash channels
pub type SharedLed = Mutex<CriticalSectionRawMutex, RefCell<ToggleOutput<GpioOutput<'static>>>>;

/// LED flash callback
///
/// Both LED channels hold one of these pointing at the same LED, so the
/// level survives a switch between slow and fast blinking.
pub struct SharedToggle {
    led: &'static SharedLed,
}

impl SharedToggle {
    pub fn new(led: &'static SharedLed) -> Self {
        Self { led }
    }
}

impl TimerCallback for SharedToggle {
    fn on_expiry(&mut self) -> bool {
        self.led.lock(|led| led.borrow_mut().toggle());
        true
    }
}
