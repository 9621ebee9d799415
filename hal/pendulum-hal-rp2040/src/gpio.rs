//! GPIO outputs
//!
//! Wraps `embassy_rp::gpio::Output` so it can implement the shared
//! [`OutputPin`] trait.

use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::Peri;
use pendulum_hal::OutputPin;

/// Push-pull output pin
pub struct GpioOutput<'d> {
    pin: Output<'d>,
}

impl<'d> GpioOutput<'d> {
    /// Configure a pin as output at the given initial level
    pub fn new(pin: Peri<'d, impl Pin>, high: bool) -> Self {
        let level = if high { Level::High } else { Level::Low };
        Self {
            pin: Output::new(pin, level),
        }
    }
}

impl OutputPin for GpioOutput<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
