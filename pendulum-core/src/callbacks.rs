//! Timer callbacks
//!
//! The work done on each timer expiry. Every callback owns the state it
//! mutates, so nothing here is a global:
//!
//! - [`ToggleOutput`]: flips a level and drives it onto a pin. Used for the
//!   step pulse train and, behind a shared lock, for the status LED.
//! - [`AuxFlag`]: flips a flag that nothing reads.

use pendulum_hal::{OutputPin, TimerCallback};

/// Output pin driven as a square wave, one edge per timer expiry
pub struct ToggleOutput<P> {
    pin: P,
    level: bool,
}

impl<P: OutputPin> ToggleOutput<P> {
    /// Wrap a pin, driving it low
    pub fn new(mut pin: P) -> Self {
        pin.set_low();
        Self { pin, level: false }
    }

    /// Flip the level and write it to the pin
    ///
    /// Returns the new level.
    pub fn toggle(&mut self) -> bool {
        self.level = !self.level;
        self.pin.set_state(self.level);
        self.level
    }

    /// Level last written to the pin
    pub fn level(&self) -> bool {
        self.level
    }

    /// Borrow the underlying pin
    pub fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P: OutputPin> TimerCallback for ToggleOutput<P> {
    fn on_expiry(&mut self) -> bool {
        self.toggle();
        true
    }
}

/// Auxiliary flag flipped by its own timer channel
///
/// The flag has no reader. It must not be wired to the mode switch without
/// a deliberate change to the control loop.
#[derive(Debug)]
pub struct AuxFlag {
    flag: bool,
}

impl AuxFlag {
    /// New flag, initially set
    pub const fn new() -> Self {
        Self { flag: true }
    }

    /// Current flag value
    pub fn get(&self) -> bool {
        self.flag
    }
}

impl Default for AuxFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerCallback for AuxFlag {
    fn on_expiry(&mut self) -> bool {
        self.flag = !self.flag;
        true
    }
}
