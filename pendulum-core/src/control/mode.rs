//! Flash mode switch
//!
//! Each switch applies the current mode and then flips it:
//!
//! | mode | shaft   | stopped timer | restarted timer |
//! |------|---------|---------------|-----------------|
//! | Fast | forward | slow flash    | fast flash      |
//! | Slow | reverse | fast flash    | slow flash      |
//!
//! The running LED timer is always stopped before the other one is
//! restarted, so the two LED channels are never armed together.

use pendulum_hal::PeriodicTimer;

use crate::config::TimerChannel;
use crate::traits::{Direction, ShaftControl};

/// Diagnostic line emitted when switching to the fast blink
pub const FAST_FLASH_MESSAGE: &str = "Fast flash. Timer0 disabled Timer1 enabled";

/// Diagnostic line emitted when switching to the slow blink
pub const SLOW_FLASH_MESSAGE: &str = "Slow flash. Timer1 disabled Timer0 enabled";

/// LED blink mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashMode {
    /// Fast blink, motor forward
    Fast,
    /// Slow blink, motor reversed
    Slow,
}

impl FlashMode {
    /// Mode applied by the first switch
    pub const INITIAL: FlashMode = FlashMode::Fast;

    /// Check if this is the fast blink
    pub const fn is_fast(self) -> bool {
        matches!(self, FlashMode::Fast)
    }

    /// The other mode
    pub const fn toggled(self) -> Self {
        match self {
            FlashMode::Fast => FlashMode::Slow,
            FlashMode::Slow => FlashMode::Fast,
        }
    }

    /// Shaft direction commanded with this mode
    pub const fn direction(self) -> Direction {
        Direction::from_shaft(self.is_fast())
    }

    /// LED timer armed in this mode
    pub const fn armed_channel(self) -> TimerChannel {
        match self {
            FlashMode::Fast => TimerChannel::FastFlash,
            FlashMode::Slow => TimerChannel::SlowFlash,
        }
    }

    /// LED timer stopped in this mode
    pub const fn stopped_channel(self) -> TimerChannel {
        self.toggled().armed_channel()
    }

    /// Diagnostic line for a switch into this mode
    pub const fn message(self) -> &'static str {
        match self {
            FlashMode::Fast => FAST_FLASH_MESSAGE,
            FlashMode::Slow => SLOW_FLASH_MESSAGE,
        }
    }
}

/// Outcome of one mode switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switch<E> {
    /// Mode that was applied
    pub mode: FlashMode,
    /// Direction sent to the driver
    pub direction: Direction,
    /// Result of the direction command
    ///
    /// A failed command does not stop the timers from being swapped.
    pub shaft: Result<(), E>,
}

/// Mode switch driven by the control loop
///
/// Owns the driver's direction control and the two LED timer channels.
pub struct ModeSwitch<D, S, F> {
    driver: D,
    slow: S,
    fast: F,
    mode: FlashMode,
    switches: u32,
}

impl<D, S, F> ModeSwitch<D, S, F>
where
    D: ShaftControl,
    S: PeriodicTimer,
    F: PeriodicTimer,
{
    /// Create a mode switch
    ///
    /// `slow` and `fast` are the already attached LED channels.
    pub fn new(driver: D, slow: S, fast: F) -> Self {
        Self {
            driver,
            slow,
            fast,
            mode: FlashMode::INITIAL,
            switches: 0,
        }
    }

    /// Mode the next switch will apply
    pub fn mode(&self) -> FlashMode {
        self.mode
    }

    /// Number of switches performed so far
    pub fn switch_count(&self) -> u32 {
        self.switches
    }

    /// Apply the current mode, then flip it
    pub fn switch(&mut self) -> Switch<D::Error> {
        let mode = self.mode;
        let direction = mode.direction();
        let shaft = self.driver.set_direction(direction);

        match mode {
            FlashMode::Fast => {
                self.slow.stop();
                self.fast.restart();
            }
            FlashMode::Slow => {
                self.fast.stop();
                self.slow.restart();
            }
        }

        self.mode = mode.toggled();
        self.switches = self.switches.wrapping_add(1);

        Switch {
            mode,
            direction,
            shaft,
        }
    }

    /// Borrow the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Check whether the slow LED channel is armed
    pub fn slow_armed(&self) -> bool {
        self.slow.is_armed()
    }

    /// Check whether the fast LED channel is armed
    pub fn fast_armed(&self) -> bool {
        self.fast.is_armed()
    }
}
