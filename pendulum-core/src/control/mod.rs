//! Flash mode control
//!
//! The control loop alternates between a fast and a slow blink, reversing
//! the stepper each time. The board-independent part lives here; the
//! firmware adds the delay between switches and the serial output.

pub mod mode;

pub use mode::{FlashMode, ModeSwitch, Switch, FAST_FLASH_MESSAGE, SLOW_FLASH_MESSAGE};
