//! Chip-independent embassy implementations of the `pendulum-hal` traits
//!
//! Only embassy-time and embassy-sync are used here, so the timer channels
//! build and test on the host against embassy-time's mock driver.

#![no_std]

pub mod timer;

pub use timer::{run_channel, TimerHandle, TimerSlot};
