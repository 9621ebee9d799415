//! RP2040-specific HAL for the pendulum firmware
//!
//! This crate provides RP2040 implementations of the `pendulum-hal` traits:
//! - GPIO outputs for the LED, step, direction and enable lines
//! - SPI and UART configuration conversion
//!
//! Timer channels are chip-independent and live in `pendulum-hal-embassy`.

#![no_std]

pub mod gpio;
pub mod spi;
pub mod uart;

pub use gpio::GpioOutput;
