//! Board-agnostic core logic for the Pendulum firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Board configuration types and validation
//! - Stepper driver traits (shaft direction)
//! - Timer callbacks (LED blink, step pulse, auxiliary flag)
//! - The flash mode switch run by the control loop

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod callbacks;
pub mod config;
pub mod control;
pub mod traits;

#[cfg(test)]
mod sim;
