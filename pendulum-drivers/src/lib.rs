//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pendulum-core:
//!
//! - Stepper drivers (TMC5160 over SPI)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod stepper;
