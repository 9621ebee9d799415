//! Stepper driver implementations

pub mod tmc5160;

pub use tmc5160::{Tmc5160, Tmc5160Config};
