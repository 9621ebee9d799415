//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic and the
//! stepper driver implementation.

pub mod stepper;

pub use stepper::{Direction, ShaftControl};
