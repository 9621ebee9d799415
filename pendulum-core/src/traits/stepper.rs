//! Stepper driver direction trait
//!
//! The step pulses come from a timer channel; the only thing the control
//! loop asks of the driver chip is which way those pulses turn the shaft.

/// Logical rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Shaft bit set
    Forward,
    /// Shaft bit clear
    Reverse,
}

impl Direction {
    /// Direction for a raw shaft bit
    pub const fn from_shaft(shaft: bool) -> Self {
        if shaft {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Raw shaft bit for this direction
    pub const fn shaft(self) -> bool {
        matches!(self, Direction::Forward)
    }
}

/// Driver that can invert the step direction in software
///
/// Implementations write the command straight to the chip. Nothing is read
/// back, so `Ok` only means the bus transfer completed.
pub trait ShaftControl {
    /// Bus error type
    type Error;

    /// Set the rotation direction applied to subsequent step pulses
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;
}

impl<T: ShaftControl + ?Sized> ShaftControl for &mut T {
    type Error = T::Error;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        T::set_direction(self, direction)
    }
}
