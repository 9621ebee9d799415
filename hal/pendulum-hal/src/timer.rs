//! Periodic timer abstractions
//!
//! A timer channel repeatedly invokes one registered callback at a fixed
//! period. Channels run independently of the control flow that arms and
//! disarms them, typically from an interrupt-priority context.

/// Work performed each time a timer channel expires
///
/// Callbacks run in interrupt-like context: they must not block and should
/// do no more than a pin write or a flag update.
pub trait TimerCallback {
    /// Called once per period while the channel is armed
    ///
    /// Returns `true` to keep the channel repeating, `false` to disarm it.
    fn on_expiry(&mut self) -> bool;
}

impl<F: FnMut() -> bool> TimerCallback for F {
    fn on_expiry(&mut self) -> bool {
        self()
    }
}

/// Arm/disarm control over one attached timer channel
///
/// The callback and period are bound when the channel is attached; this
/// handle only starts and stops it.
pub trait PeriodicTimer {
    /// Halt the channel
    ///
    /// Takes effect immediately: once this returns, `is_armed` is false and
    /// no further callback invocation is started.
    fn stop(&mut self);

    /// Re-arm the channel from its configured period
    ///
    /// The next expiry is one full period after the restart, regardless of
    /// how far the previous period had progressed.
    fn restart(&mut self);

    /// Check whether the channel is currently armed
    fn is_armed(&self) -> bool;
}

impl<T: PeriodicTimer + ?Sized> PeriodicTimer for &mut T {
    fn stop(&mut self) {
        T::stop(self)
    }

    fn restart(&mut self) {
        T::restart(self)
    }

    fn is_armed(&self) -> bool {
        T::is_armed(self)
    }
}

/// Command delivered to a running timer channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerCommand {
    /// Disarm the channel
    Stop,
    /// Re-arm the channel from a fresh period
    Restart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_callback() {
        let mut count = 0u32;
        let mut callback = || {
            count += 1;
            count < 3
        };

        assert!(callback.on_expiry());
        assert!(callback.on_expiry());
        assert!(!callback.on_expiry());
    }
}
