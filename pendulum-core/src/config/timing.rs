//! Timer channel assignments and periods

/// Number of hardware timer channels in use
pub const TIMER_CHANNEL_COUNT: usize = 4;

/// Timer channel assignment
///
/// The discriminant is the hardware alarm index the channel runs on, and
/// the number used in the diagnostic serial messages ("Timer0", "Timer1").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerChannel {
    /// Slow LED blink
    SlowFlash = 0,
    /// Fast LED blink
    FastFlash = 1,
    /// Step pulse train
    Step = 2,
    /// Auxiliary flag toggle
    Aux = 3,
}

impl TimerChannel {
    /// All channels in index order
    pub const ALL: [TimerChannel; TIMER_CHANNEL_COUNT] = [
        TimerChannel::SlowFlash,
        TimerChannel::FastFlash,
        TimerChannel::Step,
        TimerChannel::Aux,
    ];

    /// Channel index (0-3)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable channel name for logging
    pub const fn name(self) -> &'static str {
        match self {
            TimerChannel::SlowFlash => "slow-flash",
            TimerChannel::FastFlash => "fast-flash",
            TimerChannel::Step => "step",
            TimerChannel::Aux => "aux",
        }
    }
}

/// Periods of the four timer channels, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerPeriods {
    /// Slow LED half-period
    pub slow_flash_us: u32,
    /// Fast LED half-period
    pub fast_flash_us: u32,
    /// Step pin half-period (full step period is twice this)
    pub step_us: u32,
    /// Auxiliary flag period
    pub aux_us: u32,
}

impl TimerPeriods {
    pub const DEFAULT: Self = Self {
        slow_flash_us: 500_000,
        fast_flash_us: 100_000,
        step_us: 300,
        aux_us: 5_000 * 1_000,
    };

    /// Period of a given channel
    pub const fn period_us(&self, channel: TimerChannel) -> u32 {
        match channel {
            TimerChannel::SlowFlash => self.slow_flash_us,
            TimerChannel::FastFlash => self.fast_flash_us,
            TimerChannel::Step => self.step_us,
            TimerChannel::Aux => self.aux_us,
        }
    }
}

impl Default for TimerPeriods {
    fn default() -> Self {
        Self::DEFAULT
    }
}
