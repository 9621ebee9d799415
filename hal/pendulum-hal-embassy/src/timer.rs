//! Timer channels on embassy-time
//!
//! Each channel is a [`TimerSlot`] in static memory plus one task that runs
//! [`run_channel`]. The control side holds a [`TimerHandle`] and arms or
//! disarms the channel through the slot:
//!
//! - the armed flag is updated synchronously, so a stopped channel never
//!   starts another callback even if its task has not run yet
//! - a `Signal` wakes the task so it can drop or reset its ticker
//!
//! Run the channel tasks on an `InterruptExecutor` so callbacks preempt the
//! thread-mode control loop.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use pendulum_hal::timer::{PeriodicTimer, TimerCallback, TimerCommand};
use portable_atomic::{AtomicBool, Ordering};

/// Static control block for one timer channel
pub struct TimerSlot {
    period_us: u32,
    armed: AtomicBool,
    commands: Signal<CriticalSectionRawMutex, TimerCommand>,
}

impl TimerSlot {
    /// New disarmed slot
    pub const fn new(period_us: u32) -> Self {
        Self {
            period_us,
            armed: AtomicBool::new(false),
            commands: Signal::new(),
        }
    }

    /// Arm the channel and get its control handle
    ///
    /// The first expiry comes one period after the channel task starts.
    pub fn attach(&'static self) -> TimerHandle {
        self.armed.store(true, Ordering::Release);
        TimerHandle { slot: self }
    }

    /// Check whether the channel is armed
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Configured period in microseconds
    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }
}

/// Control handle for an attached channel
#[derive(Clone, Copy)]
pub struct TimerHandle {
    slot: &'static TimerSlot,
}

impl PeriodicTimer for TimerHandle {
    fn stop(&mut self) {
        self.slot.disarm();
        self.slot.commands.signal(TimerCommand::Stop);
    }

    fn restart(&mut self) {
        self.slot.armed.store(true, Ordering::Release);
        self.slot.commands.signal(TimerCommand::Restart);
    }

    fn is_armed(&self) -> bool {
        self.slot.is_armed()
    }
}

/// Drive one channel forever
///
/// Invokes `callback` once per period while the slot is armed. A callback
/// returning `false` disarms the channel until the next restart.
pub async fn run_channel<C>(slot: &'static TimerSlot, callback: &mut C) -> !
where
    C: TimerCallback + ?Sized,
{
    let mut ticker = Ticker::every(Duration::from_micros(slot.period_us as u64));

    loop {
        if !slot.is_armed() {
            // Idle until re-armed, then count a full period from now
            while slot.commands.wait().await != TimerCommand::Restart {}
            ticker.reset();
            continue;
        }

        match select(ticker.next(), slot.commands.wait()).await {
            Either::First(()) => {
                if slot.is_armed() && !callback.on_expiry() {
                    slot.disarm();
                }
            }
            Either::Second(TimerCommand::Restart) => ticker.reset(),
            Either::Second(TimerCommand::Stop) => {}
        }
    }
}
