//! Simulated timer channels
//!
//! A virtual microsecond clock and timer channels that fire callbacks in
//! deterministic order, used to check the control loop and callbacks
//! together without hardware. Ties between channels due at the same instant
//! resolve in channel index order, and always before a control loop switch
//! scheduled for that instant.

use core::cell::{Cell, RefCell};
use std::vec::Vec;

use pendulum_hal::{OutputPin, PeriodicTimer, TimerCallback};

use crate::callbacks::ToggleOutput;
use crate::traits::{Direction, ShaftControl};

/// Virtual clock in microseconds
pub struct SimClock {
    now_us: Cell<u64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self { now_us: Cell::new(0) }
    }

    pub fn now(&self) -> u64 {
        self.now_us.get()
    }

    fn set(&self, now_us: u64) {
        assert!(now_us >= self.now(), "simulated time went backwards");
        self.now_us.set(now_us);
    }
}

/// Timer channel on the virtual clock
///
/// State lives in cells so the control loop and the runner can both hold
/// the channel, the same way the firmware shares a static control block.
pub struct SimChannel<'c> {
    clock: &'c SimClock,
    period_us: u32,
    armed: Cell<bool>,
    next_due_us: Cell<u64>,
}

impl<'c> SimChannel<'c> {
    /// Attach and arm a channel; the first expiry is one period from now
    pub fn attach(clock: &'c SimClock, period_us: u32) -> Self {
        Self {
            clock,
            period_us,
            armed: Cell::new(true),
            next_due_us: Cell::new(clock.now() + period_us as u64),
        }
    }

    pub fn armed(&self) -> bool {
        self.armed.get()
    }

    pub fn disarm(&self) {
        self.armed.set(false);
    }

    fn next_due(&self) -> Option<u64> {
        self.armed.get().then(|| self.next_due_us.get())
    }

    fn expire(&self) {
        self.next_due_us
            .set(self.next_due_us.get() + self.period_us as u64);
    }
}

impl PeriodicTimer for &SimChannel<'_> {
    fn stop(&mut self) {
        self.disarm();
    }

    fn restart(&mut self) {
        self.next_due_us
            .set(self.clock.now() + self.period_us as u64);
        self.armed.set(true);
    }

    fn is_armed(&self) -> bool {
        self.armed()
    }
}

/// A channel paired with its callback for one run
pub struct Entry<'a, 'c> {
    channel: &'a SimChannel<'c>,
    callback: &'a mut dyn TimerCallback,
}

impl<'a, 'c> Entry<'a, 'c> {
    pub fn new(channel: &'a SimChannel<'c>, callback: &'a mut dyn TimerCallback) -> Self {
        Self { channel, callback }
    }
}

/// Fire every expiry due up to and including `target_us`, in time order
///
/// `observe` runs after each callback.
pub fn run_until(
    clock: &SimClock,
    target_us: u64,
    entries: &mut [Entry<'_, '_>],
    mut observe: impl FnMut(),
) {
    loop {
        let next = entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.channel.next_due().map(|due| (due, i)))
            .filter(|&(due, _)| due <= target_us)
            .min();

        let Some((due, index)) = next else {
            break;
        };

        clock.set(due);
        let entry = &mut entries[index];
        entry.channel.expire();
        if !entry.callback.on_expiry() {
            entry.channel.disarm();
        }
        observe();
    }

    clock.set(target_us);
}

/// Output pin recording edge timing on the virtual clock
pub struct TracePin<'c> {
    clock: &'c SimClock,
    high: bool,
    pub edges: u32,
    last_edge_us: Option<u64>,
    pub min_gap_us: u64,
    pub max_gap_us: u64,
}

impl<'c> TracePin<'c> {
    pub fn new(clock: &'c SimClock) -> Self {
        Self {
            clock,
            high: false,
            edges: 0,
            last_edge_us: None,
            min_gap_us: u64::MAX,
            max_gap_us: 0,
        }
    }

    fn drive(&mut self, high: bool) {
        if high == self.high {
            return;
        }
        self.high = high;
        self.edges += 1;

        let now = self.clock.now();
        if let Some(last) = self.last_edge_us {
            let gap = now - last;
            self.min_gap_us = self.min_gap_us.min(gap);
            self.max_gap_us = self.max_gap_us.max(gap);
        }
        self.last_edge_us = Some(now);
    }
}

impl OutputPin for TracePin<'_> {
    fn set_high(&mut self) {
        self.drive(true);
    }

    fn set_low(&mut self) {
        self.drive(false);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// LED callback sharing one indicator with its sibling channel
pub struct SharedToggle<'a, P>(pub &'a RefCell<ToggleOutput<P>>);

impl<P: OutputPin> TimerCallback for SharedToggle<'_, P> {
    fn on_expiry(&mut self) -> bool {
        self.0.borrow_mut().toggle();
        true
    }
}

/// Driver recording each direction command with its timestamp
pub struct RecordingDriver<'c> {
    clock: &'c SimClock,
    pub commands: Vec<(u64, Direction)>,
}

impl<'c> RecordingDriver<'c> {
    pub fn new(clock: &'c SimClock) -> Self {
        Self {
            clock,
            commands: Vec::new(),
        }
    }
}

impl ShaftControl for RecordingDriver<'_> {
    type Error = core::convert::Infallible;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.commands.push((self.clock.now(), direction));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::AuxFlag;
    use crate::config::{BoardConfig, TimerPeriods};
    use crate::control::{FlashMode, ModeSwitch, FAST_FLASH_MESSAGE, SLOW_FLASH_MESSAGE};

    /// Everything observable from one simulated run
    #[derive(Debug, PartialEq)]
    struct Trace {
        /// LED edges in each interval leading up to a switch
        led_edges: Vec<u32>,
        step_edges: u32,
        step_gaps: (u64, u64),
        commands: Vec<(u64, Direction)>,
        messages: Vec<&'static str>,
        /// (fast armed, slow armed) right after each switch
        armed_after_switch: Vec<(bool, bool)>,
    }

    /// Run the firmware's startup and `switches` control loop iterations
    ///
    /// Returns the trace and the final auxiliary flag.
    fn simulate(switches: u64, with_aux: bool) -> (Trace, bool) {
        let clock = SimClock::new();
        let periods = TimerPeriods::DEFAULT;
        let interval_us = BoardConfig::DEFAULT.mode_switch_interval_ms as u64 * 1000;

        let led = RefCell::new(ToggleOutput::new(TracePin::new(&clock)));
        let mut slow_cb = SharedToggle(&led);
        let mut fast_cb = SharedToggle(&led);
        let mut step = ToggleOutput::new(TracePin::new(&clock));
        let mut aux = AuxFlag::new();

        // Startup: slow armed, fast attached then stopped
        let slow = SimChannel::attach(&clock, periods.slow_flash_us);
        let fast = SimChannel::attach(&clock, periods.fast_flash_us);
        fast.disarm();
        let step_channel = SimChannel::attach(&clock, periods.step_us);
        let aux_channel = SimChannel::attach(&clock, periods.aux_us);
        if !with_aux {
            aux_channel.disarm();
        }

        let mut mode_switch = ModeSwitch::new(RecordingDriver::new(&clock), &slow, &fast);

        let mut led_edges = Vec::new();
        let mut messages = Vec::new();
        let mut armed_after_switch = Vec::new();
        let mut edges_at_last_switch = 0;

        for n in 1..=switches {
            let mut entries = [
                Entry::new(&slow, &mut slow_cb),
                Entry::new(&fast, &mut fast_cb),
                Entry::new(&step_channel, &mut step),
                Entry::new(&aux_channel, &mut aux),
            ];
            run_until(&clock, n * interval_us, &mut entries, || {
                assert!(!(slow.armed() && fast.armed()), "both LED channels armed");
            });

            let edges = led.borrow().pin().edges;
            led_edges.push(edges - edges_at_last_switch);
            edges_at_last_switch = edges;

            let result = mode_switch.switch();
            assert_eq!(result.shaft, Ok(()));
            messages.push(result.mode.message());
            armed_after_switch.push((fast.armed(), slow.armed()));
            assert!(!(slow.armed() && fast.armed()), "both LED channels armed");
        }

        let step_pin = step.pin();
        let trace = Trace {
            led_edges,
            step_edges: step_pin.edges,
            step_gaps: (step_pin.min_gap_us, step_pin.max_gap_us),
            commands: mode_switch.driver().commands.clone(),
            messages,
            armed_after_switch,
        };
        (trace, aux.get())
    }

    #[test]
    fn test_scenario_first_two_switches() {
        let (trace, _) = simulate(2, true);

        assert_eq!(
            trace.commands,
            [(5_000_000, Direction::Forward), (10_000_000, Direction::Reverse)]
        );
        assert_eq!(trace.messages, [FAST_FLASH_MESSAGE, SLOW_FLASH_MESSAGE]);
        // After t=5s fast runs, after t=10s slow runs
        assert_eq!(trace.armed_after_switch, [(true, false), (false, true)]);
    }

    #[test]
    fn test_led_blink_rate_follows_mode() {
        let (trace, _) = simulate(4, true);

        // 0-5s slow (startup), 5-10s fast, 10-15s slow, 15-20s fast
        assert_eq!(trace.led_edges, [10, 50, 10, 50]);
    }

    #[test]
    fn test_step_pulse_every_300us() {
        let (trace, _) = simulate(6, true);

        let elapsed_us = 6 * 5_000_000;
        assert_eq!(trace.step_edges as u64, elapsed_us / 300);
        assert_eq!(trace.step_gaps, (300, 300));
    }

    #[test]
    fn test_direction_parity() {
        let (trace, _) = simulate(9, true);

        for (i, &(at_us, direction)) in trace.commands.iter().enumerate() {
            let n = i as u64 + 1;
            assert_eq!(at_us, n * 5_000_000);
            assert_eq!(direction == Direction::Forward, n % 2 == 1);
            assert_eq!(trace.messages[i] == FAST_FLASH_MESSAGE, n % 2 == 1);
        }
    }

    #[test]
    fn test_aux_flag_has_no_observable_effect() {
        let (with_aux, flag) = simulate(5, true);
        let (without_aux, untouched) = simulate(5, false);

        assert_eq!(with_aux, without_aux);
        // Toggled at 5s..25s: five flips from the initial `true`
        assert!(!flag);
        assert!(untouched);
    }

    #[test]
    fn test_restart_rearms_from_full_period() {
        let clock = SimClock::new();
        let channel = SimChannel::attach(&clock, 100);
        let mut fired = 0u32;
        let mut count = || {
            fired += 1;
            true
        };

        run_until(&clock, 250, &mut [Entry::new(&channel, &mut count)], || {});
        let mut handle = &channel;
        handle.restart();
        run_until(&clock, 349, &mut [Entry::new(&channel, &mut count)], || {});
        run_until(&clock, 350, &mut [Entry::new(&channel, &mut count)], || {});
        drop(count);

        // 100, 200, then 350 (restart at 250)
        assert_eq!(fired, 3);
    }

    #[test]
    fn test_callback_returning_false_disarms() {
        let clock = SimClock::new();
        let channel = SimChannel::attach(&clock, 10);
        let mut remaining = 3u32;
        let mut countdown = || {
            remaining -= 1;
            remaining > 0
        };

        run_until(&clock, 1_000, &mut [Entry::new(&channel, &mut countdown)], || {});
        drop(countdown);

        assert_eq!(remaining, 0);
        assert!(!channel.armed());
    }

    #[test]
    fn test_initial_mode_is_fast() {
        assert_eq!(FlashMode::INITIAL, FlashMode::Fast);
    }
}
