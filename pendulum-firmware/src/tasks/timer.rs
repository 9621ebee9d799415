//! Timer channel task

use defmt::*;
use pendulum_core::config::TimerChannel;
use pendulum_hal::TimerCallback;
use pendulum_hal_embassy::{run_channel, TimerSlot};

/// Timer channel task - invokes `callback` every period while armed
#[embassy_executor::task(pool_size = 4)]
pub async fn timer_task(
    channel: TimerChannel,
    slot: &'static TimerSlot,
    callback: &'static mut (dyn TimerCallback + Send),
) {
    info!(
        "Timer{} ({}) started, period {}us, armed={}",
        channel.index(),
        channel.name(),
        slot.period_us(),
        slot.is_armed()
    );

    run_channel(slot, callback).await
}
