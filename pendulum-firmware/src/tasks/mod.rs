//! Embassy async tasks
//!
//! Timer channels run as tasks on the interrupt executor. The control loop
//! runs inline in `main` on the thread-mode executor.

pub mod control;
pub mod timer;

pub use control::control_loop;
pub use timer::timer_task;
