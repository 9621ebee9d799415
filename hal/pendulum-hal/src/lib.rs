//! Pendulum Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits shared by the
//! board-agnostic logic and the chip-specific HAL. The control logic in
//! `pendulum-core` only ever talks to these traits, which is what lets the
//! timing behavior be exercised on a host with a simulated clock.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pendulum-firmware)        │
//! └─────────────────────────────────────────┘
//!          │                     │
//!          ▼                     ▼
//! ┌─────────────────┐   ┌─────────────────┐
//! │  pendulum-core  │──▶│  pendulum-hal   │
//! └─────────────────┘   │ (this crate)    │
//!                       └─────────────────┘
//!                           ▲         ▲
//!                           │         │
//!                ┌────────────────┐ ┌────────────────┐
//!                │ pendulum-hal-  │ │ pendulum-hal-  │
//!                │    embassy     │ │    rp2040      │
//!                └────────────────┘ └────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output
//! - [`timer::PeriodicTimer`], [`timer::TimerCallback`] - Repeating timer channels
//!
//! Bus settings ([`spi::SpiConfig`], [`uart::UartConfig`]) are plain data that
//! the chip HAL converts into its own peripheral configuration.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod spi;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use timer::{PeriodicTimer, TimerCallback};
