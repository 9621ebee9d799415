//! Configuration types
//!
//! Board wiring, driver electrical settings and timer periods. All values
//! are fixed at build time; the firmware embeds them from `board.toml`.

pub mod hardware;
pub mod timing;

pub use hardware::*;
pub use timing::*;
