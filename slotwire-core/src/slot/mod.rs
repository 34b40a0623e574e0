//! Bit-slot state machine
//!
//! A slot is started by the foreground and walked to completion by the
//! compare interrupt. The state machine itself is pure data; the hardware
//! effects of each transition are applied by the driver.

pub mod shared;
pub mod state;

pub use shared::SlotCell;
pub use state::{SlotState, Step};
