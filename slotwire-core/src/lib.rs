//! Board-agnostic core of the single-wire bit transceiver
//!
//! This crate contains everything that does not depend on a specific chip:
//!
//! - Bus timing constants and their conversion to timer ticks
//! - The bit-slot state machine advanced by the compare interrupt
//! - The interrupt-shared slot state
//! - The driver object, its interrupt handler body, and the bit/byte routines
//!
//! Hardware is reached only through the `slotwire-hal` traits.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod slot;
pub mod timing;
pub mod transceiver;

#[cfg(test)]
mod sim;

pub use slot::{SlotCell, SlotState, Step};
pub use timing::{Gap, SlotKind, SlotTiming, TimingError};
pub use transceiver::{BusMaster, InitError, SlotWire};
