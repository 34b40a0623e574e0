//! RP2040-specific HAL for the bus transceiver
//!
//! This crate provides RP2040 implementations of the shared
//! `slotwire-hal` traits:
//!
//! - [`gpio::FlexBusPin`] - open-drain bus line on any GPIO
//! - [`timer::AlarmTimer`] - slot interrupt from TIMER alarm 1
//!
//! The compare handler itself is bound by the firmware, which owns the
//! driver instance:
//!
//! ```ignore
//! #[interrupt]
//! unsafe fn TIMER_IRQ_1() {
//!     WIRE.on_compare();
//! }
//! ```

#![no_std]

pub mod gpio;
pub mod timer;

pub use gpio::FlexBusPin;
pub use timer::{AlarmTimer, SLOT_ALARM};

// Re-export shared traits from slotwire-hal for convenience
pub use slotwire_hal::{InputPin, OpenDrainPin, SlotTimer};
