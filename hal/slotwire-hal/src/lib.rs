//! Slotwire Hardware Abstraction Layer
//!
//! This crate defines the two pieces of hardware a bit-slot transceiver
//! needs, as traits that chip-specific HALs implement. The slot state
//! machine in `slotwire-core` only ever talks to these traits, so it runs
//! unchanged on a real chip or against a simulated bus on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Firmware (slotwire-firmware, etc.)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  slotwire-core (state machine, bytes)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  slotwire-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ slotwire-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`], [`gpio::OpenDrainPin`] - Shared bus line
//! - [`timer::SlotTimer`] - Compare-match interval timer

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OpenDrainPin};
pub use timer::SlotTimer;
