//! Board wiring and bench settings
//!
//! Bus on GPIO2 with an external 4.7k pull-up to 3V3 (Pico header pin 4).

use embassy_rp::gpio::Pull;
use embassy_rp::interrupt::Priority;

/// Pull applied to the bus GPIO (external pull-up fitted)
pub const BUS_PULL: Pull = Pull::None;

/// Slot interrupt priority; nothing else may run at P0
pub const SLOT_IRQ_PRIORITY: Priority = Priority::P0;

/// Byte written every round, 1,0,1,0,0,1,0,1 on the wire
pub const TEST_PATTERN: u8 = 0xA5;

/// Pause between rounds
pub const ROUND_INTERVAL_MS: u64 = 500;
