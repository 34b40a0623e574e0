//! Bus driver, compare handler, and bit/byte transfer
//!
//! [`SlotWire`] is the single driver instance. It is built with a `const fn`
//! so it can live in a `static` that both the foreground and the compare
//! interrupt reach:
//!
//! ```ignore
//! static WIRE: SlotWire<BusPin, Timer> = SlotWire::new();
//!
//! // Once, at boot:
//! let mut bus = WIRE.init(pin, timer, TIMING)?;
//! bus.write_byte(0xCC);
//!
//! // In the compare-match interrupt:
//! WIRE.on_compare();
//! ```
//!
//! The pin and timer sit behind a critical-section mutex that is held only
//! for the few register writes that start a slot or advance it. The slot
//! state lives outside the mutex, so the foreground busy-waits on it without
//! ever blocking the interrupt.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use slotwire_hal::{OpenDrainPin, SlotTimer};

use crate::slot::{SlotCell, SlotState};
use crate::timing::{SlotKind, SlotTiming};

/// Errors from driver initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// `init` already ran for this driver
    AlreadyInitialized,
}

/// Hardware owned by the driver
struct Transceiver<P, T> {
    pin: P,
    timer: T,
    timing: SlotTiming,
}

/// Single-wire bus driver shared with the compare interrupt
pub struct SlotWire<P, T> {
    hw: Mutex<CriticalSectionRawMutex, RefCell<Option<Transceiver<P, T>>>>,
    slot: SlotCell,
}

impl<P, T> Default for SlotWire<P, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, T> SlotWire<P, T> {
    /// Create an uninitialized driver
    pub const fn new() -> Self {
        Self {
            hw: Mutex::new(RefCell::new(None)),
            slot: SlotCell::new(),
        }
    }

    /// Current operation state
    pub fn state(&self) -> SlotState {
        self.slot.state()
    }
}

impl<P: OpenDrainPin, T: SlotTimer> SlotWire<P, T> {
    /// Take ownership of the bus pin and slot timer
    ///
    /// Tri-states the pin, configures the timer for compare-match operation
    /// and enables its interrupt. Returns the foreground handle through which
    /// all transfers go. Runs once; the driver is never torn down.
    pub fn init(
        &self,
        mut pin: P,
        mut timer: T,
        timing: SlotTiming,
    ) -> Result<BusMaster<'_, P, T>, InitError> {
        self.hw.lock(|hw| {
            let mut hw = hw.borrow_mut();
            if hw.is_some() {
                return Err(InitError::AlreadyInitialized);
            }

            pin.release();
            self.slot.set_state(SlotState::Idle);
            timer.enable();

            #[cfg(feature = "defmt")]
            defmt::debug!(
                "slotwire: {} Hz tick, slot A={} B={} C={} D={} E={} F={}",
                timing.tick_hz,
                timing.short_low,
                timing.write1_release,
                timing.write0_low,
                timing.write0_release,
                timing.read_settle,
                timing.read_recover
            );

            *hw = Some(Transceiver { pin, timer, timing });
            Ok(())
        })?;

        Ok(BusMaster { wire: self })
    }

    /// Compare-match interrupt body
    ///
    /// Advances the slot by one transition: release, sample, program the
    /// next interval, publish the next state. Constant time. Does nothing
    /// before `init` or while idle.
    pub fn on_compare(&self) {
        self.hw.lock(|hw| {
            let mut hw = hw.borrow_mut();
            let Some(hw) = hw.as_mut() else {
                return;
            };

            hw.timer.acknowledge();

            let step = self.slot.state().step();
            if step.release {
                hw.pin.release();
            }
            if step.sample {
                self.slot.store_sample(hw.pin.is_high());
            }
            if let Some(gap) = step.wait {
                hw.timer.set_compare(hw.timing.ticks(gap));
            }
            self.slot.set_state(step.next);
        });
    }

    /// Start the slot timer counting (once per byte)
    fn start_timer(&self) {
        self.hw.lock(|hw| {
            if let Some(hw) = hw.borrow_mut().as_mut() {
                hw.timer.start();
            }
        });
    }

    /// Open a slot: restart the count, program the low interval, pull the
    /// bus low, arm the state
    ///
    /// All under one critical section, so the interrupt never sees a
    /// half-started slot. The restart also drops a match latched while the
    /// bus was idle, which would otherwise be taken as soon as the critical
    /// section ends and cut the low phase short.
    fn begin_slot(&self, kind: SlotKind) {
        let (state, gap) = SlotState::start(kind);
        self.hw.lock(|hw| {
            if let Some(hw) = hw.borrow_mut().as_mut() {
                hw.timer.restart();
                hw.timer.set_compare(hw.timing.ticks(gap));
                hw.pin.drive_low();
                self.slot.set_state(state);
            }
        });
    }

    /// Spin until the interrupt hands the slot back
    ///
    /// A slot lasts tens of microseconds, well below the cost of parking and
    /// waking, so this is a plain poll.
    #[inline(always)]
    fn wait_idle(&self) {
        while !self.slot.is_idle() {
            core::hint::spin_loop();
        }
    }
}

/// Foreground handle to an initialized bus
///
/// Obtained from [`SlotWire::init`]. Every transfer takes `&mut self`, so only
/// one slot can be in flight at a time.
pub struct BusMaster<'a, P, T> {
    wire: &'a SlotWire<P, T>,
}

impl<'a, P: OpenDrainPin, T: SlotTimer> BusMaster<'a, P, T> {
    /// The driver this handle belongs to
    pub fn wire(&self) -> &'a SlotWire<P, T> {
        self.wire
    }

    /// Write one bit slot
    ///
    /// Returns once the full slot, low phase plus release phase, has elapsed
    /// and the bus is released.
    pub fn write_bit(&mut self, bit: bool) {
        self.wire.start_timer();
        self.write_slot(bit);
    }

    /// Read one bit slot
    ///
    /// Returns the bus level sampled after the settle interval following
    /// release.
    pub fn read_bit(&mut self) -> bool {
        self.wire.start_timer();
        self.read_slot()
    }

    /// Write a byte, least-significant bit first
    pub fn write_byte(&mut self, mut byte: u8) {
        self.wire.start_timer();

        for _ in 0..8 {
            self.write_slot(byte & 1 != 0);
            byte >>= 1;
        }
    }

    /// Read a byte, least-significant bit first
    pub fn read_byte(&mut self) -> u8 {
        self.wire.start_timer();

        let mut byte = 0u8;
        for _ in 0..8 {
            // Each bit enters at the top; after eight shifts the first one
            // received sits in bit 0.
            byte >>= 1;
            if self.read_slot() {
                byte |= 0x80;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("slotwire: read {=u8:#x}", byte);

        byte
    }

    /// Write several bytes in order
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Fill `buf` with bytes read from the bus
    pub fn read_bytes(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.read_byte();
        }
    }

    /// One write slot on an already running timer
    fn write_slot(&mut self, bit: bool) {
        let kind = if bit { SlotKind::Write1 } else { SlotKind::Write0 };
        self.wire.begin_slot(kind);
        self.wire.wait_idle();
    }

    /// One read slot on an already running timer
    fn read_slot(&mut self) -> bool {
        self.wire.begin_slot(SlotKind::Read);
        self.wire.wait_idle();
        self.wire.slot.sample()
    }
}
