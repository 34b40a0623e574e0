//! Slot timer on the RP2040 system timer
//!
//! The RP2040 timer is a free-running 64-bit microsecond counter with four
//! one-shot alarms compared against its low 32 bits. Alarm 0 belongs to the
//! embassy time driver; slots use alarm 1 and its `TIMER_IRQ_1` line.
//!
//! There is no clear-on-match mode, so auto-reload is emulated: the timer
//! remembers the origin of the current interval (the last restart, or the
//! last match) and each compare value is programmed relative to it. Chaining
//! intervals from the previous target rather than from "now" keeps handler
//! latency from accumulating across the phases of a slot.

use embassy_rp::interrupt::{self, InterruptExt, Priority};
use embassy_rp::pac;
use slotwire_hal::SlotTimer;

/// Timer alarm used for bit slots
pub const SLOT_ALARM: usize = 1;

/// Slot timer backed by TIMER alarm 1
pub struct AlarmTimer {
    /// Start of the current interval, in timer ticks
    origin: u32,
    /// Tick the alarm is armed for
    target: u32,
    priority: Priority,
}

impl AlarmTimer {
    /// Create the timer; nothing is touched until `enable`
    ///
    /// `priority` should be the highest in the system: any handler that
    /// runs longer than a few microseconds at equal or higher priority
    /// stretches bus slots.
    pub fn new(priority: Priority) -> Self {
        Self {
            origin: 0,
            target: 0,
            priority,
        }
    }

    #[inline(always)]
    fn now() -> u32 {
        pac::TIMER.timerawl().read()
    }

    #[inline(always)]
    fn clear_pending() {
        pac::TIMER.intr().write(|w| w.set_alarm(SLOT_ALARM, true));
    }

    /// Drop an interrupt raised by hand for a late target
    #[inline(always)]
    fn discard_pending() {
        Self::clear_pending();
        interrupt::TIMER_IRQ_1.unpend();
    }
}

impl SlotTimer for AlarmTimer {
    const TICK_HZ: u32 = 1_000_000;

    // Alarms compare 32 bits; stay in the first half so a target is never
    // mistaken for one that has already passed.
    const MAX_COMPARE: u32 = u32::MAX / 2;

    fn enable(&mut self) {
        Self::clear_pending();
        pac::TIMER.inte().modify(|w| w.set_alarm(SLOT_ALARM, true));

        interrupt::TIMER_IRQ_1.unpend();
        interrupt::TIMER_IRQ_1.set_priority(self.priority);
        unsafe { interrupt::TIMER_IRQ_1.enable() };

        #[cfg(feature = "defmt")]
        defmt::debug!("slot timer: alarm {} enabled", SLOT_ALARM);
    }

    fn start(&mut self) {
        Self::discard_pending();
        self.origin = Self::now();
    }

    #[inline(always)]
    fn restart(&mut self) {
        Self::discard_pending();
        self.origin = Self::now();
    }

    #[inline(always)]
    fn set_compare(&mut self, ticks: u32) {
        self.target = self.origin.wrapping_add(ticks);
        pac::TIMER.alarm(SLOT_ALARM).write_value(self.target);

        // The alarm only fires on an exact match of the low word; if the
        // target went by while we were arming it, disarm it so it cannot
        // match again after the counter wraps, and raise the interrupt now.
        if Self::now().wrapping_sub(self.origin) >= ticks {
            pac::TIMER.armed().write(|w| w.set_armed(1 << SLOT_ALARM));
            interrupt::TIMER_IRQ_1.pend();
        }
    }

    #[inline(always)]
    fn acknowledge(&mut self) {
        Self::clear_pending();
        self.origin = self.target;
    }
}
