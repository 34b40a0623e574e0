//! Compare-match timer abstraction
//!
//! Models a free-running counter with a compare register in auto-reload
//! (clear-on-match) mode. Each match raises the slot interrupt and the
//! counter starts again from zero, so every interval programmed with
//! [`SlotTimer::set_compare`] is measured from the previous restart or match.

/// Interval timer driving the bit-slot interrupt
pub trait SlotTimer {
    /// Counter rate in Hz
    const TICK_HZ: u32;

    /// Largest interval, in ticks, the compare register can hold
    const MAX_COMPARE: u32;

    /// Configure periodic compare mode and enable the match interrupt
    ///
    /// Called once during initialization. The counter does not need to be
    /// running afterwards.
    fn enable(&mut self);

    /// Clear any pending match and start counting from zero
    fn start(&mut self);

    /// Reset the counter to zero and discard any pending match
    ///
    /// An auto-reload counter keeps matching while the bus is idle. A match
    /// latched just before a slot starts belongs to the idle period and must
    /// not be taken as the end of the new slot's first interval.
    fn restart(&mut self);

    /// Program the next match `ticks` after the last restart or match
    fn set_compare(&mut self, ticks: u32);

    /// Clear the pending match on interrupt entry
    ///
    /// The next interval is measured from the match that was just taken.
    fn acknowledge(&mut self);
}
