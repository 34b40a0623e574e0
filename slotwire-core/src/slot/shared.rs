//! State shared between the foreground and the compare interrupt
//!
//! Single writer per phase: the foreground writes the state only while it is
//! `Idle` (to start a slot), the interrupt is the only writer while it is not.
//! Both fields are single atomic words, so a poll never sees a torn value.

use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use super::state::SlotState;

/// Operation state and sampled bit
pub struct SlotCell {
    state: AtomicU8,
    sample: AtomicBool,
}

impl Default for SlotCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotCell {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(SlotState::Idle as u8),
            sample: AtomicBool::new(false),
        }
    }

    /// Current operation state
    #[inline(always)]
    pub fn state(&self) -> SlotState {
        SlotState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Publish a new operation state
    #[inline(always)]
    pub fn set_state(&self, state: SlotState) {
        self.state.store(state.as_raw(), Ordering::Release);
    }

    /// Bit captured by the last completed read slot
    ///
    /// Stale outside a read; only meaningful right after the state returns
    /// to `Idle` from `ReadRelease`.
    #[inline(always)]
    pub fn sample(&self) -> bool {
        self.sample.load(Ordering::Relaxed)
    }

    /// Record the sampled bit (interrupt side)
    ///
    /// Must happen before the state advances past `ReadSample` so the
    /// Release store of the state publishes it.
    #[inline(always)]
    pub fn store_sample(&self, high: bool) {
        self.sample.store(high, Ordering::Relaxed);
    }

    pub fn is_idle(&self) -> bool {
        self.state().is_idle()
    }
}
