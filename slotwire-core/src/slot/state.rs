//! Slot states and the compare-match transition table

use crate::timing::{Gap, SlotKind};

/// Phase of the bit slot currently in flight
///
/// Exactly one state is active at a time. `Idle` means no slot is in flight
/// and a new one may be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SlotState {
    /// No slot in flight
    #[default]
    Idle = 0,
    /// Bus held low for a 0 bit
    Write0Low = 1,
    /// Bus released, finishing a 0 bit
    Write0Release = 2,
    /// Bus held low for a 1 bit
    Write1Low = 3,
    /// Bus released, finishing a 1 bit
    Write1Release = 4,
    /// Bus held low to open a read slot
    ReadLow = 5,
    /// Bus released, waiting for the sample point
    ReadSample = 6,
    /// Bit sampled, waiting out the rest of the slot
    ReadRelease = 7,
}

/// What the compare interrupt does on entry to a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    /// State after this interrupt
    pub next: SlotState,
    /// Release the bus
    pub release: bool,
    /// Sample the bus into the sampled bit
    pub sample: bool,
    /// Interval until the next interrupt, if the slot continues
    pub wait: Option<Gap>,
}

impl Step {
    const fn stay(next: SlotState) -> Self {
        Self {
            next,
            release: false,
            sample: false,
            wait: None,
        }
    }

    const fn release_then(next: SlotState, wait: Gap) -> Self {
        Self {
            next,
            release: true,
            sample: false,
            wait: Some(wait),
        }
    }
}

impl SlotState {
    /// Decode a stored state byte
    ///
    /// Only values written by [`SlotState::as_raw`] are ever stored; anything
    /// else decodes as `Idle`.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => SlotState::Write0Low,
            2 => SlotState::Write0Release,
            3 => SlotState::Write1Low,
            4 => SlotState::Write1Release,
            5 => SlotState::ReadLow,
            6 => SlotState::ReadSample,
            7 => SlotState::ReadRelease,
            _ => SlotState::Idle,
        }
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// State and first interval of a new slot
    pub const fn start(kind: SlotKind) -> (Self, Gap) {
        match kind {
            SlotKind::Write1 => (SlotState::Write1Low, Gap::ShortLow),
            SlotKind::Write0 => (SlotState::Write0Low, Gap::Write0Low),
            SlotKind::Read => (SlotState::ReadLow, Gap::ShortLow),
        }
    }

    pub const fn is_idle(self) -> bool {
        matches!(self, SlotState::Idle)
    }

    /// Transition taken when the compare match fires in this state
    ///
    /// Pulling the bus low is never part of a step: the foreground does that
    /// before arming the slot.
    pub const fn step(self) -> Step {
        use SlotState::*;

        match self {
            Idle => Step::stay(Idle),

            Write0Low => Step::release_then(Write0Release, Gap::Write0Release),
            Write0Release => Step::stay(Idle),

            Write1Low => Step::release_then(Write1Release, Gap::Write1Release),
            Write1Release => Step::stay(Idle),

            ReadLow => Step::release_then(ReadSample, Gap::ReadSettle),
            ReadSample => Step {
                next: ReadRelease,
                release: false,
                sample: true,
                wait: Some(Gap::ReadRecover),
            },
            ReadRelease => Step::stay(Idle),
        }
    }
}
