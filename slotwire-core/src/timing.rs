//! Bus timing
//!
//! The single-wire bus standard fixes every low and release window of a bit
//! slot in microseconds. Those windows are kept here as named gap constants
//! and converted to ticks of whatever timer drives the slot interrupt.
//!
//! ```text
//!  write 1   ‾‾\_A_/‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾ B ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾\
//!  write 0   ‾‾\_______________ C ______________/‾‾ D ‾‾\
//!  read      ‾‾\_A_/‾‾ E ‾‾^‾‾‾‾‾‾‾‾‾‾‾‾ F ‾‾‾‾‾‾‾‾‾‾‾‾‾\
//!                          sample
//! ```

use slotwire_hal::SlotTimer;

/// Write 1 bus low, and read bus low (µs)
pub const GAP_A: u32 = 6;
/// Write 1 release bus (µs)
pub const GAP_B: u32 = 64;
/// Write 0 bus low (µs)
pub const GAP_C: u32 = 60;
/// Write 0 release bus (µs)
pub const GAP_D: u32 = 10;
/// Read release bus before sampling (µs)
pub const GAP_E: u32 = 9;
/// Read delay after sampling (µs)
pub const GAP_F: u32 = 55;

// Reset and presence-detect windows. Nothing in this crate generates a reset
// pulse; the values are kept with their original units.

/// Reset initial delay (µs, zero so unused)
pub const GAP_G: u32 = 0;
/// Reset bus low, in 8 µs units (480 µs)
pub const GAP_H: u32 = 60;
/// Reset release bus before presence sample (µs)
pub const GAP_I: u32 = 9;
/// Reset delay after presence sample (µs)
pub const GAP_J: u32 = 51;

/// The bus standard specifies windows to 1 µs; a slower tick cannot honor them
pub const MIN_TICK_HZ: u32 = 1_000_000;

/// One of the six intervals that make up a bit slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gap {
    /// A: short low pulse opening a write-1 or read slot
    ShortLow,
    /// B: release after a write-1 low pulse
    Write1Release,
    /// C: long low pulse of a write-0 slot
    Write0Low,
    /// D: recovery after a write-0 low pulse
    Write0Release,
    /// E: release before the read sample
    ReadSettle,
    /// F: remainder of the read slot after sampling
    ReadRecover,
}

impl Gap {
    /// All slot gaps, in A..F order
    pub const ALL: [Gap; 6] = [
        Gap::ShortLow,
        Gap::Write1Release,
        Gap::Write0Low,
        Gap::Write0Release,
        Gap::ReadSettle,
        Gap::ReadRecover,
    ];

    /// Duration mandated by the bus standard, in microseconds
    pub const fn micros(self) -> u32 {
        match self {
            Gap::ShortLow => GAP_A,
            Gap::Write1Release => GAP_B,
            Gap::Write0Low => GAP_C,
            Gap::Write0Release => GAP_D,
            Gap::ReadSettle => GAP_E,
            Gap::ReadRecover => GAP_F,
        }
    }
}

/// Kind of bit slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotKind {
    Write1,
    Write0,
    Read,
}

/// Errors deriving slot timing for a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// Timer tick rate is zero
    ZeroTickRate,
    /// Tick period is longer than 1 µs
    TooCoarse { tick_hz: u32 },
    /// An interval does not fit the compare register
    CompareOverflow { gap: Gap, ticks: u32 },
}

/// Slot intervals expressed in timer ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotTiming {
    /// Timer rate the intervals were derived for
    pub tick_hz: u32,
    /// A
    pub short_low: u32,
    /// B
    pub write1_release: u32,
    /// C
    pub write0_low: u32,
    /// D
    pub write0_release: u32,
    /// E
    pub read_settle: u32,
    /// F
    pub read_recover: u32,
}

/// Convert microseconds to ticks, rounding up
const fn micros_to_ticks(us: u32, tick_hz: u32) -> u64 {
    let scaled = us as u64 * tick_hz as u64;
    scaled.div_ceil(1_000_000)
}

impl SlotTiming {
    /// Derive slot timing for a timer counting at `tick_hz`
    ///
    /// `max_compare` is the widest interval the compare register holds
    /// (255 for an 8-bit timer).
    pub const fn try_new(tick_hz: u32, max_compare: u32) -> Result<Self, TimingError> {
        if tick_hz == 0 {
            return Err(TimingError::ZeroTickRate);
        }
        if tick_hz < MIN_TICK_HZ {
            return Err(TimingError::TooCoarse { tick_hz });
        }

        let mut ticks = [0u32; 6];
        let mut i = 0;
        while i < Gap::ALL.len() {
            let gap = Gap::ALL[i];
            let t = micros_to_ticks(gap.micros(), tick_hz);
            if t > max_compare as u64 {
                let clamped = if t > u32::MAX as u64 { u32::MAX } else { t as u32 };
                return Err(TimingError::CompareOverflow { gap, ticks: clamped });
            }
            ticks[i] = t as u32;
            i += 1;
        }

        Ok(Self {
            tick_hz,
            short_low: ticks[0],
            write1_release: ticks[1],
            write0_low: ticks[2],
            write0_release: ticks[3],
            read_settle: ticks[4],
            read_recover: ticks[5],
        })
    }

    /// Derive slot timing, panicking on an unsupported timer
    ///
    /// Use in a `const` item so an unsupported clock fails the build:
    ///
    /// ```
    /// use slotwire_core::SlotTiming;
    /// const TIMING: SlotTiming = SlotTiming::new(1_000_000, 255);
    /// assert_eq!(TIMING.short_low, 6);
    /// ```
    ///
    /// A tick slower than 1 µs is rejected:
    ///
    /// ```compile_fail
    /// use slotwire_core::SlotTiming;
    /// const TIMING: SlotTiming = SlotTiming::new(250_000, 255);
    /// assert_eq!(TIMING.short_low, 2);
    /// ```
    ///
    /// So is an interval that does not fit the compare register (an 8-bit
    /// timer at 8 MHz needs 512 ticks for the 64 µs release):
    ///
    /// ```compile_fail
    /// use slotwire_core::SlotTiming;
    /// const TIMING: SlotTiming = SlotTiming::new(8_000_000, 255);
    /// assert_eq!(TIMING.short_low, 48);
    /// ```
    pub const fn new(tick_hz: u32, max_compare: u32) -> Self {
        match Self::try_new(tick_hz, max_compare) {
            Ok(timing) => timing,
            Err(TimingError::ZeroTickRate) => panic!("slot timer tick rate is zero"),
            Err(TimingError::TooCoarse { .. }) => {
                panic!("slot timer ticks slower than 1 MHz")
            }
            Err(TimingError::CompareOverflow { .. }) => {
                panic!("slot interval does not fit the compare register")
            }
        }
    }

    /// Derive slot timing from a timer CPU clock and prescale ratio
    pub const fn from_clock(cpu_hz: u32, prescale: u32, max_compare: u32) -> Self {
        if prescale == 0 {
            panic!("prescale ratio is zero");
        }
        Self::new(cpu_hz / prescale, max_compare)
    }

    /// Derive slot timing from a [`SlotTimer`] implementation's rate and
    /// compare width
    ///
    /// Panics like [`SlotTiming::new`], so a `const` fails the build.
    pub const fn for_timer<T: SlotTimer>() -> Self {
        Self::new(T::TICK_HZ, T::MAX_COMPARE)
    }

    /// Ticks for one gap
    pub const fn ticks(&self, gap: Gap) -> u32 {
        match gap {
            Gap::ShortLow => self.short_low,
            Gap::Write1Release => self.write1_release,
            Gap::Write0Low => self.write0_low,
            Gap::Write0Release => self.write0_release,
            Gap::ReadSettle => self.read_settle,
            Gap::ReadRecover => self.read_recover,
        }
    }
}
