//! Simulated bus for host tests
//!
//! A virtual 1 MHz clock, a mock compare timer with auto-reload, the master
//! pin, and a peer device share one `World`. A match latches a pending flag
//! that only `acknowledge` or a restart clears. [`SimBus::run`] plays the
//! interrupt on a second thread: it serves a pending match inside a critical
//! section, like a masked interrupt taken on unmask, and otherwise advances
//! the clock while a slot is in flight. Recorded edge times are exact tick
//! counts. [`SimBus::advance`] runs the counter by hand, e.g. while idle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use slotwire_hal::{InputPin, OpenDrainPin, SlotTimer};

use crate::transceiver::SlotWire;

pub const TICK_HZ: u32 = 1_000_000;
pub const MAX_COMPARE: u32 = 255;

/// A peer samples written bits this long after the falling edge
const PEER_SAMPLE_AT: u64 = 30;
/// A peer answering 0 holds the line low this long after the falling edge
const PEER_HOLD_LOW: u64 = 30;

/// How the simulated peer device behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerMode {
    /// Never touches the line
    Silent,
    /// Records every slot as a written bit
    Listen,
    /// Answers every read slot with this byte, LSB first, repeating
    Talk(u8),
    /// Records this many written bytes, then answers them back in order
    Echo(usize),
}

/// One low pulse driven by the master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub fall: u64,
    pub rise: u64,
}

struct Peer {
    mode: PeerMode,
    sample_at: Option<u64>,
    hold_until: Option<u64>,
    rx_bits: u8,
    rx_byte: u8,
    received: Vec<u8>,
    tx: VecDeque<bool>,
}

impl Peer {
    fn new(mode: PeerMode) -> Self {
        Self {
            mode,
            sample_at: None,
            hold_until: None,
            rx_bits: 0,
            rx_byte: 0,
            received: Vec::new(),
            tx: VecDeque::new(),
        }
    }

    fn listening(&self) -> bool {
        match self.mode {
            PeerMode::Listen => true,
            PeerMode::Echo(n) => self.received.len() < n,
            PeerMode::Silent | PeerMode::Talk(_) => false,
        }
    }

    fn queue_byte(&mut self, byte: u8) {
        self.tx.extend((0..8).map(|i| (byte >> i) & 1 != 0));
    }

    /// Master pulled the line low: a new slot begins
    fn on_fall(&mut self, now: u64) {
        if self.listening() {
            self.sample_at = Some(now + PEER_SAMPLE_AT);
            return;
        }

        if let PeerMode::Talk(byte) = self.mode {
            if self.tx.is_empty() {
                self.queue_byte(byte);
            }
        }
        if let Some(bit) = self.tx.pop_front() {
            if !bit {
                self.hold_until = Some(now + PEER_HOLD_LOW);
            }
        }
    }

    fn holding_low(&self) -> bool {
        self.hold_until.is_some()
    }

    fn on_bit(&mut self, high: bool) {
        self.rx_byte >>= 1;
        if high {
            self.rx_byte |= 0x80;
        }
        self.rx_bits += 1;

        if self.rx_bits == 8 {
            self.received.push(self.rx_byte);
            self.rx_bits = 0;
            self.rx_byte = 0;

            if let PeerMode::Echo(n) = self.mode {
                if self.received.len() == n {
                    let bytes = self.received.clone();
                    for byte in bytes {
                        self.queue_byte(byte);
                    }
                }
            }
        }
    }
}

struct World {
    now: u64,
    counter: u32,
    compare: u32,
    enabled: bool,
    running: bool,
    pending: bool,
    acks: u32,
    master_low: bool,
    falls: Vec<u64>,
    rises: Vec<u64>,
    samples: Vec<u64>,
    peer: Peer,
}

impl World {
    fn line_high(&self) -> bool {
        !self.master_low && !self.peer.holding_low()
    }

    /// Advance one tick; true when the compare matches and latches
    fn tick(&mut self) -> bool {
        if !(self.enabled && self.running) {
            return false;
        }

        self.now += 1;
        self.counter += 1;

        if self.peer.hold_until == Some(self.now) {
            self.peer.hold_until = None;
        }
        if self.peer.sample_at == Some(self.now) {
            self.peer.sample_at = None;
            let high = self.line_high();
            self.peer.on_bit(high);
        }

        if self.counter >= self.compare {
            self.counter = 0;
            self.pending = true;
            true
        } else {
            false
        }
    }
}

/// Shared handle to the simulated bus
#[derive(Clone)]
pub struct SimBus {
    world: Arc<Mutex<World>>,
}

/// Master side of the bus line
#[derive(Clone)]
pub struct SimPin {
    world: Arc<Mutex<World>>,
}

/// Compare timer counting virtual ticks
#[derive(Clone)]
pub struct SimTimer {
    world: Arc<Mutex<World>>,
}

fn lock(world: &Mutex<World>) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(|e| e.into_inner())
}

impl InputPin for SimPin {
    fn is_high(&self) -> bool {
        let mut w = lock(&self.world);
        let now = w.now;
        w.samples.push(now);
        w.line_high()
    }
}

impl OpenDrainPin for SimPin {
    fn drive_low(&mut self) {
        let mut w = lock(&self.world);
        if !w.master_low {
            w.master_low = true;
            let now = w.now;
            w.falls.push(now);
            w.peer.on_fall(now);
        }
    }

    fn release(&mut self) {
        let mut w = lock(&self.world);
        if w.master_low {
            w.master_low = false;
            let now = w.now;
            w.rises.push(now);
        }
    }

}

impl SlotTimer for SimTimer {
    const TICK_HZ: u32 = TICK_HZ;
    const MAX_COMPARE: u32 = MAX_COMPARE;

    fn enable(&mut self) {
        lock(&self.world).enabled = true;
    }

    fn start(&mut self) {
        let mut w = lock(&self.world);
        w.running = true;
        w.counter = 0;
        w.pending = false;
    }

    fn restart(&mut self) {
        let mut w = lock(&self.world);
        w.counter = 0;
        w.pending = false;
    }

    fn set_compare(&mut self, ticks: u32) {
        lock(&self.world).compare = ticks;
    }

    fn acknowledge(&mut self) {
        let mut w = lock(&self.world);
        w.acks += 1;
        w.pending = false;
    }
}

/// Sets the stop flag even if the foreground panics
struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

impl SimBus {
    pub fn new(mode: PeerMode) -> Self {
        Self {
            world: Arc::new(Mutex::new(World {
                now: 0,
                counter: 0,
                compare: u32::MAX,
                enabled: false,
                running: false,
                pending: false,
                acks: 0,
                master_low: false,
                falls: Vec::new(),
                rises: Vec::new(),
                samples: Vec::new(),
                peer: Peer::new(mode),
            })),
        }
    }

    pub fn pin(&self) -> SimPin {
        SimPin {
            world: self.world.clone(),
        }
    }

    pub fn timer(&self) -> SimTimer {
        SimTimer {
            world: self.world.clone(),
        }
    }

    /// Run `f` in the foreground while a second thread plays the interrupt
    pub fn run<R>(&self, wire: &SlotWire<SimPin, SimTimer>, f: impl FnOnce() -> R) -> R {
        let stop = AtomicBool::new(false);

        thread::scope(|s| {
            s.spawn(|| {
                while !stop.load(Ordering::Acquire) {
                    let served = critical_section::with(|_| {
                        let pending = lock(&self.world).pending;
                        if pending {
                            wire.on_compare();
                        }
                        pending
                    });
                    if served {
                        continue;
                    }

                    let ticked = {
                        let mut w = lock(&self.world);
                        if wire.state().is_idle() {
                            false
                        } else {
                            w.tick();
                            true
                        }
                    };
                    if !ticked {
                        thread::yield_now();
                    }
                }
            });

            let _stop = StopOnDrop(&stop);
            f()
        })
    }

    /// Run the counter `ticks` ticks regardless of the slot state
    ///
    /// Matches latch the pending flag; the interrupt thread of a running
    /// [`SimBus::run`] serves them once no critical section is held.
    pub fn advance(&self, ticks: u32) {
        let mut w = lock(&self.world);
        for _ in 0..ticks {
            w.tick();
        }
    }

    /// A match is latched and not yet acknowledged
    pub fn match_pending(&self) -> bool {
        lock(&self.world).pending
    }

    /// Virtual time in ticks
    pub fn now(&self) -> u64 {
        lock(&self.world).now
    }

    pub fn is_released(&self) -> bool {
        !lock(&self.world).master_low
    }

    pub fn timer_enabled(&self) -> bool {
        lock(&self.world).enabled
    }

    pub fn timer_running(&self) -> bool {
        lock(&self.world).running
    }

    /// Compare matches taken by the handler
    pub fn acks(&self) -> u32 {
        lock(&self.world).acks
    }

    /// Completed low pulses, in order
    pub fn low_pulses(&self) -> Vec<Pulse> {
        let w = lock(&self.world);
        w.falls
            .iter()
            .zip(w.rises.iter())
            .map(|(&fall, &rise)| Pulse { fall, rise })
            .collect()
    }

    /// Times at which the master sampled the line
    pub fn sample_times(&self) -> Vec<u64> {
        lock(&self.world).samples.clone()
    }

    /// Bytes the peer has received
    pub fn received(&self) -> Vec<u8> {
        lock(&self.world).peer.received.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_matches_after_compare_ticks() {
        let sim = SimBus::new(PeerMode::Silent);
        let mut timer = sim.timer();
        timer.enable();
        timer.start();
        timer.set_compare(3);

        let mut w = lock(&sim.world);
        assert!(!w.tick());
        assert!(!w.tick());
        assert!(w.tick());
        assert_eq!(w.counter, 0);
        assert_eq!(w.now, 3);
        assert!(w.pending);
    }

    #[test]
    fn test_restart_discards_latched_match() {
        let sim = SimBus::new(PeerMode::Silent);
        let mut timer = sim.timer();
        timer.enable();
        timer.start();
        timer.set_compare(4);

        sim.advance(4);
        assert!(sim.match_pending());

        timer.restart();
        assert!(!sim.match_pending());

        sim.advance(3);
        assert!(!sim.match_pending());
        sim.advance(1);
        assert!(sim.match_pending());

        timer.acknowledge();
        assert!(!sim.match_pending());
        assert_eq!(sim.acks(), 1);
    }

    #[test]
    fn test_stopped_timer_does_not_tick() {
        let sim = SimBus::new(PeerMode::Silent);
        let mut timer = sim.timer();
        timer.set_compare(1);

        assert!(!lock(&sim.world).tick());
        assert_eq!(sim.now(), 0);
    }

    #[test]
    fn test_peer_holds_line_for_zero_bit() {
        let sim = SimBus::new(PeerMode::Talk(0xFE));
        let mut pin = sim.pin();
        let mut timer = sim.timer();
        timer.enable();
        timer.start();
        timer.set_compare(u32::MAX);

        pin.drive_low();
        pin.release();
        assert!(pin.is_low());

        for _ in 0..PEER_HOLD_LOW {
            lock(&sim.world).tick();
        }
        assert!(pin.is_high());
    }
}
