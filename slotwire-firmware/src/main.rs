//! Slotwire - bench firmware
//!
//! Drives the bit transceiver on an RP2040: writes a fixed pattern byte,
//! reads one byte back, and logs both every round. With a logic analyser on
//! the bus pin the write shows the 6 µs / 60 µs low pulses of the pattern;
//! with a loopback peer attached the read-back byte matches it.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::interrupt;
use embassy_time::Timer;
use slotwire_core::{SlotTiming, SlotWire};
use slotwire_hal_rp2040::{AlarmTimer, FlexBusPin};
use {defmt_rtt as _, panic_probe as _};

mod board;

/// The one bus driver, shared with the slot interrupt
static WIRE: SlotWire<FlexBusPin<'static>, AlarmTimer> = SlotWire::new();

/// Slot timing for the 1 MHz system timer; an unusable timer fails the build
const TIMING: SlotTiming = SlotTiming::for_timer::<AlarmTimer>();

#[interrupt]
unsafe fn TIMER_IRQ_1() {
    WIRE.on_compare();
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Slotwire firmware starting...");

    let p = embassy_rp::init(Default::default());

    let pin = FlexBusPin::new(p.PIN_2, board::BUS_PULL);
    let timer = AlarmTimer::new(board::SLOT_IRQ_PRIORITY);

    let mut bus = match WIRE.init(pin, timer, TIMING) {
        Ok(bus) => bus,
        Err(e) => defmt::panic!("Bus init failed: {}", e),
    };
    info!("Bus initialized on GPIO2");

    let mut round: u32 = 0;
    loop {
        bus.write_byte(board::TEST_PATTERN);
        let read = bus.read_byte();

        if read == board::TEST_PATTERN {
            info!("Round {}: wrote {=u8:#x}, read back {=u8:#x}", round, board::TEST_PATTERN, read);
        } else {
            warn!("Round {}: wrote {=u8:#x}, read {=u8:#x}", round, board::TEST_PATTERN, read);
        }

        round = round.wrapping_add(1);
        Timer::after_millis(board::ROUND_INTERVAL_MS).await;
    }
}
