//! Open-drain bus pin
//!
//! The RP2040 has no open-drain output mode, so the line is emulated the
//! usual way: the output latch stays low and only the output enable is
//! toggled. Output enabled pulls the line low; output disabled leaves it to
//! the pull-up.

use embassy_rp::gpio::{Flex, Pin, Pull};
use embassy_rp::Peri;
use slotwire_hal::{InputPin, OpenDrainPin};

/// Bus line on a single GPIO
pub struct FlexBusPin<'d> {
    pin: Flex<'d>,
}

impl<'d> FlexBusPin<'d> {
    /// Take a GPIO as the bus line
    ///
    /// `pull` is normally `Pull::None` with an external 4.7k pull-up; the
    /// internal pull-up (~50k) only suits short buses with a single device.
    /// The pin starts tri-stated.
    pub fn new(pin: Peri<'d, impl Pin>, pull: Pull) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_pull(pull);
        pin.set_low();
        pin.set_as_input();

        Self { pin }
    }
}

impl InputPin for FlexBusPin<'_> {
    #[inline(always)]
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

impl OpenDrainPin for FlexBusPin<'_> {
    #[inline(always)]
    fn drive_low(&mut self) {
        self.pin.set_as_output();
    }

    #[inline(always)]
    fn release(&mut self) {
        self.pin.set_as_input();
    }
}
