//! Bus line abstractions
//!
//! The bus is a single open-drain line with an external pull-up. A master
//! never drives it high: it either pulls the line low or lets go of it.

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Open-drain bus pin
///
/// The output latch is held low for the lifetime of the pin, so switching
/// the driver on always pulls the line low and switching it off releases
/// the line to the pull-up. Both calls must be a register write or two;
/// they run inside the compare interrupt.
pub trait OpenDrainPin: InputPin {
    /// Enable the output driver, pulling the line low
    fn drive_low(&mut self);

    /// Disable the output driver (high impedance)
    fn release(&mut self);
}
