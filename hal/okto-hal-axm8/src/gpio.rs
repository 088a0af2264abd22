//! GPIO pin roles
//!
//! Four ownership roles over a [`Pin`] handle, written once and generic
//! over either port backend. Construction is electrically inert;
//! `initialize` claims the pin's direction; dropping a role applies its
//! teardown contract so the pin never keeps driving the wire past the
//! role's lifetime.
//!
//! Roles implement both the [`okto_hal::gpio`] traits and the
//! `embedded-hal` digital traits, so ecosystem drivers run on top.

use core::convert::Infallible;

use okto_hal::gpio::PinState;

use crate::port::{Pin, PortCtrl, PortIo};

/// Plain digital input
///
/// No teardown action: an input is already the safe default.
pub struct Input<P: PortIo + 'static> {
    pin: Pin<P>,
}

impl<P: PortIo + 'static> Input<P> {
    /// Take ownership of the pin without touching hardware
    pub fn new(pin: Pin<P>) -> Self {
        Self { pin }
    }

    /// Set the pin's direction to input
    pub fn initialize(&mut self) {
        self.pin.port().dir_in(self.pin.mask());
    }

    /// Input level of the wire
    pub fn is_high(&self) -> bool {
        self.pin.port().level(self.pin.mask())
    }

    /// Inverse of [`Input::is_high`]
    pub fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Digital input with the internal pull-up enabled
///
/// Teardown disables the pull-up. Requires the full port backend: virtual
/// ports cannot reach the per-pin control registers.
pub struct PullUpInput<P: PortCtrl + 'static> {
    pin: Pin<P>,
}

impl<P: PortCtrl + 'static> PullUpInput<P> {
    /// Take ownership of the pin without touching hardware
    pub fn new(pin: Pin<P>) -> Self {
        Self { pin }
    }

    /// Set the direction to input and enable the pull-up
    pub fn initialize(&mut self) {
        self.pin.port().dir_in(self.pin.mask());
        self.pin.port().pull_up(self.pin.bit(), true);
    }

    /// Input level of the wire
    pub fn is_high(&self) -> bool {
        self.pin.port().level(self.pin.mask())
    }

    /// Inverse of [`PullUpInput::is_high`]
    pub fn is_low(&self) -> bool {
        !self.is_high()
    }
}

impl<P: PortCtrl + 'static> Drop for PullUpInput<P> {
    fn drop(&mut self) {
        self.pin.port().pull_up(self.pin.bit(), false);
    }
}

/// Push-pull output
///
/// Teardown reverts the pin to input.
pub struct Output<P: PortIo + 'static> {
    pin: Pin<P>,
}

impl<P: PortIo + 'static> Output<P> {
    /// Take ownership of the pin without touching hardware
    pub fn new(pin: Pin<P>) -> Self {
        Self { pin }
    }

    /// Latch `initial` and switch the pin to output
    ///
    /// The latch is written first so the pin never glitches through the
    /// wrong level when the driver turns on.
    pub fn initialize(&mut self, initial: PinState) {
        if initial.is_high() {
            self.pin.port().out_high(self.pin.mask());
        } else {
            self.pin.port().out_low(self.pin.mask());
        }
        self.pin.port().dir_out(self.pin.mask());
    }

    /// Drive the pin high
    pub fn set_high(&mut self) {
        self.pin.port().out_high(self.pin.mask());
    }

    /// Drive the pin low
    pub fn set_low(&mut self) {
        self.pin.port().out_low(self.pin.mask());
    }

    /// Toggle the pin
    pub fn toggle(&mut self) {
        self.pin.port().out_toggle(self.pin.mask());
    }

    /// Whether the output latch is high
    pub fn is_set_high(&self) -> bool {
        self.pin.port().out_is_high(self.pin.mask())
    }
}

impl<P: PortIo + 'static> Drop for Output<P> {
    fn drop(&mut self) {
        self.pin.port().dir_in(self.pin.mask());
    }
}

/// Open-drain output, emulated by direction switching
///
/// The output latch is held low; the line is driven low by making the pin
/// an output and released by making it an input (an external pull-up
/// supplies the high level). Teardown reverts to input, which is the
/// released state.
pub struct OpenDrain<P: PortIo + 'static> {
    pin: Pin<P>,
}

impl<P: PortIo + 'static> OpenDrain<P> {
    /// Take ownership of the pin without touching hardware
    pub fn new(pin: Pin<P>) -> Self {
        Self { pin }
    }

    /// Latch low, then drive or release according to `initial`
    pub fn initialize(&mut self, initial: PinState) {
        self.pin.port().out_low(self.pin.mask());
        if initial.is_high() {
            self.pin.port().dir_in(self.pin.mask());
        } else {
            self.pin.port().dir_out(self.pin.mask());
        }
    }

    /// Release the line (external pull-up takes it high)
    pub fn set_high(&mut self) {
        self.pin.port().dir_in(self.pin.mask());
    }

    /// Drive the line low
    pub fn set_low(&mut self) {
        self.pin.port().dir_out(self.pin.mask());
    }

    /// Switch between driving and releasing
    pub fn toggle(&mut self) {
        if self.pin.port().is_output(self.pin.mask()) {
            self.pin.port().dir_in(self.pin.mask());
        } else {
            self.pin.port().dir_out(self.pin.mask());
        }
    }

    /// Whether the line is released (not driven low)
    pub fn is_set_high(&self) -> bool {
        !self.pin.port().is_output(self.pin.mask())
    }

    /// Level actually on the wire
    pub fn level(&self) -> bool {
        self.pin.port().level(self.pin.mask())
    }
}

impl<P: PortIo + 'static> Drop for OpenDrain<P> {
    fn drop(&mut self) {
        self.pin.port().dir_in(self.pin.mask());
    }
}

// okto-hal trait implementations

impl<P: PortIo + 'static> okto_hal::gpio::OutputPin for Output<P> {
    fn set_high(&mut self) {
        Output::set_high(self);
    }

    fn set_low(&mut self) {
        Output::set_low(self);
    }

    fn toggle(&mut self) {
        Output::toggle(self);
    }

    fn is_set_high(&self) -> bool {
        Output::is_set_high(self)
    }
}

impl<P: PortIo + 'static> okto_hal::gpio::OutputPin for OpenDrain<P> {
    fn set_high(&mut self) {
        OpenDrain::set_high(self);
    }

    fn set_low(&mut self) {
        OpenDrain::set_low(self);
    }

    fn toggle(&mut self) {
        OpenDrain::toggle(self);
    }

    fn is_set_high(&self) -> bool {
        OpenDrain::is_set_high(self)
    }
}

impl<P: PortIo + 'static> okto_hal::gpio::InputPin for Input<P> {
    fn is_high(&self) -> bool {
        Input::is_high(self)
    }
}

impl<P: PortCtrl + 'static> okto_hal::gpio::InputPin for PullUpInput<P> {
    fn is_high(&self) -> bool {
        PullUpInput::is_high(self)
    }
}

impl<P: PortIo + 'static> okto_hal::gpio::InputPin for OpenDrain<P> {
    fn is_high(&self) -> bool {
        OpenDrain::level(self)
    }
}

// embedded-hal digital trait implementations

impl<P: PortIo + 'static> embedded_hal::digital::ErrorType for Output<P> {
    type Error = Infallible;
}

impl<P: PortIo + 'static> embedded_hal::digital::OutputPin for Output<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Output::set_low(self);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Output::set_high(self);
        Ok(())
    }
}

impl<P: PortIo + 'static> embedded_hal::digital::StatefulOutputPin for Output<P> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(Output::is_set_high(self))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!Output::is_set_high(self))
    }
}

impl<P: PortIo + 'static> embedded_hal::digital::ErrorType for OpenDrain<P> {
    type Error = Infallible;
}

impl<P: PortIo + 'static> embedded_hal::digital::OutputPin for OpenDrain<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        OpenDrain::set_low(self);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        OpenDrain::set_high(self);
        Ok(())
    }
}

impl<P: PortIo + 'static> embedded_hal::digital::ErrorType for Input<P> {
    type Error = Infallible;
}

impl<P: PortIo + 'static> embedded_hal::digital::InputPin for Input<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(Input::is_high(self))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(Input::is_low(self))
    }
}

impl<P: PortCtrl + 'static> embedded_hal::digital::ErrorType for PullUpInput<P> {
    type Error = Infallible;
}

impl<P: PortCtrl + 'static> embedded_hal::digital::InputPin for PullUpInput<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(PullUpInput::is_high(self))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(PullUpInput::is_low(self))
    }
}
