//! Synchronous serial master
//!
//! One blocking full-duplex controller behind two register-incompatible
//! backends: the dedicated SPI module ([`SpiModule`]) and a USART placed
//! in host-synchronous mode ([`UsartSpi`]). The sequencing - claim the
//! signal lines, enable, exchange, tear down - is written once in
//! [`Master`] against the [`Backend`] seam; only register layout and
//! readiness detection differ per backend.
//!
//! Orthogonally, configuration binds in one of two ways:
//!
//! - [`Fixed`]: parameters are folded into a register image at
//!   construction and applied by `initialize`; `configure` is a no-op.
//!   Zero per-transaction cost when only one device is ever addressed.
//! - [`Variable`]: a [`Profile`] of pre-computed images can be swapped in
//!   between transactions, so one controller serves several devices on a
//!   shared bus without recomputing bit patterns per call.
//!
//! Everything here is blocking and interrupt-naive: `exchange` busy-waits
//! with no timeout, and a peer that never completes parks the caller
//! forever.

pub mod dedicated;
pub mod usart;

pub use dedicated::{SpiModule, SpiRegs};
pub use usart::{UsartImage, UsartRegs, UsartSpi};

use core::convert::Infallible;

use okto_hal::gpio::PinState;
use okto_hal::spi::SpiConfig;

use crate::gpio::Output;
use crate::port::{Pin, PortRegs};

/// Capability seam between the shared controller sequencing and one
/// hardware backend
pub trait Backend {
    /// Pre-computed register image for one parameter set
    type Image: Copy + PartialEq + core::fmt::Debug;

    /// Fold a configuration into this backend's register image
    ///
    /// Pure: identical configurations yield identical images.
    fn image(config: &SpiConfig) -> Self::Image;

    /// Pin-sense setup that must land before the claimed lines start
    /// driving (the pins are still inputs when this runs)
    fn prepare_signal_lines(&self, image: &Self::Image) {
        let _ = image;
    }

    /// Latch level that presents the clock's idle level on the wire
    /// once the driver turns on
    ///
    /// Not necessarily the idle level itself: a backend that realizes
    /// polarity by inverting the pin's sense latches the opposite.
    fn clock_latch_high(image: &Self::Image) -> bool;

    /// Hand out the pin handles for the lines this backend drives:
    /// (clock, data out)
    fn claim_signal_lines(&self) -> (Pin<PortRegs>, Pin<PortRegs>);

    /// Enable the peripheral with `image`
    fn enable(&self, image: &Self::Image);

    /// Re-apply parameters while the peripheral stays enabled
    fn reconfigure(&self, image: &Self::Image);

    /// Disable the peripheral
    fn disable(&self);

    /// Start one byte transfer
    fn begin_exchange(&self, byte: u8);

    /// Whether the transfer started by [`Backend::begin_exchange`] has
    /// completed
    fn exchange_ready(&self) -> bool;

    /// Read back the received byte, ending the transfer
    fn finish_exchange(&self) -> u8;
}

/// Configuration-binding strategy of a [`Master`]
///
/// Implemented by [`Fixed`] and [`Variable`]; not meant to be implemented
/// outside this module.
pub trait Strategy {
    /// Register image type of the backend this strategy binds for
    type Image: Copy;

    /// The currently bound image
    fn image(&self) -> &Self::Image;
}

/// Parameters bound once, at construction
pub struct Fixed<I> {
    image: I,
}

impl<I: Copy> Strategy for Fixed<I> {
    type Image = I;

    fn image(&self) -> &I {
        &self.image
    }
}

/// Parameters swappable between transactions
pub struct Variable<I> {
    image: I,
}

impl<I: Copy> Strategy for Variable<I> {
    type Image = I;

    fn image(&self) -> &I {
        &self.image
    }
}

/// Opaque pre-computed parameter set for one bus device
///
/// Building a profile does all the bit-pattern work up front;
/// [`Master::configure`] then only writes the stored images. Two profiles
/// built from identical configurations compare equal.
pub struct Profile<B: Backend> {
    image: B::Image,
}

impl<B: Backend> Profile<B> {
    /// Pre-compute the register image for `config`
    pub fn new(config: &SpiConfig) -> Self {
        Self {
            image: B::image(config),
        }
    }
}

impl<B: Backend> Clone for Profile<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Backend> Copy for Profile<B> {}

impl<B: Backend> PartialEq for Profile<B> {
    fn eq(&self, other: &Self) -> bool {
        self.image == other.image
    }
}

impl<B: Backend> core::fmt::Debug for Profile<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Profile").field("image", &self.image).finish()
    }
}

/// Blocking synchronous serial master
///
/// Owns the backend (peripheral handle plus routing) and the claimed
/// signal lines. Lifecycle: construction claims the pins and leaves the
/// peripheral disabled; [`Master::initialize`] drives the pins and
/// enables it; dropping the controller disables the peripheral and the
/// pin roles revert to input. Moving the controller transfers all of
/// that ownership - a moved-from value never runs teardown, so the
/// disable happens exactly once, on the final owner.
///
/// Calling `exchange` or `configure` before `initialize` is a
/// precondition violation: the peripheral is disabled and never raises
/// its flags, so the caller spins forever.
pub struct Master<B: Backend, S: Strategy<Image = B::Image>> {
    bus: B,
    strategy: S,
    // Declared after `bus` so teardown disables the peripheral before the
    // roles revert the pins to input.
    sck: Output<PortRegs>,
    data_out: Output<PortRegs>,
}

impl<B: Backend> Master<B, Fixed<B::Image>> {
    /// Build a fixed-configuration master
    ///
    /// Claims the clock and data-out lines immediately (electrically
    /// inert); the peripheral stays disabled until [`Master::initialize`].
    pub fn fixed(bus: B, config: &SpiConfig) -> Self {
        Self::with_strategy(bus, Fixed {
            image: B::image(config),
        })
    }

    /// Parameters are fixed at construction; this is a no-op kept for
    /// call-site parity with the variable-strategy controller
    pub fn configure(&mut self) {}
}

impl<B: Backend> Master<B, Variable<B::Image>> {
    /// Build a variable-configuration master, initially bound to `config`
    ///
    /// Claims the clock and data-out lines immediately (electrically
    /// inert); the peripheral stays disabled until [`Master::initialize`].
    pub fn variable(bus: B, config: &SpiConfig) -> Self {
        Self::with_strategy(bus, Variable {
            image: B::image(config),
        })
    }

    /// Swap in a pre-computed parameter set between transactions
    pub fn configure(&mut self, profile: &Profile<B>) {
        self.bus.reconfigure(&profile.image);
        self.strategy.image = profile.image;
    }
}

impl<B: Backend, S: Strategy<Image = B::Image>> Master<B, S> {
    fn with_strategy(bus: B, strategy: S) -> Self {
        let (sck, data_out) = bus.claim_signal_lines();
        Self {
            bus,
            strategy,
            sck: Output::new(sck),
            data_out: Output::new(data_out),
        }
    }

    /// Drive the claimed lines and enable the peripheral with the bound
    /// parameters
    ///
    /// The clock line starts at its idle level so the first transaction
    /// does not open with a spurious edge: any pin-sense setup lands
    /// while the lines are still inputs, then the clock latch is chosen
    /// so the wire presents the idle level the moment the driver turns
    /// on.
    pub fn initialize(&mut self) {
        let image = *self.strategy.image();
        self.bus.prepare_signal_lines(&image);
        self.sck
            .initialize(PinState::from(B::clock_latch_high(&image)));
        self.data_out.initialize(PinState::Low);
        self.bus.enable(&image);
    }

    /// One blocking full-duplex byte exchange
    ///
    /// Spins until the backend reports completion; a peer that never
    /// responds parks the caller here indefinitely.
    pub fn exchange(&mut self, byte: u8) -> u8 {
        self.bus.begin_exchange(byte);
        while !self.bus.exchange_ready() {
            core::hint::spin_loop();
        }
        self.bus.finish_exchange()
    }
}

impl<B: Backend, S: Strategy<Image = B::Image>> Drop for Master<B, S> {
    fn drop(&mut self) {
        self.bus.disable();
    }
}

impl<B: Backend, S: Strategy<Image = B::Image>> okto_hal::spi::SpiExchange for Master<B, S> {
    type Error = Infallible;

    fn exchange(&mut self, byte: u8) -> Result<u8, Self::Error> {
        Ok(Master::exchange(self, byte))
    }
}

impl<B: Backend, S: Strategy<Image = B::Image>> embedded_hal::spi::ErrorType for Master<B, S> {
    type Error = Infallible;
}

impl<B: Backend, S: Strategy<Image = B::Image>> embedded_hal::spi::SpiBus for Master<B, S> {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(0);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.exchange(word);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let len = read.len().max(write.len());
        for i in 0..len {
            let out = write.get(i).copied().unwrap_or(0);
            let in_ = self.exchange(out);
            if let Some(slot) = read.get_mut(i) {
                *slot = in_;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.exchange(*word);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Exchanges are fully blocking; nothing is ever left in flight
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::dedicated::{ctrl, status};
    use super::*;
    use crate::routing::SpiPins;
    use crate::testutil::fake_block;
    use okto_hal::spi::{BitOrder, Mode, Prescale};
    use proptest::prelude::*;

    fn config() -> SpiConfig {
        SpiConfig::default()
    }

    /// RAM-backed SPI module wired as a loopback peer: the completion
    /// flag is primed so every transfer finishes on the first poll, and
    /// DATA reads back the last byte written.
    fn loopback_module() -> (&'static SpiRegs, SpiModule) {
        let regs: &'static SpiRegs = fake_block();
        let port = fake_block();
        regs.status.write(status::IF);
        let pins = SpiPins {
            port,
            ss: 4,
            mosi: 5,
            miso: 6,
            sck: 7,
        };
        (regs, SpiModule::new(regs, pins))
    }

    #[test]
    fn test_construction_leaves_peripheral_disabled() {
        let (regs, bus) = loopback_module();
        let master = Master::fixed(bus, &config());
        assert_eq!(regs.ctrl.read() & ctrl::ENABLE, 0);
        drop(master);
    }

    #[test]
    fn test_initialize_enables_peripheral() {
        let (regs, bus) = loopback_module();
        let mut master = Master::fixed(bus, &config());
        master.initialize();
        assert_ne!(regs.ctrl.read() & ctrl::ENABLE, 0);
        assert_ne!(regs.ctrl.read() & ctrl::MASTER, 0);
    }

    #[test]
    fn test_fixed_loopback_roundtrip() {
        let (_regs, bus) = loopback_module();
        let mut master = Master::fixed(bus, &config());
        master.initialize();
        for byte in [0x00, 0x01, 0x5A, 0xA5, 0xFF] {
            assert_eq!(master.exchange(byte), byte);
        }
    }

    #[test]
    fn test_variable_loopback_roundtrip() {
        let (_regs, bus) = loopback_module();
        let mut master = Master::variable(bus, &config());
        master.initialize();
        for byte in [0x00, 0x80, 0x3C, 0xFF] {
            assert_eq!(master.exchange(byte), byte);
        }
    }

    #[test]
    fn test_drop_disables_exactly_once_across_moves() {
        let (regs, bus) = loopback_module();
        let mut master = Master::fixed(bus, &config());
        master.initialize();

        // Move the live controller through a new owner; the source is
        // consumed and must not tear anything down.
        let moved = master;
        assert_ne!(regs.ctrl.read() & ctrl::ENABLE, 0);

        drop(moved);
        assert_eq!(regs.ctrl.read() & ctrl::ENABLE, 0);
    }

    #[test]
    fn test_drop_releases_claimed_pins() {
        let (_regs, bus) = loopback_module();
        let port = bus.pins().port;
        {
            let mut master = Master::fixed(bus, &config());
            master.initialize();
            // The strobes latch the last mask written; the data-out claim
            // (MOSI, bit 5) lands after the clock claim
            assert_eq!(port.dirset.read(), 0x20);
            assert_eq!(port.dirclr.read(), 0);
        }
        // Teardown released each role through the clear strobe
        assert_eq!(port.dirclr.read(), 0x20);
    }

    #[test]
    fn test_clock_line_starts_at_idle_level() {
        let (_regs, bus) = loopback_module();
        let port = bus.pins().port;
        let mut master = Master::fixed(
            bus,
            &SpiConfig {
                prescale: Prescale::Div4,
                mode: Mode::Mode2,
                bit_order: BitOrder::MsbFirst,
            },
        );
        master.initialize();
        // Idle-high mode: SCK (bit 7) latched high before the driver
        // turns on; data-out latched low afterwards
        assert_eq!(port.outset.read(), 0x80);
        assert_eq!(port.outclr.read(), 0x20);
    }

    #[test]
    fn test_fixed_configure_is_inert() {
        let (regs, bus) = loopback_module();
        let mut master = Master::fixed(bus, &config());
        master.initialize();

        let snapshot = (
            regs.ctrl.read(),
            regs.intctrl.read(),
            regs.status.read(),
            regs.data.read(),
        );
        for _ in 0..3 {
            master.configure();
        }
        let after = (
            regs.ctrl.read(),
            regs.intctrl.read(),
            regs.status.read(),
            regs.data.read(),
        );
        assert_eq!(snapshot, after);
    }

    #[test]
    fn test_profile_purity() {
        let cfg = SpiConfig {
            prescale: Prescale::Div16,
            mode: Mode::Mode3,
            bit_order: BitOrder::LsbFirst,
        };
        let a = Profile::<SpiModule>::new(&cfg);
        let b = Profile::<SpiModule>::new(&cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn test_variable_configure_applies_and_reapplies_identically() {
        let (regs, bus) = loopback_module();
        let mut master = Master::variable(bus, &config());
        master.initialize();

        let profile = Profile::<SpiModule>::new(&SpiConfig {
            prescale: Prescale::Div128,
            mode: Mode::Mode2,
            bit_order: BitOrder::MsbFirst,
        });

        master.configure(&profile);
        let first = regs.ctrl.read();
        master.configure(&profile);
        assert_eq!(regs.ctrl.read(), first);
    }

    #[test]
    fn test_variable_configure_switches_devices() {
        let (regs, bus) = loopback_module();
        let mut master = Master::variable(bus, &config());
        master.initialize();

        let fast = Profile::<SpiModule>::new(&SpiConfig {
            prescale: Prescale::Div2,
            mode: Mode::Mode0,
            bit_order: BitOrder::MsbFirst,
        });
        let slow = Profile::<SpiModule>::new(&SpiConfig {
            prescale: Prescale::Div128,
            mode: Mode::Mode3,
            bit_order: BitOrder::LsbFirst,
        });
        assert_ne!(fast, slow);

        master.configure(&fast);
        let fast_ctrl = regs.ctrl.read();
        assert_eq!(master.exchange(0x11), 0x11);

        master.configure(&slow);
        assert_ne!(regs.ctrl.read(), fast_ctrl);
        assert_eq!(master.exchange(0x22), 0x22);
    }

    #[test]
    fn test_embedded_hal_spi_bus() {
        use embedded_hal::spi::SpiBus;

        let (_regs, bus) = loopback_module();
        let mut master = Master::fixed(bus, &config());
        master.initialize();

        let mut buf = [0x10, 0x20, 0x30];
        SpiBus::transfer_in_place(&mut master, &mut buf).unwrap();
        assert_eq!(buf, [0x10, 0x20, 0x30]);

        let mut read = [0u8; 2];
        SpiBus::transfer(&mut master, &mut read, &[0xAB, 0xCD]).unwrap();
        assert_eq!(read, [0xAB, 0xCD]);

        SpiBus::write(&mut master, &[1, 2, 3]).unwrap();
        SpiBus::flush(&mut master).unwrap();
    }

    #[test]
    fn test_hal_exchange_trait() {
        use okto_hal::spi::SpiExchange;

        let (_regs, bus) = loopback_module();
        let mut master = Master::variable(bus, &config());
        master.initialize();

        let mut buf = [0xDE, 0xAD];
        SpiExchange::transfer_in_place(&mut master, &mut buf).unwrap();
        assert_eq!(buf, [0xDE, 0xAD]);
    }

    proptest! {
        #[test]
        fn prop_fixed_loopback_identity(byte in any::<u8>()) {
            let (_regs, bus) = loopback_module();
            let mut master = Master::fixed(bus, &config());
            master.initialize();
            prop_assert_eq!(master.exchange(byte), byte);
        }

        #[test]
        fn prop_variable_loopback_identity(byte in any::<u8>()) {
            let (_regs, bus) = loopback_module();
            let mut master = Master::variable(bus, &config());
            master.initialize();
            prop_assert_eq!(master.exchange(byte), byte);
        }
    }
}
