//! USART backend in host-synchronous mode
//!
//! A general asynchronous-communication peripheral driven as a clocked
//! serial host. Register-incompatible with the dedicated module on every
//! axis: the clock rate lives in the baud registers, phase and bit order
//! in CTRLC, and there is no combined transfer-complete flag - readiness
//! is the data-register-empty flag followed by receive-complete. Clock
//! polarity is not a mode bit at all; it is realized by inverting the XCK
//! pin's sense through its PINnCTRL register.

use okto_hal::spi::{BitOrder, Phase, Polarity, SpiConfig};

use crate::port::{Pin, PortCtrl, PortRegs, REMAP_USART0};
use crate::reg::Reg;
use crate::routing::{Remap, SerialPins};

use super::Backend;

/// STATUS bit fields
pub mod status {
    /// Receive complete interrupt flag
    pub const RXCIF: u8 = 0x80;
    /// Transmit complete interrupt flag
    pub const TXCIF: u8 = 0x40;
    /// Data register empty flag
    pub const DREIF: u8 = 0x20;
}

/// CTRLB bit fields
pub mod ctrlb {
    /// Receiver enable
    pub const RXEN: u8 = 0x10;
    /// Transmitter enable
    pub const TXEN: u8 = 0x08;
}

/// CTRLC bit fields
pub mod ctrlc {
    /// Communication mode: host-synchronous (master SPI)
    pub const CMODE_MSPI: u8 = 0xC0;
    /// Data order: least significant bit first
    pub const UDORD_LSB: u8 = 0x04;
    /// Clock phase: sample on the second transition
    pub const UCPHA: u8 = 0x02;
}

/// USART register block
#[repr(C)]
pub struct UsartRegs {
    /// Transmit/receive data
    pub data: Reg<u8>,
    /// Status flags
    pub status: Reg<u8>,
    _reserved: Reg<u8>,
    /// Interrupt level control
    pub ctrla: Reg<u8>,
    /// Receiver/transmitter enable
    pub ctrlb: Reg<u8>,
    /// Frame format and communication mode
    pub ctrlc: Reg<u8>,
    /// Baud selection, low byte
    pub baudctrla: Reg<u8>,
    /// Baud selection, high bits
    pub baudctrlb: Reg<u8>,
}

/// Pre-computed register image of one USART parameter set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsartImage {
    /// CTRLC value (mode, phase, bit order)
    pub ctrlc: u8,
    /// Baud selection for the transfer clock
    pub bsel: u16,
    /// Whether the XCK pin sense is inverted (idle-high clock)
    pub invert_clock: bool,
}

/// USART placed in host-synchronous mode
pub struct UsartSpi {
    regs: &'static UsartRegs,
    pins: SerialPins,
}

impl UsartSpi {
    /// Bind the backend to a USART's registers and routed pins
    pub fn new(regs: &'static UsartRegs, pins: SerialPins) -> Self {
        Self { regs, pins }
    }

    /// The routed pins this USART drives
    pub fn pins(&self) -> &SerialPins {
        &self.pins
    }

    fn apply(&self, image: &UsartImage) {
        self.regs.baudctrla.write(image.bsel as u8);
        self.regs.baudctrlb.write(((image.bsel >> 8) & 0x0F) as u8);
        self.regs.ctrlc.write(image.ctrlc);
        self.pins.port.invert(self.pins.xck, image.invert_clock);
    }
}

impl Backend for UsartSpi {
    type Image = UsartImage;

    fn image(config: &SpiConfig) -> UsartImage {
        let (polarity, phase) = config.mode.split();
        let mut ctrlc = ctrlc::CMODE_MSPI;
        if phase == Phase::CaptureOnSecondTransition {
            ctrlc |= ctrlc::UCPHA;
        }
        if config.bit_order == BitOrder::LsbFirst {
            ctrlc |= ctrlc::UDORD_LSB;
        }
        UsartImage {
            ctrlc,
            // The transfer clock toggles at twice the baud counter rate
            bsel: config.prescale.divisor() / 2 - 1,
            invert_clock: polarity == Polarity::IdleHigh,
        }
    }

    fn prepare_signal_lines(&self, image: &UsartImage) {
        // Polarity is realized through the XCK pin's sense. It must be
        // in place before the line starts driving, or the wire glitches
        // through the non-idle level until INVEN lands.
        self.pins.port.invert(self.pins.xck, image.invert_clock);
    }

    fn clock_latch_high(image: &UsartImage) -> bool {
        // Latch low in both polarities: with INVEN set the inverted
        // sense presents the idle-high level.
        let _ = image;
        false
    }

    fn claim_signal_lines(&self) -> (Pin<PortRegs>, Pin<PortRegs>) {
        // RXD becomes an input under receiver control; only the clock and
        // data-out lines need claiming.
        (
            Pin::new(self.pins.port, self.pins.xck),
            Pin::new(self.pins.port, self.pins.txd),
        )
    }

    fn enable(&self, image: &UsartImage) {
        if self.pins.remap == Remap::Alternate {
            self.pins.port.remap.set_bits(REMAP_USART0);
        }
        self.apply(image);
        self.regs.ctrlb.set_bits(ctrlb::RXEN | ctrlb::TXEN);
    }

    fn reconfigure(&self, image: &UsartImage) {
        self.apply(image);
    }

    fn disable(&self) {
        self.regs.ctrlb.clear_bits(ctrlb::RXEN | ctrlb::TXEN);
        // Errata: the transmitter keeps overriding the TXD pin after TXEN
        // is cleared; clearing the transfer flags releases the override.
        self.regs
            .status
            .clear_bits(status::RXCIF | status::TXCIF | status::DREIF);
    }

    fn begin_exchange(&self, byte: u8) {
        self.regs.data.write(byte);
    }

    fn exchange_ready(&self) -> bool {
        // No combined flag: transmit-empty first, then receive-complete
        self.regs.status.read() & status::DREIF != 0
            && self.regs.status.read() & status::RXCIF != 0
    }

    fn finish_exchange(&self) -> u8 {
        let byte = self.regs.data.read();
        self.regs
            .status
            .clear_bits(status::RXCIF | status::TXCIF);
        byte
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Fixed, Master, Profile};
    use super::*;
    use crate::port::{PortRegs, PINCTRL_INVEN};
    use crate::testutil::fake_block;
    use okto_hal::spi::{Mode, Prescale};
    use proptest::prelude::*;

    fn fixture(remap: Remap) -> (&'static UsartRegs, &'static PortRegs, UsartSpi) {
        let regs: &'static UsartRegs = fake_block();
        let port: &'static PortRegs = fake_block();
        let (xck, rxd, txd) = match remap {
            Remap::Standard => (1, 2, 3),
            Remap::Alternate => (5, 6, 7),
        };
        let pins = SerialPins {
            port,
            xck,
            rxd,
            txd,
            remap,
        };
        (regs, port, UsartSpi::new(regs, pins))
    }

    /// A RAM-backed USART behaves as a loopback peer once the readiness
    /// flags are primed: DATA reads back the last byte written.
    fn prime(regs: &UsartRegs) {
        regs.status.set_bits(status::DREIF | status::RXCIF);
    }

    fn mspim_config(prescale: Prescale) -> SpiConfig {
        SpiConfig {
            prescale,
            mode: Mode::Mode0,
            bit_order: okto_hal::spi::BitOrder::MsbFirst,
        }
    }

    #[test]
    fn test_image_baud_selection() {
        // BSEL = divisor / 2 - 1
        let table = [
            (Prescale::Div2, 0),
            (Prescale::Div4, 1),
            (Prescale::Div16, 7),
            (Prescale::Div64, 31),
            (Prescale::Div128, 63),
        ];
        for (prescale, bsel) in table {
            assert_eq!(UsartSpi::image(&mspim_config(prescale)).bsel, bsel);
        }
    }

    #[test]
    fn test_image_ctrlc_bits() {
        let img = UsartSpi::image(&SpiConfig {
            prescale: Prescale::Div4,
            mode: Mode::Mode1,
            bit_order: okto_hal::spi::BitOrder::LsbFirst,
        });
        assert_eq!(img.ctrlc, ctrlc::CMODE_MSPI | ctrlc::UCPHA | ctrlc::UDORD_LSB);
        assert!(!img.invert_clock);

        let img = UsartSpi::image(&mspim_config(Prescale::Div4));
        assert_eq!(img.ctrlc, ctrlc::CMODE_MSPI);
    }

    #[test]
    fn test_polarity_becomes_pin_inversion() {
        let (regs, port, bus) = fixture(Remap::Standard);
        let mut master = Master::fixed(
            bus,
            &SpiConfig {
                prescale: Prescale::Div4,
                mode: Mode::Mode2,
                bit_order: okto_hal::spi::BitOrder::MsbFirst,
            },
        );
        master.initialize();

        // Idle-high clock: XCK (bit 1) sense inverted, latch held low
        assert_ne!(port.pinctrl[1].read() & PINCTRL_INVEN, 0);
        assert_ne!(regs.ctrlb.read() & (ctrlb::RXEN | ctrlb::TXEN), 0);
    }

    #[test]
    fn test_idle_high_clock_never_drives_the_wire_low() {
        // An idle-high configuration latches XCK low and lets INVEN
        // present the high level; driving the latch high under INVEN
        // would put a spurious low on the wire before enable.
        let (_regs, port, bus) = fixture(Remap::Standard);
        let mut master = Master::fixed(
            bus,
            &SpiConfig {
                prescale: Prescale::Div4,
                mode: Mode::Mode2,
                bit_order: okto_hal::spi::BitOrder::MsbFirst,
            },
        );
        master.initialize();

        // INVEN in place, and the set strobe was never pulsed for XCK
        assert_ne!(port.pinctrl[1].read() & PINCTRL_INVEN, 0);
        assert_eq!(port.outset.read(), 0);
        assert_eq!(port.outclr.read(), 0x08);
    }

    #[test]
    fn test_enable_programs_remap_when_alternate() {
        let (_regs, port, bus) = fixture(Remap::Alternate);
        let mut master = Master::fixed(bus, &mspim_config(Prescale::Div4));
        master.initialize();
        assert_ne!(port.remap.read() & REMAP_USART0, 0);
    }

    #[test]
    fn test_standard_routing_leaves_remap_alone() {
        let (_regs, port, bus) = fixture(Remap::Standard);
        let mut master = Master::fixed(bus, &mspim_config(Prescale::Div4));
        master.initialize();
        assert_eq!(port.remap.read(), 0);
    }

    #[test]
    fn test_loopback_exchange_scenario() {
        // Scaling factor 64, idle-low clock, capture on the first
        // transition, MSB first - against a loopback peer.
        let (regs, _port, bus) = fixture(Remap::Standard);
        let mut master: Master<UsartSpi, Fixed<UsartImage>> =
            Master::fixed(bus, &mspim_config(Prescale::Div64));
        master.initialize();
        assert_eq!(regs.baudctrla.read(), 31);
        assert_eq!(regs.baudctrlb.read(), 0);

        prime(regs);
        assert_eq!(master.exchange(0xA5), 0xA5);

        // Both completion flags are clear once the exchange finishes
        assert_eq!(regs.status.read() & (status::RXCIF | status::TXCIF), 0);
    }

    #[test]
    fn test_loopback_roundtrip_many_bytes() {
        let (regs, _port, bus) = fixture(Remap::Standard);
        let mut master = Master::variable(bus, &mspim_config(Prescale::Div8));
        master.initialize();

        for byte in [0x00u8, 0x0F, 0xF0, 0xFF, 0x42] {
            prime(regs);
            assert_eq!(master.exchange(byte), byte);
        }
    }

    #[test]
    fn test_variable_profile_switch() {
        let (regs, _port, bus) = fixture(Remap::Standard);
        let mut master = Master::variable(bus, &mspim_config(Prescale::Div4));
        master.initialize();
        assert_eq!(regs.baudctrla.read(), 1);

        let slow = Profile::<UsartSpi>::new(&mspim_config(Prescale::Div128));
        master.configure(&slow);
        assert_eq!(regs.baudctrla.read(), 63);

        prime(regs);
        assert_eq!(master.exchange(0x3C), 0x3C);
    }

    #[test]
    fn test_disable_applies_errata_flag_clear() {
        let (regs, _port, bus) = fixture(Remap::Standard);
        let mut master = Master::fixed(bus, &mspim_config(Prescale::Div4));
        master.initialize();
        prime(regs);
        drop(master);

        // Transmitter off, and the pin-override release flags cleared
        assert_eq!(regs.ctrlb.read() & (ctrlb::RXEN | ctrlb::TXEN), 0);
        assert_eq!(
            regs.status.read() & (status::RXCIF | status::TXCIF | status::DREIF),
            0
        );
    }

    #[test]
    fn test_profile_purity() {
        let config = SpiConfig {
            prescale: Prescale::Div32,
            mode: Mode::Mode1,
            bit_order: okto_hal::spi::BitOrder::LsbFirst,
        };
        assert_eq!(
            Profile::<UsartSpi>::new(&config),
            Profile::<UsartSpi>::new(&config)
        );
    }

    proptest! {
        #[test]
        fn prop_fixed_loopback_identity(byte in any::<u8>()) {
            let (regs, _port, bus) = fixture(Remap::Standard);
            let mut master = Master::fixed(bus, &mspim_config(Prescale::Div4));
            master.initialize();
            prime(regs);
            prop_assert_eq!(master.exchange(byte), byte);
        }

        #[test]
        fn prop_variable_loopback_identity(byte in any::<u8>()) {
            let (regs, _port, bus) = fixture(Remap::Standard);
            let mut master = Master::variable(bus, &mspim_config(Prescale::Div4));
            master.initialize();
            prime(regs);
            prop_assert_eq!(master.exchange(byte), byte);
        }
    }
}
