//! Signal routing
//!
//! One logical peripheral signal can be multiplexed onto more than one
//! physical pin; the selection lives in the port's REMAP register. This
//! module is the single place that knows the mapping, so the synchronous
//! controller never special-cases pins.
//!
//! Pure, stateless lookup: no runtime failure mode. Combinations that do
//! not exist in the silicon do not exist here either.

use crate::device;
use crate::port::PortRegs;

/// Alternate-routing selector for a USART instance
///
/// [`Remap::Alternate`] moves the USART's signals from the low pin nibble
/// to the high one, freeing the default pins for other peripherals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Remap {
    /// Default routing (low pin nibble)
    #[default]
    Standard,
    /// Remapped routing (high pin nibble)
    Alternate,
}

/// Routed pin positions of a dedicated SPI module
pub struct SpiPins {
    /// Port the module's signals are multiplexed onto
    pub port: &'static PortRegs,
    /// Serial clock
    pub sck: u8,
    /// Host data out
    pub mosi: u8,
    /// Host data in
    pub miso: u8,
    /// Slave select
    pub ss: u8,
}

/// Routed pin positions of a USART, with the remap selection that
/// produced them
///
/// The controller carries the selection as routing metadata and programs
/// the REMAP register from it at enable time.
pub struct SerialPins {
    /// Port the USART's signals are multiplexed onto
    pub port: &'static PortRegs,
    /// Transfer clock (serial clock in host-synchronous mode)
    pub xck: u8,
    /// Receive data (host data in)
    pub rxd: u8,
    /// Transmit data (host data out)
    pub txd: u8,
    /// Routing selection this lookup was made for
    pub remap: Remap,
}

/// Pin positions of SPI module 0 (port C)
pub fn spi0() -> SpiPins {
    spi_pins(device::portc())
}

/// Pin positions of SPI module 1 (port D)
pub fn spi1() -> SpiPins {
    spi_pins(device::portd())
}

/// Pin positions of USART 0 (port C) under `remap`
pub fn usart0(remap: Remap) -> SerialPins {
    serial_pins(device::portc(), remap)
}

/// Pin positions of USART 1 (port D) under `remap`
pub fn usart1(remap: Remap) -> SerialPins {
    serial_pins(device::portd(), remap)
}

fn spi_pins(port: &'static PortRegs) -> SpiPins {
    SpiPins {
        port,
        ss: 4,
        mosi: 5,
        miso: 6,
        sck: 7,
    }
}

fn serial_pins(port: &'static PortRegs, remap: Remap) -> SerialPins {
    let (xck, rxd, txd) = serial_bits(remap);
    SerialPins {
        port,
        xck,
        rxd,
        txd,
        remap,
    }
}

fn serial_bits(remap: Remap) -> (u8, u8, u8) {
    match remap {
        Remap::Standard => (1, 2, 3),
        Remap::Alternate => (5, 6, 7),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_bits_standard() {
        assert_eq!(serial_bits(Remap::Standard), (1, 2, 3));
    }

    #[test]
    fn test_serial_bits_alternate() {
        // Same ordering, shifted to the high nibble
        assert_eq!(serial_bits(Remap::Alternate), (5, 6, 7));
    }

    #[test]
    fn test_remap_default_is_standard() {
        assert_eq!(Remap::default(), Remap::Standard);
    }
}
