//! Synchronous serial (SPI) abstractions
//!
//! Provides the byte-exchange bus trait implemented by chip-specific
//! synchronous serial controllers, plus the configuration value types
//! those controllers consume.
//!
//! The protocol is a four-wire clocked serial bus moving 8-bit frames;
//! every transfer is full duplex, so the primitive operation is a single
//! blocking byte exchange. Bulk helpers are built on top of it.

/// Blocking full-duplex byte exchange bus
///
/// The caller is the bus host: it supplies the clock, so an exchange
/// always completes from the host's point of view once the peripheral
/// signals it. Chip-select lines are managed by the caller.
pub trait SpiExchange {
    /// Error type for exchange operations
    type Error;

    /// Shift one byte out while shifting one byte in
    fn exchange(&mut self, byte: u8) -> Result<u8, Self::Error>;

    /// Exchange a buffer in place, overwriting it with the received bytes
    fn transfer_in_place(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        for byte in buf.iter_mut() {
            *byte = self.exchange(*byte)?;
        }
        Ok(())
    }

    /// Write bytes, discarding whatever is received
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.exchange(byte)?;
        }
        Ok(())
    }

    /// Read bytes, clocking out zeros
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        for byte in buf.iter_mut() {
            *byte = self.exchange(0)?;
        }
        Ok(())
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Split the mode into its polarity and phase components
    pub fn split(self) -> (Polarity, Phase) {
        match self {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }

    /// Clock polarity of this mode
    pub fn polarity(self) -> Polarity {
        self.split().0
    }

    /// Clock phase of this mode
    pub fn phase(self) -> Phase {
        self.split().1
    }
}

impl From<(Polarity, Phase)> for Mode {
    fn from((polarity, phase): (Polarity, Phase)) -> Self {
        match (polarity, phase) {
            (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => Mode::Mode0,
            (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => Mode::Mode1,
            (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => Mode::Mode2,
            (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => Mode::Mode3,
        }
    }
}

/// Bit order of a frame on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// Peripheral clock division for the serial clock
///
/// 8-bit controllers derive the serial clock by dividing the peripheral
/// clock; frequencies in Hz would suggest a precision the hardware does
/// not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescale {
    /// Peripheral clock / 2
    Div2,
    /// Peripheral clock / 4
    Div4,
    /// Peripheral clock / 8
    Div8,
    /// Peripheral clock / 16
    Div16,
    /// Peripheral clock / 32
    Div32,
    /// Peripheral clock / 64
    Div64,
    /// Peripheral clock / 128
    Div128,
}

impl Prescale {
    /// The division factor as a number
    pub fn divisor(self) -> u16 {
        match self {
            Prescale::Div2 => 2,
            Prescale::Div4 => 4,
            Prescale::Div8 => 8,
            Prescale::Div16 => 16,
            Prescale::Div32 => 32,
            Prescale::Div64 => 64,
            Prescale::Div128 => 128,
        }
    }
}

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Serial clock division from the peripheral clock
    pub prescale: Prescale,
    /// Clock polarity and phase
    pub mode: Mode,
    /// Bit order on the wire
    pub bit_order: BitOrder,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            prescale: Prescale::Div4,
            mode: Mode::Mode0,
            bit_order: BitOrder::MsbFirst,
        }
    }
}
