//! Dedicated SPI module backend
//!
//! The module holds every communication parameter in its single CTRL
//! register, so the whole configuration folds into one byte. Transfer
//! completion is a single interrupt flag in STATUS.

use okto_hal::spi::{BitOrder, Phase, Polarity, Prescale, SpiConfig};

use crate::port::{Pin, PortRegs};
use crate::reg::Reg;
use crate::routing::SpiPins;

use super::Backend;

/// CTRL bit fields
pub mod ctrl {
    /// Double-speed clock
    pub const CLK2X: u8 = 0x80;
    /// Module enable
    pub const ENABLE: u8 = 0x40;
    /// Data order: least significant bit first
    pub const DORD_LSB: u8 = 0x20;
    /// Host (master) operation
    pub const MASTER: u8 = 0x10;
    /// Transfer mode: clock polarity
    pub const MODE_CPOL: u8 = 0x08;
    /// Transfer mode: clock phase
    pub const MODE_CPHA: u8 = 0x04;
    /// Clock prescaler field
    pub const PRESCALER_MASK: u8 = 0x03;
}

/// STATUS bit fields
pub mod status {
    /// Transfer complete interrupt flag
    pub const IF: u8 = 0x80;
    /// Write collision flag
    pub const WRCOL: u8 = 0x40;
}

/// SPI module register block
#[repr(C)]
pub struct SpiRegs {
    /// Control: enable, host mode, clock and frame parameters
    pub ctrl: Reg<u8>,
    /// Interrupt level control
    pub intctrl: Reg<u8>,
    /// Status flags
    pub status: Reg<u8>,
    /// Transmit/receive data
    pub data: Reg<u8>,
}

/// Dedicated SPI module placed in host mode
pub struct SpiModule {
    regs: &'static SpiRegs,
    pins: SpiPins,
}

impl SpiModule {
    /// Bind the backend to a module's registers and routed pins
    pub fn new(regs: &'static SpiRegs, pins: SpiPins) -> Self {
        Self { regs, pins }
    }

    /// The routed pins this module drives
    pub fn pins(&self) -> &SpiPins {
        &self.pins
    }
}

/// CLK2X flag and PRESCALER field for a division factor
///
/// The prescaler natively divides by 4/16/64/128; the double-speed bit
/// halves each of those, which is how 2/8/32 are reached.
fn prescale_bits(prescale: Prescale) -> (bool, u8) {
    match prescale {
        Prescale::Div2 => (true, 0b00),
        Prescale::Div4 => (false, 0b00),
        Prescale::Div8 => (true, 0b01),
        Prescale::Div16 => (false, 0b01),
        Prescale::Div32 => (true, 0b10),
        Prescale::Div64 => (false, 0b10),
        Prescale::Div128 => (false, 0b11),
    }
}

impl Backend for SpiModule {
    type Image = u8;

    fn image(config: &SpiConfig) -> u8 {
        let mut image = ctrl::ENABLE | ctrl::MASTER;
        let (clk2x, prescaler) = prescale_bits(config.prescale);
        if clk2x {
            image |= ctrl::CLK2X;
        }
        image |= prescaler & ctrl::PRESCALER_MASK;
        let (polarity, phase) = config.mode.split();
        if polarity == Polarity::IdleHigh {
            image |= ctrl::MODE_CPOL;
        }
        if phase == Phase::CaptureOnSecondTransition {
            image |= ctrl::MODE_CPHA;
        }
        if config.bit_order == BitOrder::LsbFirst {
            image |= ctrl::DORD_LSB;
        }
        image
    }

    fn clock_latch_high(image: &u8) -> bool {
        // The module drives the pin directly; latch level is idle level
        image & ctrl::MODE_CPOL != 0
    }

    fn claim_signal_lines(&self) -> (Pin<PortRegs>, Pin<PortRegs>) {
        // Data-in direction is forced by the module in host mode; only
        // the clock and data-out lines need claiming.
        (
            Pin::new(self.pins.port, self.pins.sck),
            Pin::new(self.pins.port, self.pins.mosi),
        )
    }

    fn enable(&self, image: &u8) {
        self.regs.ctrl.write(*image);
    }

    fn reconfigure(&self, image: &u8) {
        self.regs.ctrl.write(*image);
    }

    fn disable(&self) {
        self.regs.ctrl.clear_bits(ctrl::ENABLE);
    }

    fn begin_exchange(&self, byte: u8) {
        self.regs.data.write(byte);
    }

    fn exchange_ready(&self) -> bool {
        self.regs.status.read() & status::IF != 0
    }

    fn finish_exchange(&self) -> u8 {
        self.regs.data.read()
    }
}
