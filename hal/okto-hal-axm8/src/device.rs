//! AXM8 memory map
//!
//! Fixed data-space addresses of the peripheral blocks this HAL touches,
//! and the accessors that turn them into register-block references via
//! the audited cast in [`crate::reg::block_at`]. Register blocks are
//! defined next to the code that drives them; an exhaustive per-peripheral
//! catalogue is deliberately not maintained here.

use crate::port::{PortRegs, VportRegs};
use crate::reg::{self, Reg};
use crate::spi::{SpiRegs, UsartRegs};

const VPORT0_BASE: usize = 0x0010;
const VPORT1_BASE: usize = 0x0014;
const VPORT2_BASE: usize = 0x0018;
const VPORT3_BASE: usize = 0x001C;
const CCP_ADDR: usize = 0x0034;
const PORTA_BASE: usize = 0x0600;
const PORTB_BASE: usize = 0x0620;
const PORTC_BASE: usize = 0x0640;
const PORTD_BASE: usize = 0x0660;
const USART0_BASE: usize = 0x08A0;
const SPI0_BASE: usize = 0x08C0;
const USART1_BASE: usize = 0x09A0;
const SPI1_BASE: usize = 0x09C0;

/// Port A register block
pub fn porta() -> &'static PortRegs {
    unsafe { reg::block_at(PORTA_BASE) }
}

/// Port B register block
pub fn portb() -> &'static PortRegs {
    unsafe { reg::block_at(PORTB_BASE) }
}

/// Port C register block
pub fn portc() -> &'static PortRegs {
    unsafe { reg::block_at(PORTC_BASE) }
}

/// Port D register block
pub fn portd() -> &'static PortRegs {
    unsafe { reg::block_at(PORTD_BASE) }
}

/// Virtual port 0 (aliases the port mapped by the virtual-port control
/// registers; port A after reset)
pub fn vport0() -> &'static VportRegs {
    unsafe { reg::block_at(VPORT0_BASE) }
}

/// Virtual port 1
pub fn vport1() -> &'static VportRegs {
    unsafe { reg::block_at(VPORT1_BASE) }
}

/// Virtual port 2
pub fn vport2() -> &'static VportRegs {
    unsafe { reg::block_at(VPORT2_BASE) }
}

/// Virtual port 3
pub fn vport3() -> &'static VportRegs {
    unsafe { reg::block_at(VPORT3_BASE) }
}

/// SPI module 0 register block
pub fn spi0() -> &'static SpiRegs {
    unsafe { reg::block_at(SPI0_BASE) }
}

/// SPI module 1 register block
pub fn spi1() -> &'static SpiRegs {
    unsafe { reg::block_at(SPI1_BASE) }
}

/// USART 0 register block
pub fn usart0() -> &'static UsartRegs {
    unsafe { reg::block_at(USART0_BASE) }
}

/// USART 1 register block
pub fn usart1() -> &'static UsartRegs {
    unsafe { reg::block_at(USART1_BASE) }
}

/// Configuration change protection register
pub fn ccp() -> &'static Reg<u8> {
    unsafe { reg::block_at(CCP_ADDR) }
}
