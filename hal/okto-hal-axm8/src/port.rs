//! Digital I/O port primitives
//!
//! Two register backends with equivalent semantics at different addresses:
//! the full port block (strobe registers, per-pin control) and the reduced
//! virtual port alias (plain read-modify-write). The GPIO roles in
//! [`crate::gpio`] are written once, generic over either through the
//! [`PortIo`] trait.

use crate::reg::Reg;

/// PINnCTRL: invert the pin's sense (input and output)
pub const PINCTRL_INVEN: u8 = 0x40;
/// PINnCTRL: output/pull configuration field
pub const PINCTRL_OPC_MASK: u8 = 0x38;
/// PINnCTRL OPC value: totem pole with pull-up on input
pub const PINCTRL_OPC_PULLUP: u8 = 0x18;

/// REMAP: move USART0 signals from the low to the high pin nibble
pub const REMAP_USART0: u8 = 0x10;

/// Full I/O port register block
///
/// The SET/CLR/TGL strobes update DIR and OUT with a single store, so
/// masked updates need no read-modify-write.
#[repr(C)]
pub struct PortRegs {
    /// Data direction (1 = output)
    pub dir: Reg<u8>,
    /// Direction set strobe
    pub dirset: Reg<u8>,
    /// Direction clear strobe
    pub dirclr: Reg<u8>,
    /// Direction toggle strobe
    pub dirtgl: Reg<u8>,
    /// Output latch
    pub out: Reg<u8>,
    /// Output set strobe
    pub outset: Reg<u8>,
    /// Output clear strobe
    pub outclr: Reg<u8>,
    /// Output toggle strobe
    pub outtgl: Reg<u8>,
    /// Input level
    pub input: Reg<u8>,
    /// Interrupt control
    pub intctrl: Reg<u8>,
    /// Interrupt 0 pin mask
    pub int0mask: Reg<u8>,
    /// Interrupt 1 pin mask
    pub int1mask: Reg<u8>,
    /// Interrupt flags
    pub intflags: Reg<u8>,
    _reserved0: Reg<u8>,
    /// Peripheral signal remap selection
    pub remap: Reg<u8>,
    _reserved1: Reg<u8>,
    /// Per-pin control (pull, inversion)
    pub pinctrl: [Reg<u8>; 8],
}

/// Reduced virtual port alias
///
/// Mirrors a full port's DIR/OUT/IN/INTFLAGS at I/O-space addresses the
/// core can reach with short instructions. No strobes, no per-pin control.
#[repr(C)]
pub struct VportRegs {
    /// Data direction (1 = output)
    pub dir: Reg<u8>,
    /// Output latch
    pub out: Reg<u8>,
    /// Input level
    pub input: Reg<u8>,
    /// Interrupt flags
    pub intflags: Reg<u8>,
}

/// Mask-based digital I/O operations shared by both port backends
///
/// All operations are direct register accesses; none block or retry.
pub trait PortIo {
    /// Make the masked pins outputs
    fn dir_out(&self, mask: u8);
    /// Make the masked pins inputs
    fn dir_in(&self, mask: u8);
    /// Whether any masked pin is currently an output
    fn is_output(&self, mask: u8) -> bool;
    /// Drive the masked pins high
    fn out_high(&self, mask: u8);
    /// Drive the masked pins low
    fn out_low(&self, mask: u8);
    /// Toggle the masked pins
    fn out_toggle(&self, mask: u8);
    /// Whether the output latch holds the masked pins high
    fn out_is_high(&self, mask: u8) -> bool;
    /// Input level of the masked pins
    fn level(&self, mask: u8) -> bool;
}

/// Per-pin control operations only the full port block can reach
///
/// Virtual ports do not alias PINnCTRL, so pull-ups and pin inversion
/// require the full backend.
pub trait PortCtrl: PortIo {
    /// Enable or disable the pull-up on one pin
    fn pull_up(&self, bit: u8, enable: bool);
    /// Enable or disable inversion of one pin's sense
    fn invert(&self, bit: u8, enable: bool);
}

impl PortIo for PortRegs {
    #[inline]
    fn dir_out(&self, mask: u8) {
        self.dirset.write(mask);
    }

    #[inline]
    fn dir_in(&self, mask: u8) {
        self.dirclr.write(mask);
    }

    #[inline]
    fn is_output(&self, mask: u8) -> bool {
        self.dir.read() & mask != 0
    }

    #[inline]
    fn out_high(&self, mask: u8) {
        self.outset.write(mask);
    }

    #[inline]
    fn out_low(&self, mask: u8) {
        self.outclr.write(mask);
    }

    #[inline]
    fn out_toggle(&self, mask: u8) {
        self.outtgl.write(mask);
    }

    #[inline]
    fn out_is_high(&self, mask: u8) -> bool {
        self.out.read() & mask != 0
    }

    #[inline]
    fn level(&self, mask: u8) -> bool {
        self.input.read() & mask != 0
    }
}

impl PortCtrl for PortRegs {
    fn pull_up(&self, bit: u8, enable: bool) {
        let ctrl = &self.pinctrl[bit as usize];
        if enable {
            ctrl.modify(|v| (v & !PINCTRL_OPC_MASK) | PINCTRL_OPC_PULLUP);
        } else {
            ctrl.clear_bits(PINCTRL_OPC_MASK);
        }
    }

    fn invert(&self, bit: u8, enable: bool) {
        let ctrl = &self.pinctrl[bit as usize];
        if enable {
            ctrl.set_bits(PINCTRL_INVEN);
        } else {
            ctrl.clear_bits(PINCTRL_INVEN);
        }
    }
}

impl PortIo for VportRegs {
    #[inline]
    fn dir_out(&self, mask: u8) {
        self.dir.set_bits(mask);
    }

    #[inline]
    fn dir_in(&self, mask: u8) {
        self.dir.clear_bits(mask);
    }

    #[inline]
    fn is_output(&self, mask: u8) -> bool {
        self.dir.read() & mask != 0
    }

    #[inline]
    fn out_high(&self, mask: u8) {
        self.out.set_bits(mask);
    }

    #[inline]
    fn out_low(&self, mask: u8) {
        self.out.clear_bits(mask);
    }

    #[inline]
    fn out_toggle(&self, mask: u8) {
        self.out.toggle_bits(mask);
    }

    #[inline]
    fn out_is_high(&self, mask: u8) -> bool {
        self.out.read() & mask != 0
    }

    #[inline]
    fn level(&self, mask: u8) -> bool {
        self.input.read() & mask != 0
    }
}

/// Handle to one bit of one digital I/O port
///
/// Move-only: two live handles over the same bit would let two owners
/// drive the same hardware, so the handle is neither `Copy` nor `Clone`.
/// Moving it transfers the claim; Rust ownership stands in for an
/// explicit "unassigned" state.
pub struct Pin<P: PortIo + 'static> {
    port: &'static P,
    bit: u8,
}

impl<P: PortIo + 'static> Pin<P> {
    /// Claim bit `bit` (0-7) of `port`
    ///
    /// Nothing prevents constructing two handles over the same bit; doing
    /// so is a documented misuse, not a guarded error.
    pub fn new(port: &'static P, bit: u8) -> Self {
        debug_assert!(bit < 8);
        Self { port, bit }
    }

    /// The port this pin belongs to
    pub fn port(&self) -> &'static P {
        self.port
    }

    /// Bit index within the port (0-7)
    pub fn bit(&self) -> u8 {
        self.bit
    }

    /// Single-bit mask for this pin
    pub fn mask(&self) -> u8 {
        1 << self.bit
    }
}
