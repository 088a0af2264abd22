//! Register access primitives
//!
//! Memory-mapped registers are reached through shared references to
//! `#[repr(C)]` register blocks. Every load and store is volatile: each
//! access reaches the hardware, and the compiler may not merge, elide, or
//! reorder them relative to one another.

use core::cell::UnsafeCell;
use core::ptr;

/// Unlock key the configuration change protection register accepts for
/// protected I/O register writes
pub const CCP_IOREG_KEY: u8 = 0xD8;

/// A single memory-mapped hardware register
#[repr(transparent)]
pub struct Reg<T: Copy> {
    value: UnsafeCell<T>,
}

// Register blocks are handed out as shared references; the hardware, not
// the Rust memory model, arbitrates the underlying storage.
unsafe impl<T: Copy> Sync for Reg<T> {}

impl<T: Copy> Reg<T> {
    /// Create a register cell holding `value`
    ///
    /// Hardware register blocks are never constructed, only reached via
    /// [`block_at`]; this exists so tests can fabricate RAM-backed blocks.
    pub const fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    /// Volatile load
    #[inline]
    pub fn read(&self) -> T {
        unsafe { ptr::read_volatile(self.value.get()) }
    }

    /// Volatile store
    #[inline]
    pub fn write(&self, value: T) {
        unsafe { ptr::write_volatile(self.value.get(), value) }
    }

    /// Read-modify-write
    #[inline]
    pub fn modify(&self, f: impl FnOnce(T) -> T) {
        self.write(f(self.read()));
    }
}

impl Reg<u8> {
    /// OR the mask into the register
    #[inline]
    pub fn set_bits(&self, mask: u8) {
        self.modify(|v| v | mask);
    }

    /// AND the inverted mask into the register
    #[inline]
    pub fn clear_bits(&self, mask: u8) {
        self.modify(|v| v & !mask);
    }

    /// XOR the mask into the register
    #[inline]
    pub fn toggle_bits(&self, mask: u8) {
        self.modify(|v| v ^ mask);
    }
}

/// A register guarded by the configuration change protection interlock
///
/// Hardware accepts a store only when it immediately follows an unlock
/// write of [`CCP_IOREG_KEY`] to the CCP register; an interrupt between
/// the two re-arms the protection, so the pair runs in a critical section.
/// Misuse (a stale unlock, a busy target) is a silent hardware-level
/// failure - there is nothing to report at this layer.
#[repr(transparent)]
pub struct Protected<T: Copy> {
    reg: Reg<T>,
}

impl<T: Copy> Protected<T> {
    /// Create a protected register cell holding `value` (see [`Reg::new`])
    pub const fn new(value: T) -> Self {
        Self { reg: Reg::new(value) }
    }

    /// Volatile load; reads are not protected
    #[inline]
    pub fn read(&self) -> T {
        self.reg.read()
    }

    /// Unlock-then-write pair, executed without an intervening interrupt
    pub fn write(&self, ccp: &Reg<u8>, value: T) {
        critical_section::with(|_| {
            ccp.write(CCP_IOREG_KEY);
            self.reg.write(value);
        });
    }
}

/// Reinterpret a fixed hardware address as a register block reference
///
/// # Safety
///
/// `addr` must be the base address of a live register block whose layout
/// matches `B`, valid for the whole program. This is the single audited
/// cast in the crate; everything downstream treats the result as an
/// ordinary reference.
pub unsafe fn block_at<B>(addr: usize) -> &'static B {
    unsafe { &*(addr as *const B) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write() {
        let reg = Reg::new(0u8);
        assert_eq!(reg.read(), 0);
        reg.write(0x5A);
        assert_eq!(reg.read(), 0x5A);
    }

    #[test]
    fn test_bitwise_ops() {
        let reg = Reg::new(0b0011_0000u8);
        reg.set_bits(0b0000_1100);
        assert_eq!(reg.read(), 0b0011_1100);
        reg.clear_bits(0b0011_0000);
        assert_eq!(reg.read(), 0b0000_1100);
        reg.toggle_bits(0b1111_0000);
        assert_eq!(reg.read(), 0b1111_1100);
    }

    #[test]
    fn test_modify() {
        let reg = Reg::new(10u8);
        reg.modify(|v| v + 5);
        assert_eq!(reg.read(), 15);
    }

    #[test]
    fn test_protected_write_unlocks_first() {
        let ccp = Reg::new(0u8);
        let reg = Protected::new(0u8);

        reg.write(&ccp, 0x42);

        // The unlock key reached the CCP register and the value landed
        assert_eq!(ccp.read(), CCP_IOREG_KEY);
        assert_eq!(reg.read(), 0x42);
    }
}
