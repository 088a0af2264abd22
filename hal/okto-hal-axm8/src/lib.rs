//! AXM8 chip HAL
//!
//! Register-level hardware abstraction for the AXM8 8-bit microcontroller
//! family, implementing the [`okto_hal`] traits.
//!
//! # Layers
//!
//! - [`reg`] - typed volatile register cells, including the
//!   change-protected variant
//! - [`port`] - I/O port register blocks (full and virtual) and the
//!   move-only [`port::Pin`] handle
//! - [`gpio`] - ownership roles over a pin: input, pulled-up input,
//!   open-drain output, push-pull output
//! - [`routing`] - which physical pins a peripheral's signals are
//!   multiplexed onto
//! - [`spi`] - the synchronous serial master, driving either the dedicated
//!   SPI module or a USART in host-synchronous mode
//! - [`device`] - the fixed memory map and peripheral accessors
//!
//! All blocking operations busy-wait with no timeout; this HAL is
//! single-threaded and interrupt-naive by design. Exclusive use of a
//! peripheral and its pins rests on move-only ownership, not on runtime
//! locks.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod device;
pub mod gpio;
pub mod port;
pub mod reg;
pub mod routing;
pub mod spi;

// Re-export the trait crate so downstream code can name one dependency
pub use okto_hal as hal;

#[cfg(test)]
pub(crate) mod testutil {
    /// Leak a zero-initialized register block, standing in for a hardware
    /// address. Blocks are plain byte registers, so the all-zero image is
    /// valid, and leaking gives the `'static` lifetime real hardware has.
    pub fn fake_block<B>() -> &'static B {
        unsafe { &*std::boxed::Box::into_raw(std::boxed::Box::new(core::mem::zeroed::<B>())) }
    }
}
