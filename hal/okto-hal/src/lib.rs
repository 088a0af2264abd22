//! Okto Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits and configuration value
//! types that are implemented by chip-specific HALs (AXM8 today, siblings
//! later). Device drivers written against these traits run unchanged on
//! any implementing chip.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Device drivers, firmware         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │      okto-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │       okto-hal-axm8 (registers)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`spi::SpiExchange`] - Blocking full-duplex synchronous serial

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin, PinState};
pub use spi::{SpiConfig, SpiExchange};
