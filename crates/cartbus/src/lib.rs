//! Memory subsystem and execution driver for a handheld console.
//!
//! [`cartridge`] validates ROM images, [`mbc`] maps their banks into the
//! address space, [`machine`] decodes the rest of the 16-bit map, and
//! [`driver`] paces a CPU core and the peripherals against wall-clock time.

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod driver;
pub mod error;
pub mod machine;
pub mod mbc;

#[cfg(test)]
mod testing;

pub use bus::Bus;
pub use cartridge::{Cartridge, CartridgeMetadata, MbcKind};
pub use cpu::{Cpu, Interrupts};
pub use driver::{Driver, DriverConfig, FreezeHandle};
pub use error::{BusError, CartridgeError};
pub use machine::Machine;

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
