//! sio0-rs
//!
//! This implements a driver for the SIO0 serial bus that PlayStation-style
//! consoles use to talk to controllers and memory cards.
//!
//! The bus is shared: both ports see the same data lines, a port select bit
//! picks which connector's DTR line is driven, and the first byte of every
//! packet addresses a device class.  Devices acknowledge each byte with a
//! pulse on DSR, which the transceiver forwards to the interrupt controller,
//! and that pulse is the only way to know a device is there at all.
//!
//! The crate is split into:
//! - [`infra`] - the register layout, the [`infra::SioRegisters`] capability
//!   the driver is handed, and bus configuration.
//! - [`protocol`] - the [`protocol::SioBus`] packet exchanger, and the pad
//!   and memory card commands built on top of it.
//! - [`catalog`] - the file list kept for names found on storage devices.
//! - [`test`] - a simulated transceiver and emulated devices, used by the
//!   tests and usable by anyone driving the bus without hardware.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#![cfg_attr(not(test), no_std)]

// Declare all of this library's modules.  fmt must come first, so its
// logging macros are in scope in the others.
#[macro_use]
mod fmt;

pub mod catalog;
pub mod constants;
pub mod infra;
pub mod protocol;
pub mod test;
pub mod util;

pub use catalog::{CatalogError, FileEntry, FileList};
pub use infra::config::BusConfig;
pub use infra::regs::SioRegisters;
pub use protocol::{
    Buttons, DeviceAddress, DeviceCommand, DriverError, PacketDriver, PadState, Port, PortMask,
    SioBus,
};
