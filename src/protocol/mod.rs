//! This module implements the SIO0 protocol: the [`SioBus`] packet
//! exchanger, and the pad and memory card commands built on it.
//!
//! The commands are free functions generic over [`PacketDriver`], so they
//! run against anything that can exchange packets - normally a [`SioBus`].
//!
//! ```ignore
//! let mut bus = SioBus::new(regs, delay, BusConfig::default());
//! bus.initialize();
//!
//! let cards = probe_storage_presence(&mut bus);
//! broadcast_identifier(&mut bus, "SLUS_000.01", cards)?;
//!
//! loop {
//!     let buttons = poll_buttons(&mut bus, Port::One);
//!     // ...
//! }
//! ```

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

mod card;
mod driver;
mod pad;
mod sio;
mod types;

pub use card::{
    GameIdRequest, broadcast_identifier, game_id_request, probe_storage, probe_storage_presence,
};
pub use driver::{DriverError, PacketDriver};
pub use pad::{Buttons, PadState, poll_buttons, read_pad};
pub use sio::SioBus;
pub use types::{DeviceAddress, DeviceCommand, Port, PortMask};
