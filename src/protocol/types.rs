//! This module contains the general types used on the SIO0 bus: device
//! addresses, command codes and ports.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use bitflags::bitflags;

use crate::constants::NUM_PORTS;

use super::driver::DriverError;

/// The first byte of every packet.  As controllers and memory cards share the
/// bus, this picks which class of device should respond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DeviceAddress {
    /// Pads, mice, light guns etc.
    Controller = 0x01,

    /// Memory cards, and memory card-like devices.
    MemoryCard = 0x81,
}

impl From<DeviceAddress> for u8 {
    fn from(address: DeviceAddress) -> Self {
        address as u8
    }
}

/// The byte following the address.  Only [`DeviceCommand::Poll`],
/// [`DeviceCommand::GameIdPing`] and [`DeviceCommand::GameIdSend`] are issued
/// by this crate - the others are listed for anyone building their own
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DeviceCommand {
    /// Initialize DualShock pressure sensors (config mode)
    InitPressure = b'@',
    /// Read controller state
    Poll = b'B',
    /// Enter or exit configuration mode
    ConfigMode = b'C',
    /// Set analog mode/LED state (config mode)
    SetAnalog = b'D',
    /// Get analog mode/LED state (config mode)
    GetAnalog = b'E',
    /// Get information about a motor (config mode)
    GetMotorInfo = b'F',
    /// Get list of all motors (config mode)
    GetMotorList = b'G',
    /// Get current state of vibration motors (config mode)
    GetMotorState = b'H',
    /// Get list of all supported modes (config mode)
    GetMode = b'L',
    /// Configure poll request format (config mode)
    RequestConfig = b'M',
    /// Configure poll response format (config mode)
    ResponseConfig = b'O',
    /// Read a 128 byte memory card sector
    CardRead = b'R',
    /// Retrieve memory card size information
    CardIdentify = b'S',
    /// Write a 128 byte memory card sector
    CardWrite = b'W',
    /// Ask whether a card understands game IDs
    GameIdPing = 0x20,
    /// Send the running game's ID to a card
    GameIdSend = 0x21,
}

impl From<DeviceCommand> for u8 {
    fn from(command: DeviceCommand) -> Self {
        command as u8
    }
}

/// One of the two physical controller/memory card connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    One = 0,
    Two = 1,
}

impl Port {
    /// Both ports, in bus order.
    pub const ALL: [Port; NUM_PORTS] = [Port::One, Port::Two];

    /// Zero based index of this port.
    pub fn index(self) -> usize {
        self as usize
    }

    /// This port's bit in a [`PortMask`].
    pub fn mask(self) -> PortMask {
        match self {
            Port::One => PortMask::PORT1,
            Port::Two => PortMask::PORT2,
        }
    }
}

impl TryFrom<u8> for Port {
    type Error = DriverError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Port::One),
            1 => Ok(Port::Two),
            _ => Err(DriverError::InvalidPort),
        }
    }
}

bitflags! {
    /// A set of ports - bit N is port index N.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PortMask: u8 {
        const PORT1 = 0b01;
        const PORT2 = 0b10;
    }
}

// Implement defmt::Format manually for PortMask
#[cfg(feature = "defmt")]
impl defmt::Format for PortMask {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PortMask({=u8:#04b})", self.bits());
    }
}

impl PortMask {
    /// Whether `port`'s bit is set.
    pub fn has(self, port: Port) -> bool {
        self.contains(port.mask())
    }

    /// The ports in this mask, in bus order.
    pub fn ports(self) -> impl Iterator<Item = Port> {
        Port::ALL.into_iter().filter(move |port| self.has(*port))
    }
}
