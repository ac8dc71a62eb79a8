//! This file implements the controller poll command.
//!
//! A poll request is the `B` command, a multitap address and two rumble
//! bytes.  Every pad replies with its type byte, `0x5A`, and two bytes of
//! button state.  Analog pads carry on with four axis bytes.
//!
//! The button bits on the wire are active low - a zero is a pressed button -
//! so they are inverted before being handed out.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use bitflags::bitflags;

use crate::constants::{
    PAD_MARKER, POLL_ANALOG_RESPONSE_LEN, POLL_MIN_RESPONSE_LEN, POLL_REQUEST_LEN,
    POLL_RESPONSE_LEN,
};

use super::driver::{DriverError, PacketDriver};
use super::types::{DeviceAddress, DeviceCommand, Port};

bitflags! {
    /// Pressed buttons.  A set bit is a pressed button.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u16 {
        const SELECT = 1 << 0;
        const L3 = 1 << 1;
        const R3 = 1 << 2;
        const START = 1 << 3;
        const UP = 1 << 4;
        const RIGHT = 1 << 5;
        const DOWN = 1 << 6;
        const LEFT = 1 << 7;
        const L2 = 1 << 8;
        const R2 = 1 << 9;
        const L1 = 1 << 10;
        const R1 = 1 << 11;
        const TRIANGLE = 1 << 12;
        const CIRCLE = 1 << 13;
        const CROSS = 1 << 14;
        const SQUARE = 1 << 15;
    }
}

// Implement defmt::Format manually for Buttons
#[cfg(feature = "defmt")]
impl defmt::Format for Buttons {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Buttons({=u16:#06x})", self.bits());
    }
}

impl Buttons {
    /// Decode the two active low button bytes of a poll reply.
    pub fn from_wire(lo: u8, hi: u8) -> Self {
        Self::from_bits_retain(u16::from_le_bytes([lo, hi]) ^ 0xFFFF)
    }

    /// Encode as the two active low bytes a pad sends.
    pub fn to_wire(self) -> [u8; 2] {
        (self.bits() ^ 0xFFFF).to_le_bytes()
    }
}

/// Everything a poll reply tells us about a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadState {
    /// Reply byte 0.  The high nibble is the controller type (4 digital, 7
    /// analog), the low nibble the number of 16 bit words that follow.
    pub kind: u8,

    /// Pressed buttons.
    pub buttons: Buttons,

    /// Right X, right Y, left X and left Y, for pads which send them.
    pub analog: Option<[u8; 4]>,
}

/// Poll the pad on `port`, reporting why when there's no usable reply.
///
/// # Returns
/// - `Err(DriverError::NoDevice)` - nothing acknowledged the controller
///   address.
/// - `Err(DriverError::Malformed)` - fewer than 4 bytes came back, or byte 1
///   wasn't `0x5A`.
pub fn read_pad<T: PacketDriver>(driver: &mut T, port: Port) -> Result<PadState, DriverError> {
    let request: [u8; POLL_REQUEST_LEN] = [
        DeviceCommand::Poll.into(),
        0x00, // Multitap address
        0x00, // Rumble motor control 1
        0x00, // Rumble motor control 2
    ];
    let mut response = [0u8; POLL_RESPONSE_LEN];

    // This is relatively slow, and is best done once per frame.
    driver.select_port(port);
    let resp_len = driver.exchange_packet(DeviceAddress::Controller, &request, &mut response);
    let reply = &response[..resp_len];

    if reply.is_empty() {
        trace!("No pad on port {}", port);
        return Err(DriverError::NoDevice);
    }
    if reply.len() < POLL_MIN_RESPONSE_LEN || reply[1] != PAD_MARKER {
        debug!(
            "Unexpected poll reply on port {}: {=usize} bytes",
            port,
            reply.len()
        );
        return Err(DriverError::Malformed);
    }

    let analog = if reply.len() >= POLL_ANALOG_RESPONSE_LEN {
        Some([reply[4], reply[5], reply[6], reply[7]])
    } else {
        None
    };

    Ok(PadState {
        kind: reply[0],
        buttons: Buttons::from_wire(reply[2], reply[3]),
        analog,
    })
}

/// Poll the pad on `port` for its buttons.
///
/// No pad, the wrong kind of device and a garbled reply all come back as no
/// buttons pressed.
pub fn poll_buttons<T: PacketDriver>(driver: &mut T, port: Port) -> Buttons {
    read_pad(driver, port)
        .map(|state| state.buttons)
        .unwrap_or(Buttons::empty())
}
