//! This file defines the PacketDriver trait, which the pad and memory card
//! commands are written against, and the errors they can report.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use core::fmt;

use super::types::{DeviceAddress, Port};

/// Defines errors for the bus commands.
///
/// None of these are fatal.  The plain commands ([`super::poll_buttons`],
/// [`super::probe_storage_presence`]) fold them into a safe default, and the
/// `read_`/`probe_` variants hand them back for callers who want to know
/// why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// No device acknowledged the address byte
    NoDevice,
    /// A device answered, but its reply was too short or carried the wrong
    /// marker bytes
    Malformed,
    /// The request doesn't fit in its buffer
    Capacity,
    /// Port index other than 0 or 1
    InvalidPort,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NoDevice => write!(f, "no device acknowledged"),
            DriverError::Malformed => write!(f, "unexpected reply from device"),
            DriverError::Capacity => write!(f, "request too large"),
            DriverError::InvalidPort => write!(f, "invalid port"),
        }
    }
}

/// Defines the interface the bus commands need from the transport.
///
/// [`super::SioBus`] is the real implementation.  It is a trait so that the
/// commands can be exercised against canned replies.
pub trait PacketDriver {
    /// Route DTR to `port` for the following packets.
    fn select_port(&mut self, port: Port);

    /// Send `address` followed by `request`, collecting the reply into
    /// `response`.
    ///
    /// # Returns
    /// The number of bytes exchanged after the address - 0 if nothing
    /// acknowledged the address, and never more than `response.len()`.
    fn exchange_packet(
        &mut self,
        address: DeviceAddress,
        request: &[u8],
        response: &mut [u8],
    ) -> usize;

    /// Send `address` followed by `request`, without waiting for any
    /// acknowledge.
    fn send_packet_no_acknowledge(&mut self, address: DeviceAddress, request: &[u8]);
}
