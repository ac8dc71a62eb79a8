//! This module contains the wire-level constants for the SIO0 bus: clock and
//! baud rate, buffer sizes and the marker bytes that identify a device's
//! reply.
//!
//! Timing constants live in [`crate::util::time`].

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use static_assertions::const_assert;

//
// Transceiver configuration
//

/// System clock the SIO0 baud rate divisor is derived from.
pub const SYSTEM_CLOCK_HZ: u32 = 33_868_800;

/// Controllers and memory cards all run at 250kbit/s.
pub const BUS_BAUD_RATE: u32 = 250_000;

/// Interrupt status bit the transceiver raises on a DSR pulse.  Only read by
/// [`crate::infra::SioRegisters`] implementations, which live outside this
/// crate.
#[allow(dead_code)]
pub const IRQ_SIO0: u32 = 7;

//
// Request and response buffer sizes
//

/// Length of a pad poll request: command, multitap address and two rumble
/// bytes.
pub const POLL_REQUEST_LEN: usize = 4;

/// Capacity of the pad poll response buffer.  No pad replies with more than
/// this.
pub const POLL_RESPONSE_LEN: usize = 32;

/// All pads reply with at least this many bytes.
pub const POLL_MIN_RESPONSE_LEN: usize = 4;

/// Analog pads append 4 axis bytes after the button bytes.
pub const POLL_ANALOG_RESPONSE_LEN: usize = 8;

/// Length of the game ID ping request, and of its expected reply.
pub const PING_PACKET_LEN: usize = 5;

/// Capacity of the game ID send request.
pub const GAME_ID_REQUEST_LEN: usize = 64;

/// Command, reserved byte and length byte precede the game ID.
pub const GAME_ID_HEADER_LEN: usize = 3;

/// Longest game ID that fits, once the header and NUL terminator are added.
pub const MAX_GAME_ID_LEN: usize = GAME_ID_REQUEST_LEN - GAME_ID_HEADER_LEN - 1;

const_assert!(POLL_MIN_RESPONSE_LEN <= POLL_RESPONSE_LEN);
const_assert!(POLL_ANALOG_RESPONSE_LEN <= POLL_RESPONSE_LEN);
const_assert!(POLL_REQUEST_LEN <= POLL_RESPONSE_LEN);
const_assert!(MAX_GAME_ID_LEN + GAME_ID_HEADER_LEN + 1 == GAME_ID_REQUEST_LEN);
// The length byte must be able to hold the ID plus its terminator.
const_assert!(MAX_GAME_ID_LEN < u8::MAX as usize);

//
// Reply markers
//

/// Byte 1 of every pad's poll reply.
pub const PAD_MARKER: u8 = 0x5A;

/// Bytes 2 and 3 of a game ID ping reply, from cards which support game IDs.
pub const PING_MARKERS: [u8; 2] = [0x27, 0xFF];

/// Number of ports on the bus.
pub const NUM_PORTS: usize = 2;
