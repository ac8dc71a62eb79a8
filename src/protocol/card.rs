//! This file implements the memory card commands: the game ID ping, used to
//! find cards that understand game IDs, and the game ID send.
//!
//! Both are extensions supported by some memory card replacements.  A stock
//! memory card doesn't recognise the ping, and gives up after the first byte.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use heapless::Vec;

use crate::constants::{GAME_ID_REQUEST_LEN, MAX_GAME_ID_LEN, PING_MARKERS, PING_PACKET_LEN};

use super::driver::{DriverError, PacketDriver};
use super::types::{DeviceAddress, DeviceCommand, Port, PortMask};

/// A game ID send request.
pub type GameIdRequest = Vec<u8, GAME_ID_REQUEST_LEN>;

/// Ping the memory card slot on `port`.
///
/// # Returns
/// - `Ok(())` - a card which understands game IDs is there.
/// - `Err(DriverError::NoDevice)` - nothing acknowledged the memory card
///   address.
/// - `Err(DriverError::Malformed)` - something answered, but not with
///   exactly 5 bytes carrying `0x27, 0xFF` at bytes 2 and 3.
pub fn probe_storage<T: PacketDriver>(driver: &mut T, port: Port) -> Result<(), DriverError> {
    let request: [u8; PING_PACKET_LEN] = [DeviceCommand::GameIdPing.into(), 0, 0, 0, 0];
    let mut response = [0u8; PING_PACKET_LEN];

    driver.select_port(port);
    let resp_len = driver.exchange_packet(DeviceAddress::MemoryCard, &request, &mut response);

    match resp_len {
        0 => Err(DriverError::NoDevice),
        PING_PACKET_LEN if response[2..4] == PING_MARKERS => {
            trace!("Game ID capable card on port {}", port);
            Ok(())
        }
        _ => {
            debug!(
                "Card on port {} doesn't support game IDs ({=usize} byte reply)",
                port, resp_len
            );
            Err(DriverError::Malformed)
        }
    }
}

/// Ping both memory card slots.
///
/// # Returns
/// The ports with a card which understands game IDs.  No card and a card
/// that doesn't understand the ping both leave the port's bit clear.
pub fn probe_storage_presence<T: PacketDriver>(driver: &mut T) -> PortMask {
    let mut present = PortMask::empty();
    for port in Port::ALL {
        if probe_storage(driver, port).is_ok() {
            present |= port.mask();
        }
    }
    present
}

/// Build a game ID send request: command, a reserved byte, the length of the
/// ID including its NUL terminator, then the ID and terminator.
///
/// Like a C string, the ID ends at the first NUL in `game_id`, if any.
///
/// # Returns
/// `Err(DriverError::Capacity)` if the ID is longer than
/// [`MAX_GAME_ID_LEN`] bytes.
pub fn game_id_request(game_id: &str) -> Result<GameIdRequest, DriverError> {
    let bytes = game_id.as_bytes();
    let id = match bytes.iter().position(|b| *b == 0) {
        Some(nul) => &bytes[..nul],
        None => bytes,
    };

    if id.len() > MAX_GAME_ID_LEN {
        warn!(
            "Game ID too long: {=usize} bytes, max {=usize}",
            id.len(),
            MAX_GAME_ID_LEN
        );
        return Err(DriverError::Capacity);
    }
    let length = u8::try_from(id.len() + 1).map_err(|_| DriverError::Capacity)?;

    let mut request = GameIdRequest::new();
    request
        .extend_from_slice(&[DeviceCommand::GameIdSend.into(), 0x00, length])
        .map_err(|_| DriverError::Capacity)?;
    request
        .extend_from_slice(id)
        .map_err(|_| DriverError::Capacity)?;
    request.push(0).map_err(|_| DriverError::Capacity)?;

    Ok(request)
}

/// Send `game_id` to the memory card slot on every port in `ports`.
///
/// This doesn't wait for acknowledges, so it can't tell whether a card heard
/// it.  Typically `ports` is the result of [`probe_storage_presence`].
///
/// # Returns
/// `Err(DriverError::Capacity)` if the ID doesn't fit, in which case nothing
/// is sent.
pub fn broadcast_identifier<T: PacketDriver>(
    driver: &mut T,
    game_id: &str,
    ports: PortMask,
) -> Result<(), DriverError> {
    let request = game_id_request(game_id)?;

    for port in ports.ports() {
        driver.select_port(port);
        driver.send_packet_no_acknowledge(DeviceAddress::MemoryCard, &request);
        debug!("Sent game ID to port {}", port);
    }

    Ok(())
}
