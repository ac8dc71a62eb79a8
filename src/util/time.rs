//! This file implements the timing values and delay helpers used by the SIO0
//! driver.
//!
//! All waiting on the bus is blocking - the driver is handed a
//! [`DelayNs`] implementation and spins on it.  On hardware that is typically
//! `embassy_time::Delay` or a cycle-counting delay, and in tests it is
//! [`crate::test::SimDelay`], which just advances a simulated clock.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;

/// Block for a specific Duration, using the supplied delay.
///
/// Durations beyond `u32::MAX` microseconds are clamped - the bus never waits
/// anywhere near that long.
#[inline(always)]
pub fn block_for<D: DelayNs>(delay: &mut D, duration: Duration) {
    delay.delay_us(as_us(duration));
}

/// Convert a Duration into whole microseconds, saturating at `u32::MAX`.
#[inline(always)]
pub fn as_us(duration: Duration) -> u32 {
    u32::try_from(duration.as_micros()).unwrap_or(u32::MAX)
}

pub mod sio {
    //! SIO0 bus timers.  All are the values used by the console's own
    //! controller code.

    use embassy_time::Duration;

    /// Pause before asserting DTR, so back to back packets don't run into
    /// each other.
    pub const DTR_PRE_DELAY: Duration = Duration::from_micros(10);

    /// How long DTR is held before the address byte is sent, and again after
    /// the last byte before DTR is released.  Some devices need this long to
    /// get ready.
    pub const DTR_DELAY: Duration = Duration::from_micros(150);

    /// Pause after releasing DTR.
    pub const DTR_POST_DELAY: Duration = Duration::from_micros(10);

    /// How long to wait for a DSR pulse after each byte, before deciding the
    /// device isn't there or has nothing more to send.
    pub const DSR_TIMEOUT: Duration = Duration::from_micros(120);

    /// How often the interrupt flag is checked while waiting for a DSR pulse.
    pub const DSR_POLL_INTERVAL: Duration = Duration::from_micros(10);

    /// Gap between bytes when sending a packet without waiting for
    /// acknowledges.
    pub const BYTE_DELAY: Duration = Duration::from_micros(30);
}
