//! This file holds the bus configuration - the clock the baud rate is derived
//! from, and the timings used by the packet exchanger.
//!
//! The defaults are the values the console itself uses, and there should be
//! little reason to change them other than to experiment with slow or
//! marginal devices.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use embassy_time::Duration;

use crate::constants::{BUS_BAUD_RATE, SYSTEM_CLOCK_HZ};
use crate::util::time::sio::{
    BYTE_DELAY, DSR_POLL_INTERVAL, DSR_TIMEOUT, DTR_DELAY, DTR_POST_DELAY, DTR_PRE_DELAY,
};

/// Bus configurations for different systems
pub mod presets {
    use super::BusConfig;

    /// Configuration for a stock console: 33.8688MHz system clock, 250kbit/s
    /// bus.
    pub fn ps1() -> BusConfig {
        BusConfig::default()
    }

    /// As [`ps1()`], but with a longer acknowledge timeout, for devices which
    /// are slow to pulse DSR.
    pub fn ps1_relaxed() -> BusConfig {
        BusConfig {
            ack_timeout: embassy_time::Duration::from_micros(240),
            ..BusConfig::default()
        }
    }
}

/// SIO0 bus configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Clock the baud rate divisor is derived from.
    pub system_clock_hz: u32,

    /// Bus bit rate.
    pub baud_rate: u32,

    /// Pause before DTR is asserted.
    pub pre_delay: Duration,

    /// DTR hold time before the address byte, and after the last byte.
    pub attention_delay: Duration,

    /// Pause after DTR is released.
    pub post_delay: Duration,

    /// How long to wait for each DSR pulse.
    pub ack_timeout: Duration,

    /// How often to check for a DSR pulse while waiting.
    pub ack_poll_interval: Duration,

    /// Gap between bytes of a packet sent without acknowledges.
    pub byte_delay: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            system_clock_hz: SYSTEM_CLOCK_HZ,
            baud_rate: BUS_BAUD_RATE,
            pre_delay: DTR_PRE_DELAY,
            attention_delay: DTR_DELAY,
            post_delay: DTR_POST_DELAY,
            ack_timeout: DSR_TIMEOUT,
            ack_poll_interval: DSR_POLL_INTERVAL,
            byte_delay: BYTE_DELAY,
        }
    }
}

impl BusConfig {
    /// The baud rate reload value to program.  Clamped to what the 16 bit
    /// register can hold, and never zero.
    pub fn baud_divisor(&self) -> u16 {
        let divisor = self.system_clock_hz / self.baud_rate.max(1);
        u16::try_from(divisor).unwrap_or(u16::MAX).max(1)
    }
}
