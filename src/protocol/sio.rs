//! This file implements the SIO0 bus driver - transceiver setup, port
//! selection, the DSR acknowledge handshake and the packet exchange that all
//! commands ride on.
//!
//! A packet goes like this:
//! - DTR is asserted, and held long enough for slow devices to wake up.
//! - The address byte is sent.  If nothing pulses DSR within the timeout,
//!   nothing with that address is on the selected port, and we're done.
//! - Otherwise request bytes are sent, padded with zeroes, while the reply
//!   is clocked in simultaneously.  The device pulses DSR after each byte
//!   for as long as it has more to send.
//! - DTR is released.
//!
//! Every wait on DSR is bounded, so a packet to an empty port costs a fixed,
//! small amount of time.  The waits inside [`SioBus::exchange_byte`] are not
//! bounded - they are only reached once a device has acknowledged, and the
//! transceiver always completes a byte in a few tens of microseconds.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use embedded_hal::delay::DelayNs;

use crate::infra::config::BusConfig;
use crate::infra::regs::{Control, Mode, SioRegisters, Status};
use crate::util::time::{as_us, block_for};

use super::driver::PacketDriver;
use super::types::{DeviceAddress, Port};

/// The SIO0 bus.
///
/// Owns the register capability and the delay, so there is exactly one
/// thing driving the bus.  Methods take `&mut self`, so packets can't
/// overlap.
pub struct SioBus<R, D> {
    regs: R,
    delay: D,
    config: BusConfig,
}

impl<R, D> SioBus<R, D>
where
    R: SioRegisters,
    D: DelayNs,
{
    /// Create a new bus.  [`SioBus::initialize`] must be called before any
    /// packets are sent.
    pub fn new(regs: R, delay: D, config: BusConfig) -> Self {
        Self {
            regs,
            delay,
            config,
        }
    }

    /// Reset the transceiver, and configure it the way controllers and memory
    /// cards expect: 8 data bits at the configured baud rate, with DSR pulses
    /// forwarded to the interrupt controller.
    ///
    /// Safe to call more than once.
    pub fn initialize(&mut self) {
        let divisor = self.config.baud_divisor();

        self.regs.write_ctrl(Control::RESET);
        self.regs.write_mode(Mode::BAUD_DIV1 | Mode::DATA_8);
        self.regs.write_baud(divisor);
        self.regs
            .write_ctrl(Control::TX_ENABLE | Control::RX_ENABLE | Control::DSR_IRQ_ENABLE);

        info!(
            "SIO0 initialized: {=u32} baud, divisor {=u16}",
            self.config.baud_rate, divisor
        );
    }

    /// Route DTR to the given port.  The data lines are shared, so this only
    /// decides which port's devices will listen to the next packet.  It
    /// doesn't assert DTR itself.
    pub fn select_port(&mut self, port: Port) {
        self.regs.modify_ctrl(|ctrl| match port {
            Port::One => ctrl - Control::CS_PORT_2,
            Port::Two => ctrl | Control::CS_PORT_2,
        });
    }

    /// Wait up to `timeout_us` for a DSR pulse.
    ///
    /// The interrupt flag is checked every poll interval.  On seeing it, both
    /// the interrupt controller's flag and the transceiver's latch are
    /// cleared, so the next pulse can be detected, and true is returned
    /// straight away.  Returns false once the budget is used up - never
    /// later than one poll interval after `timeout_us`.
    pub fn wait_for_acknowledge(&mut self, timeout_us: u32) -> bool {
        let step = as_us(self.config.ack_poll_interval).max(1);
        let mut remaining = timeout_us;

        while remaining > 0 {
            if self.regs.ack_irq_pending() {
                self.regs.clear_ack_irq();
                self.regs.modify_ctrl(|ctrl| ctrl | Control::ACKNOWLEDGE);
                return true;
            }

            self.delay.delay_us(step);
            remaining = remaining.saturating_sub(step);
        }

        false
    }

    /// Send a byte and return the byte clocked in at the same time.
    ///
    /// Only call this once a device has acknowledged - it spins until the
    /// transceiver has room to send, and again until a byte has arrived.
    pub fn exchange_byte(&mut self, value: u8) -> u8 {
        while !self.regs.status().contains(Status::TX_NOT_FULL) {
            core::hint::spin_loop();
        }

        self.regs.write_data(value);

        while !self.regs.status().contains(Status::RX_NOT_EMPTY) {
            core::hint::spin_loop();
        }

        self.regs.read_data()
    }

    /// Send `address` followed by `request`, collecting up to
    /// `response.len()` reply bytes.
    ///
    /// Once `request` runs out, zeroes are sent.  The exchange stops when
    /// the response buffer is full, or when the device stops pulsing DSR -
    /// whichever happens first.
    ///
    /// # Returns
    /// The number of reply bytes stored.  0 means nothing on the selected
    /// port answered to `address`, which isn't an error.
    pub fn exchange_packet(
        &mut self,
        address: DeviceAddress,
        request: &[u8],
        response: &mut [u8],
    ) -> usize {
        let timeout = as_us(self.config.ack_timeout);

        self.assert_attention();

        // The address isn't sent via exchange_byte() - if nothing is there,
        // nothing answers, and the byte clocked in is dropped by the flush
        // below next time something does answer.
        self.regs.write_data(address.into());

        let mut resp_len = 0;
        if self.wait_for_acknowledge(timeout) {
            self.flush_rx();

            let mut request = request.iter().copied();
            for slot in response.iter_mut() {
                *slot = self.exchange_byte(request.next().unwrap_or(0));
                resp_len += 1;

                // The device keeps pulsing DSR for as long as it has more to
                // send.
                if !self.wait_for_acknowledge(timeout) {
                    break;
                }
            }

            trace!("Packet to {}: {=usize} bytes exchanged", address, resp_len);
        } else {
            debug!("No acknowledge for address {}", address);
        }

        self.release_attention();
        block_for(&mut self.delay, self.config.post_delay);

        resp_len
    }

    /// Send `address` followed by all of `request`, without checking for
    /// acknowledges.  Bytes are paced by the configured byte delay instead.
    ///
    /// Used for one way packets, where the device either has nothing to say,
    /// or we don't care whether it heard.
    pub fn send_packet_no_acknowledge(&mut self, address: DeviceAddress, request: &[u8]) {
        self.regs.clear_ack_irq();
        self.regs
            .modify_ctrl(|ctrl| ctrl | Control::DTR | Control::ACKNOWLEDGE);
        block_for(&mut self.delay, self.config.attention_delay);

        self.regs.write_data(address.into());
        block_for(&mut self.delay, self.config.byte_delay);
        self.flush_rx();

        for byte in request {
            self.exchange_byte(*byte);
            block_for(&mut self.delay, self.config.byte_delay);
        }

        trace!(
            "Packet to {} sent without acknowledge: {=usize} bytes",
            address,
            request.len()
        );

        self.release_attention();
    }

    /// Access the register capability.
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Mutable access to the register capability.
    pub fn regs_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// The configuration this bus was created with.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Give back the register capability and the delay.
    pub fn release(self) -> (R, D) {
        (self.regs, self.delay)
    }

    // Clear any stale interrupt and assert DTR, then give the device time to
    // get ready.
    fn assert_attention(&mut self) {
        block_for(&mut self.delay, self.config.pre_delay);
        self.regs.clear_ack_irq();
        self.regs
            .modify_ctrl(|ctrl| ctrl | Control::DTR | Control::ACKNOWLEDGE);
        block_for(&mut self.delay, self.config.attention_delay);
    }

    // Hold DTR for a while after the last byte, then release it, allowing the
    // device to go idle.
    fn release_attention(&mut self) {
        block_for(&mut self.delay, self.config.attention_delay);
        self.regs.modify_ctrl(|ctrl| ctrl - Control::DTR);
    }

    // Drop anything left over in the RX FIFO.
    fn flush_rx(&mut self) {
        while self.regs.status().contains(Status::RX_NOT_EMPTY) {
            let _ = self.regs.read_data();
        }
    }
}

impl<R, D> PacketDriver for SioBus<R, D>
where
    R: SioRegisters,
    D: DelayNs,
{
    fn select_port(&mut self, port: Port) {
        SioBus::select_port(self, port);
    }

    fn exchange_packet(
        &mut self,
        address: DeviceAddress,
        request: &[u8],
        response: &mut [u8],
    ) -> usize {
        SioBus::exchange_packet(self, address, request, response)
    }

    fn send_packet_no_acknowledge(&mut self, address: DeviceAddress, request: &[u8]) {
        SioBus::send_packet_no_acknowledge(self, address, request);
    }
}
