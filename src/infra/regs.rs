//! This file defines the SIO0 register layout, and the [`SioRegisters`]
//! trait through which the driver reaches the hardware.
//!
//! The driver never touches memory mapped registers itself.  Whoever creates
//! the [`crate::protocol::SioBus`] hands it something implementing
//! [`SioRegisters`] - on a console, volatile accesses to the SIO0 block and
//! the interrupt status register; in tests, [`crate::test::SimSio`].

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use bitflags::bitflags;

// The full register layouts are listed, though the driver only uses some of
// each.
bitflags! {
    /// SIO0 control register.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control: u16 {
        /// Allow the transceiver to start sending.
        const TX_ENABLE = 1 << 0;
        /// Assert DTR on the selected port - the per-packet attention line.
        const DTR = 1 << 1;
        /// Receive even when DTR isn't asserted.
        const RX_ENABLE = 1 << 2;
        /// Write 1 to acknowledge the interrupt, so the next DSR pulse
        /// raises it again.
        const ACKNOWLEDGE = 1 << 4;
        /// Reset the transceiver.
        const RESET = 1 << 6;
        /// Forward DSR pulses to the interrupt controller.
        const DSR_IRQ_ENABLE = 1 << 12;
        /// Route DTR to port 2 instead of port 1.
        const CS_PORT_2 = 1 << 13;
    }
}

bitflags! {
    /// SIO0 mode register.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Mode: u16 {
        /// Baud rate reload factor of 1.
        const BAUD_DIV1 = 1 << 0;
        /// Baud rate reload factor of 16.
        const BAUD_DIV16 = 2 << 0;
        /// 8 bit characters.
        const DATA_8 = 3 << 2;
    }
}

bitflags! {
    /// SIO0 status register.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u32 {
        /// There is space in the TX FIFO.
        const TX_NOT_FULL = 1 << 0;
        /// There is at least one byte in the RX FIFO.
        const RX_NOT_EMPTY = 1 << 1;
        /// Nothing left to send.
        const TX_IDLE = 1 << 2;
        /// Current level of the DSR input.
        const DSR = 1 << 7;
        /// Interrupt requested.
        const IRQ = 1 << 9;
    }
}

// Implement defmt::Format manually for the register types.
#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Control({=u16:#06x})", self.bits());
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Mode {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Mode({=u16:#06x})", self.bits());
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status({=u32:#06x})", self.bits());
    }
}

/// Access to the SIO0 registers, and the interrupt status bit it drives.
///
/// Implementations are expected to be thin - a single register access per
/// method.  All protocol logic lives in the driver.
pub trait SioRegisters {
    /// Read the control register.
    fn read_ctrl(&mut self) -> Control;

    /// Write the control register.
    fn write_ctrl(&mut self, ctrl: Control);

    /// Write the mode register.
    fn write_mode(&mut self, mode: Mode);

    /// Write the baud rate reload value.
    fn write_baud(&mut self, divisor: u16);

    /// Read the status register.
    fn status(&mut self) -> Status;

    /// Pop a received byte.
    fn read_data(&mut self) -> u8;

    /// Queue a byte for transmission.
    fn write_data(&mut self, value: u8);

    /// Whether the SIO0 bit ([`crate::constants::IRQ_SIO0`]) in the
    /// interrupt status register is set - i.e. a DSR pulse has been seen
    /// since it was last cleared.
    fn ack_irq_pending(&mut self) -> bool;

    /// Clear the SIO0 bit in the interrupt status register.
    fn clear_ack_irq(&mut self);

    /// Read-modify-write the control register.
    #[inline(always)]
    fn modify_ctrl<F>(&mut self, f: F)
    where
        F: FnOnce(Control) -> Control,
    {
        let ctrl = self.read_ctrl();
        self.write_ctrl(f(ctrl));
    }
}
