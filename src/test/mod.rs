//! Simulation objects for exercising sio0-rs without hardware.
//!
//! - [`SimSio`] implements [`SioRegisters`] as a transceiver with two ports,
//!   each of which may have an emulated [`device::Device`] plugged in.  It
//!   logs every DTR edge and every byte clocked, so tests can check exactly
//!   what went over the wire.
//! - [`SimDelay`] implements [`DelayNs`] by advancing a simulated clock,
//!   shared with the [`SimSio`], so waits cost no real time and are exactly
//!   measurable.
//!
//! DSR pulses behave like the real thing: a pulse only raises the interrupt
//! if DSR interrupts are enabled and the transceiver's latch has been
//! re-armed (by writing [`Control::ACKNOWLEDGE`]) since the last one.  A
//! driver that forgets to re-arm it misses every pulse after the first.
//!
//! A pulse is latched at the first register access after it comes due, even
//! if DTR has been released by then.  So a device that answers too late
//! leaves the interrupt flag set, and a driver that doesn't clear it before
//! the next packet sees a phantom acknowledge.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html


use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use heapless::{Deque, Vec};

use crate::constants::NUM_PORTS;
use crate::infra::regs::{Control, Mode, SioRegisters, Status};
use crate::protocol::Port;
use device::Device;

/// Number of events the [`SimSio`] log holds.  Once full, later events are
/// dropped.
pub const EVENT_LOG_LEN: usize = 1024;

/// A [`DelayNs`] that advances a simulated clock, in nanoseconds.
pub struct SimDelay<'a> {
    clock: &'a Cell<u64>,
    start: u64,
}

impl<'a> SimDelay<'a> {
    pub fn new(clock: &'a Cell<u64>) -> Self {
        Self {
            clock,
            start: clock.get(),
        }
    }

    /// Simulated microseconds since this delay was created.
    pub fn elapsed_us(&self) -> u64 {
        (self.clock.get() - self.start) / 1000
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.set(self.clock.get() + u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.set(self.clock.get() + u64::from(us) * 1000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.set(self.clock.get() + u64::from(ms) * 1_000_000);
    }
}

/// Something that happened on the simulated bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The transceiver was reset.
    Reset,

    /// DTR was asserted or released on a port.
    Attention { port: Port, asserted: bool },

    /// A byte was clocked out and another clocked in.
    Byte { port: Port, sent: u8, received: u8 },
}

// Where the current packet is up to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Idle,
    Address,
    Talking { index: usize },
    Ignored,
}

/// A simulated SIO0 transceiver, with two ports.
pub struct SimSio<'a> {
    clock: &'a Cell<u64>,
    ctrl: Control,
    mode: Mode,
    baud: u16,
    rx: Deque<u8, 8>,
    irq: bool,
    latched: bool,
    pulse_at: Option<u64>,
    ack_latency_ns: u64,
    session: Session,
    devices: [Option<Device>; NUM_PORTS],
    events: Vec<Event, EVENT_LOG_LEN>,
    ack_checks: usize,
}

impl<'a> SimSio<'a> {
    /// A transceiver with nothing plugged in, sharing `clock` with a
    /// [`SimDelay`].
    pub fn new(clock: &'a Cell<u64>) -> Self {
        Self {
            clock,
            ctrl: Control::empty(),
            mode: Mode::empty(),
            baud: 0,
            rx: Deque::new(),
            irq: false,
            latched: false,
            pulse_at: None,
            ack_latency_ns: 0,
            session: Session::Idle,
            devices: [None, None],
            events: Vec::new(),
            ack_checks: 0,
        }
    }

    /// Plug `device` into `port`.
    pub fn with_device(mut self, port: Port, device: Device) -> Self {
        self.devices[port.index()] = Some(device);
        self
    }

    /// Plug `device` into, or unplug whatever is in, `port`.
    pub fn set_device(&mut self, port: Port, device: Option<Device>) {
        self.devices[port.index()] = device;
    }

    pub fn device(&self, port: Port) -> Option<&Device> {
        self.devices[port.index()].as_ref()
    }

    pub fn device_mut(&mut self, port: Port) -> Option<&mut Device> {
        self.devices[port.index()].as_mut()
    }

    /// How long after a byte devices take to pulse DSR.
    pub fn set_ack_latency_us(&mut self, us: u32) {
        self.ack_latency_ns = u64::from(us) * 1000;
    }

    /// Everything logged so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Forget everything logged so far.
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.ack_checks = 0;
    }

    /// Every byte sent on `port` while DTR was asserted, address bytes
    /// included.
    pub fn sent(&self, port: Port) -> Vec<u8, EVENT_LOG_LEN> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Byte { port: p, sent, .. } if *p == port => Some(*sent),
                _ => None,
            })
            .collect()
    }

    /// How many times DTR was asserted (or, with `asserted` false, released)
    /// on `port`.
    pub fn attention_edges(&self, port: Port, asserted: bool) -> usize {
        self.events
            .iter()
            .filter(|event| **event == Event::Attention { port, asserted })
            .count()
    }

    /// Whether DTR is currently asserted.
    pub fn attention_asserted(&self) -> bool {
        self.ctrl.contains(Control::DTR)
    }

    /// How many times the interrupt flag has been checked.
    pub fn ack_checks(&self) -> usize {
        self.ack_checks
    }

    /// Current control register value.
    pub fn ctrl(&self) -> Control {
        self.ctrl
    }

    /// Current mode register value.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current baud rate reload value.
    pub fn baud(&self) -> u16 {
        self.baud
    }

    fn now(&self) -> u64 {
        self.clock.get()
    }

    fn port(&self) -> Port {
        if self.ctrl.contains(Control::CS_PORT_2) {
            Port::Two
        } else {
            Port::One
        }
    }

    fn log(&mut self, event: Event) {
        let _ = self.events.push(event);
    }

    fn reset(&mut self) {
        self.ctrl = Control::empty();
        self.rx.clear();
        self.irq = false;
        self.latched = false;
        self.pulse_at = None;
        self.session = Session::Idle;
        self.log(Event::Reset);
    }

    fn schedule_pulse(&mut self) {
        self.pulse_at = Some(self.now() + self.ack_latency_ns);
    }

    // Raise the interrupt if a scheduled pulse is due, and the latch allows.
    fn deliver_pulse(&mut self) {
        let Some(at) = self.pulse_at else {
            return;
        };
        if self.now() < at {
            return;
        }

        self.pulse_at = None;
        if self.ctrl.contains(Control::DSR_IRQ_ENABLE) && !self.latched {
            self.latched = true;
            self.irq = true;
        }
    }

    // Work out what comes back for `value`, moving the packet along.
    fn clock_byte(&mut self, port: Port, value: u8) -> u8 {
        if !self.ctrl.contains(Control::DTR) {
            return 0xFF;
        }

        let slot = &mut self.devices[port.index()];
        match self.session {
            Session::Address => match slot {
                Some(device) if u8::from(device.address()) == value => {
                    device.begin();
                    self.session = Session::Talking { index: 0 };
                    self.schedule_pulse();
                    0xFF
                }
                _ => {
                    self.session = Session::Ignored;
                    0xFF
                }
            },
            Session::Talking { index } => match slot {
                Some(device) => {
                    let reply = device.exchange(index, value);
                    self.session = Session::Talking { index: index + 1 };
                    if reply.ack {
                        self.schedule_pulse();
                    }
                    reply.byte
                }
                None => 0xFF,
            },
            Session::Idle | Session::Ignored => 0xFF,
        }
    }
}

impl SioRegisters for SimSio<'_> {
    fn read_ctrl(&mut self) -> Control {
        self.deliver_pulse();
        self.ctrl
    }

    fn write_ctrl(&mut self, ctrl: Control) {
        self.deliver_pulse();
        if ctrl.contains(Control::RESET) {
            self.reset();
        }
        if ctrl.contains(Control::ACKNOWLEDGE) {
            self.latched = false;
        }

        let port = self.port();
        let was_asserted = self.ctrl.contains(Control::DTR);
        self.ctrl = ctrl - Control::ACKNOWLEDGE - Control::RESET;
        let asserted = self.ctrl.contains(Control::DTR);

        if !was_asserted && asserted {
            self.session = Session::Address;
            let port = self.port();
            self.log(Event::Attention {
                port,
                asserted: true,
            });
        } else if was_asserted && !asserted {
            if let Session::Talking { .. } = self.session {
                if let Some(device) = self.devices[port.index()].as_mut() {
                    device.end();
                }
            }
            self.session = Session::Idle;
            self.log(Event::Attention {
                port,
                asserted: false,
            });
        }
    }

    fn write_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn write_baud(&mut self, divisor: u16) {
        self.baud = divisor;
    }

    fn status(&mut self) -> Status {
        self.deliver_pulse();
        let mut status = Status::TX_NOT_FULL | Status::TX_IDLE;
        if !self.rx.is_empty() {
            status |= Status::RX_NOT_EMPTY;
        }
        if self.irq {
            status |= Status::IRQ;
        }
        status
    }

    fn read_data(&mut self) -> u8 {
        self.deliver_pulse();
        self.rx.pop_front().unwrap_or(0)
    }

    fn write_data(&mut self, value: u8) {
        self.deliver_pulse();
        let port = self.port();
        let received = self.clock_byte(port, value);

        // A full FIFO drops the new byte.
        let _ = self.rx.push_back(received);

        if self.ctrl.contains(Control::DTR) {
            self.log(Event::Byte {
                port,
                sent: value,
                received,
            });
        }
    }

    fn ack_irq_pending(&mut self) -> bool {
        self.ack_checks += 1;
        self.deliver_pulse();
        self.irq
    }

    fn clear_ack_irq(&mut self) {
        self.deliver_pulse();
        self.irq = false;
    }
}

#[cfg(test)]
mod tests {
    use super::device::Scripted;
    use super::*;
    use crate::protocol::DeviceAddress;

    fn enabled() -> Control {
        Control::TX_ENABLE | Control::RX_ENABLE | Control::DSR_IRQ_ENABLE
    }

    #[test]
    fn pulse_needs_rearming() {
        let clock = Cell::new(0);
        let mut sio = SimSio::new(&clock).with_device(
            Port::One,
            Scripted::new(DeviceAddress::Controller, &[1, 2, 3], 3).into(),
        );
        sio.write_ctrl(enabled() | Control::DTR);

        sio.write_data(0x01);
        assert!(sio.ack_irq_pending());
        sio.clear_ack_irq();

        // Not re-armed, so the next pulse is lost.
        sio.write_data(0x00);
        assert!(!sio.ack_irq_pending());

        sio.write_ctrl(enabled() | Control::DTR | Control::ACKNOWLEDGE);
        sio.write_data(0x00);
        assert!(sio.ack_irq_pending());
    }

    #[test]
    fn late_pulse_arrives_after_latency() {
        let clock = Cell::new(0);
        let mut sio = SimSio::new(&clock).with_device(
            Port::Two,
            Scripted::new(DeviceAddress::MemoryCard, &[], 0).into(),
        );
        sio.set_ack_latency_us(50);
        sio.write_ctrl(enabled() | Control::CS_PORT_2 | Control::DTR);
        sio.write_data(0x81);

        let mut delay = SimDelay::new(&clock);
        delay.delay_us(49);
        assert!(!sio.ack_irq_pending());
        delay.delay_us(1);
        assert!(sio.ack_irq_pending());
    }

    #[test]
    fn wrong_address_is_ignored() {
        let clock = Cell::new(0);
        let mut sio = SimSio::new(&clock).with_device(
            Port::One,
            Scripted::new(DeviceAddress::Controller, &[1], 1).into(),
        );
        sio.write_ctrl(enabled() | Control::DTR);
        sio.write_data(0x81);
        assert!(!sio.ack_irq_pending());
        sio.write_data(0x00);
        assert_eq!(sio.read_data(), 0xFF);
        assert_eq!(sio.read_data(), 0xFF);
        assert!(!sio.ack_irq_pending());
    }

    #[test]
    fn attention_edges_are_logged_per_port() {
        let clock = Cell::new(0);
        let mut sio = SimSio::new(&clock);
        sio.write_ctrl(enabled() | Control::CS_PORT_2);
        sio.write_ctrl(enabled() | Control::CS_PORT_2 | Control::DTR);
        sio.write_ctrl(enabled() | Control::CS_PORT_2);

        assert_eq!(sio.attention_edges(Port::Two, true), 1);
        assert_eq!(sio.attention_edges(Port::Two, false), 1);
        assert_eq!(sio.attention_edges(Port::One, true), 0);
        assert!(!sio.attention_asserted());
    }
}
