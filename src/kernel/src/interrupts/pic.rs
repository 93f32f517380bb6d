//! Support for the primary and secondary 8259 Programmable Interrupt Controllers (PICs).
//!
//! The two chips are stateful parsers of their command stream, so every write
//! below happens in a fixed order and nothing else may touch the ports while
//! [`Pic8259::initialize`] runs.

use bitflags::bitflags;
use theos_common::{Irq, IrqMask, MASTER_VECTOR_BASE, SLAVE_VECTOR_BASE};
use theos_hal::{InterruptController, PortIo};

/// Master PIC command port.
pub const MASTER_COMMAND: u16 = 0x20;
/// Master PIC data (mask) port.
pub const MASTER_DATA: u16 = 0x21;
/// Slave PIC command port.
pub const SLAVE_COMMAND: u16 = 0xA0;
/// Slave PIC data (mask) port.
pub const SLAVE_DATA: u16 = 0xA1;

/// Non-specific end-of-interrupt command (OCW2).
pub const END_OF_INTERRUPT: u8 = 0x20;

bitflags! {
    /// Initialization command word 1.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Icw1: u8 {
        /// ICW4 follows.
        const ICW4_NEEDED = 0x01;
        /// Single chip, no ICW3.
        const SINGLE = 0x02;
        /// Call address interval 4.
        const INTERVAL4 = 0x04;
        /// Level-triggered mode.
        const LEVEL = 0x08;
        /// Start the initialization sequence.
        const INIT = 0x10;
    }
}

bitflags! {
    /// Initialization command word 4.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Icw4: u8 {
        /// 8086/88 mode.
        const MODE_8086 = 0x01;
        /// Automatic end of interrupt.
        const AUTO_EOI = 0x02;
        /// Buffered mode, master.
        const BUFFERED_MASTER = 0x0C;
        /// Special fully nested mode.
        const NESTED = 0x10;
    }
}

/// Initial master mask: everything but the keyboard is masked.
pub const INITIAL_MASTER_MASK: IrqMask = IrqMask::all().difference(Irq::KEYBOARD.chip_bit());

/// Initial slave mask: every line masked.
pub const INITIAL_SLAVE_MASK: IrqMask = IrqMask::all();

#[derive(Debug, Clone, Copy)]
struct Chip {
    command: u16,
    data: u16,
    vector_base: u8,
}

impl Chip {
    fn command<P: PortIo>(&self, ports: &mut P, value: u8) {
        ports.write_u8(self.command, value);
    }

    fn data<P: PortIo>(&self, ports: &mut P, value: u8) {
        ports.write_u8(self.data, value);
    }
}

/// The chained master/slave pair.
pub struct Pic8259<P> {
    ports: P,
    master: Chip,
    slave: Chip,
}

impl<P: PortIo> Pic8259<P> {
    /// Creates the controller pair with the fixed vector offsets 0x20 and 0x28.
    pub const fn new(ports: P) -> Self {
        Self {
            ports,
            master: Chip {
                command: MASTER_COMMAND,
                data: MASTER_DATA,
                vector_base: MASTER_VECTOR_BASE,
            },
            slave: Chip {
                command: SLAVE_COMMAND,
                data: SLAVE_DATA,
                vector_base: SLAVE_VECTOR_BASE,
            },
        }
    }

    /// Remaps both chips and programs the initial masks.
    ///
    /// Must complete before interrupts are globally enabled.
    pub fn initialize(&mut self) {
        let Self {
            ports,
            master,
            slave,
        } = self;

        let icw1 = (Icw1::INIT | Icw1::ICW4_NEEDED).bits();
        master.command(ports, icw1);
        slave.command(ports, icw1);

        master.data(ports, master.vector_base);
        slave.data(ports, slave.vector_base);

        // Master learns which input carries the slave, slave learns its identity.
        master.data(ports, Irq::CASCADE.chip_bit().bits());
        slave.data(ports, Irq::CASCADE.line());

        master.data(ports, Icw4::MODE_8086.bits());
        slave.data(ports, Icw4::MODE_8086.bits());

        master.data(ports, INITIAL_MASTER_MASK.bits());
        slave.data(ports, INITIAL_SLAVE_MASK.bits());

        log::debug!(
            "PIC remapped to {:#04x}/{:#04x}, masks {:#04x}/{:#04x}",
            master.vector_base,
            slave.vector_base,
            INITIAL_MASTER_MASK.bits(),
            INITIAL_SLAVE_MASK.bits()
        );
    }

    /// Acknowledges the interrupt delivered on `vector`.
    ///
    /// Slave-range vectors acknowledge the slave first, then the master.
    pub fn end_of_interrupt(&mut self, vector: u8) {
        if vector >= self.slave.vector_base {
            self.slave.command(&mut self.ports, END_OF_INTERRUPT);
        }
        self.master.command(&mut self.ports, END_OF_INTERRUPT);
    }

    /// Clears the mask bit of `irq` on its chip, leaving the other lines alone.
    pub fn unmask(&mut self, irq: Irq) {
        let chip = if irq.is_slave() {
            self.slave
        } else {
            self.master
        };
        let current = IrqMask::from_bits_retain(self.ports.read_u8(chip.data));
        chip.data(&mut self.ports, current.difference(irq.chip_bit()).bits());
    }

    /// The underlying port bus.
    pub fn ports(&self) -> &P {
        &self.ports
    }

    /// Mutable port bus.
    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }
}

impl<P: PortIo> InterruptController for Pic8259<P> {
    fn initialize(&mut self) {
        Pic8259::initialize(self);
    }

    fn end_of_interrupt(&mut self, vector: u8) {
        Pic8259::end_of_interrupt(self, vector);
    }

    fn unmask(&mut self, line: u8) {
        match Irq::new(line) {
            Ok(irq) => Pic8259::unmask(self, irq),
            Err(err) => log::warn!("unmask ignored: {}", err),
        }
    }
}
