//! Hardware interrupt lines and their CPU vectors.

use bitflags::bitflags;

use crate::error::IrqError;

/// Number of interrupt lines served by the chained PICs.
pub const IRQ_LINES: usize = 16;

/// First CPU vector of the master PIC (IRQ 0..7 -> 0x20..0x27).
pub const MASTER_VECTOR_BASE: u8 = 0x20;

/// First CPU vector of the slave PIC (IRQ 8..15 -> 0x28..0x2F).
pub const SLAVE_VECTOR_BASE: u8 = MASTER_VECTOR_BASE + 8;

/// A hardware interrupt line, guaranteed to be in `0..16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Irq(u8);

impl Irq {
    /// Programmable interval timer.
    pub const TIMER: Irq = Irq(0);
    /// PS/2 keyboard.
    pub const KEYBOARD: Irq = Irq(1);
    /// Master input the slave PIC is wired to.
    pub const CASCADE: Irq = Irq(2);

    /// Creates an IRQ from a line number.
    pub const fn new(line: u8) -> Result<Irq, IrqError> {
        if (line as usize) < IRQ_LINES {
            Ok(Irq(line))
        } else {
            Err(IrqError::LineOutOfRange(line))
        }
    }

    /// Maps a CPU vector back to the line that raised it.
    ///
    /// Vectors below the master base or past the last slave line are rejected.
    pub const fn from_vector(vector: u8) -> Result<Irq, IrqError> {
        match vector.checked_sub(MASTER_VECTOR_BASE) {
            Some(line) if (line as usize) < IRQ_LINES => Ok(Irq(line)),
            _ => Err(IrqError::NotPicVector(vector)),
        }
    }

    /// The raw line number.
    pub const fn line(self) -> u8 {
        self.0
    }

    /// The line number as a table index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The CPU vector this line is remapped to.
    pub const fn vector(self) -> u8 {
        MASTER_VECTOR_BASE + self.0
    }

    /// Whether the line is served by the slave chip.
    pub const fn is_slave(self) -> bool {
        self.0 >= 8
    }

    /// The bit for this line within its own chip's mask register.
    pub const fn chip_bit(self) -> IrqMask {
        IrqMask::from_bits_retain(1 << (self.0 % 8))
    }

    /// Every line, in ascending order.
    pub fn all() -> impl Iterator<Item = Irq> {
        (0..IRQ_LINES as u8).map(Irq)
    }
}

impl TryFrom<u8> for Irq {
    type Error = IrqError;

    fn try_from(line: u8) -> Result<Self, Self::Error> {
        Irq::new(line)
    }
}

bitflags! {
    /// One PIC's interrupt mask register. A set bit masks (disables) the line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IrqMask: u8 {
        /// Line 0 (timer / IRQ 8).
        const LINE0 = 1 << 0;
        /// Line 1 (keyboard / IRQ 9).
        const LINE1 = 1 << 1;
        /// Line 2 (cascade / IRQ 10).
        const LINE2 = 1 << 2;
        /// Line 3 (IRQ 3 / IRQ 11).
        const LINE3 = 1 << 3;
        /// Line 4 (IRQ 4 / IRQ 12).
        const LINE4 = 1 << 4;
        /// Line 5 (IRQ 5 / IRQ 13).
        const LINE5 = 1 << 5;
        /// Line 6 (IRQ 6 / IRQ 14).
        const LINE6 = 1 << 6;
        /// Line 7 (IRQ 7 / IRQ 15).
        const LINE7 = 1 << 7;
    }
}
