//! System-wide error types for TheOS.

use core::fmt;

/// Errors produced when naming an interrupt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IrqError {
    /// The line number is not one of the 16 PIC lines.
    LineOutOfRange(u8),
    /// The CPU vector is not one the remapped PICs can raise.
    NotPicVector(u8),
}

impl fmt::Display for IrqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrqError::LineOutOfRange(line) => write!(f, "IRQ line {} out of range 0..15", line),
            IrqError::NotPicVector(vector) => {
                write!(f, "vector {:#04x} is not routed through the PICs", vector)
            }
        }
    }
}
