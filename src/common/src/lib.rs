//! Types shared between the TheOS kernel and its hardware layer.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

pub mod error;
pub mod irq;

pub use error::IrqError;
pub use irq::{Irq, IrqMask, IRQ_LINES, MASTER_VECTOR_BASE, SLAVE_VECTOR_BASE};
