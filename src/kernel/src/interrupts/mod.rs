//! Hardware interrupt core: PIC bring-up, the handler registry and the dispatcher.
//!
//! # Data flow
//!
//! ```text
//! device -> PIC line -> CPU vector -> trap stub -> Dispatcher -> IrqHandler
//! ```
//!
//! | IRQ  | Vector      | Chip   |
//! |------|-------------|--------|
//! | 0-7  | 0x20 - 0x27 | master |
//! | 8-15 | 0x28 - 0x2F | slave  |

pub mod dispatch;
pub mod pic;
pub mod registry;

pub use dispatch::Dispatcher;
pub use pic::Pic8259;
pub use registry::{HandlerRegistry, HandlerSlot, IrqHandler};

/// Register snapshot saved by the trap mechanism.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    /// CPU vector that was raised.
    pub vector: u8,
    /// Interrupted instruction pointer.
    pub instruction_pointer: u64,
    /// Interrupted code segment selector.
    pub code_segment: u64,
    /// RFLAGS at the time of the trap.
    pub cpu_flags: u64,
    /// Interrupted stack pointer.
    pub stack_pointer: u64,
    /// Interrupted stack segment selector.
    pub stack_segment: u64,
}

impl TrapFrame {
    /// A frame carrying only the vector number.
    pub const fn new(vector: u8) -> Self {
        Self {
            vector,
            instruction_pointer: 0,
            code_segment: 0,
            cpu_flags: 0,
            stack_pointer: 0,
            stack_segment: 0,
        }
    }
}
