//! x86_64 architecture support.
//!
//! Provides VGA text mode output, serial logging, port I/O and the IDT for bare-metal x86_64.

pub mod interrupts;
pub mod port;
pub mod serial;
pub mod vga;

pub use port::X86Ports;
pub use serial::SERIAL;
pub use vga::{Color, VgaConsole, Writer, WRITER};

use core::arch::asm;
use theos_hal::Cpu;

/// Halts the CPU until the next interrupt.
///
/// Used in idle loops to reduce power consumption.
#[inline]
pub fn hlt() {
    x86_64::instructions::hlt();
}

/// Halts the CPU in an infinite loop.
///
/// Used after unrecoverable errors (panics).
pub fn halt_loop() -> ! {
    loop {
        hlt();
    }
}

/// The executing processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct X86Cpu;

impl Cpu for X86Cpu {
    fn enable_interrupts(&mut self) {
        x86_64::instructions::interrupts::enable();
    }

    fn halt(&mut self) {
        hlt();
    }

    fn software_interrupt(&mut self, vector: u8) {
        // SAFETY: vectors 0-3 have handlers installed by `interrupts::init_idt`
        // that return to the interrupted code.
        unsafe {
            match vector {
                0 => asm!("int 0", options(nomem, nostack)),
                1 => asm!("int 1", options(nomem, nostack)),
                2 => asm!("int 2", options(nomem, nostack)),
                3 => asm!("int3", options(nomem, nostack)),
                other => log::warn!("no software interrupt stub for vector {}", other),
            }
        }
    }
}
