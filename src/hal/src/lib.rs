//! TheOS Hardware Abstraction Layer (HAL) traits.
//!
//! This crate defines traits that abstract away platform-specific hardware details,
//! so the interrupt and keyboard logic can be driven by real ports on the target and
//! by recording fakes in tests.

#![no_std]

use core::fmt;

/// Byte-wide access to the x86 I/O port space.
pub trait PortIo {
    /// Reads one byte from `port`.
    fn read_u8(&mut self, port: u16) -> u8;
    /// Writes one byte to `port`.
    fn write_u8(&mut self, port: u16, value: u8);
}

/// Trait for a text-based console output.
///
/// Writes cannot fail: a sink that loses output has nobody to report it to.
pub trait Console {
    /// Writes a string to the console.
    fn write_str(&mut self, s: &str);

    /// Clears the console screen.
    fn clear(&mut self);

    /// Writes formatted text. Lets `write!` and `writeln!` target any console.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        struct Adapter<'a, C: ?Sized>(&'a mut C);

        impl<C: Console + ?Sized> fmt::Write for Adapter<'_, C> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                self.0.write_str(s);
                Ok(())
            }
        }

        let _ = fmt::write(&mut Adapter(self), args);
    }
}

/// Trait for the interrupt controller sitting between devices and the CPU.
pub trait InterruptController {
    /// Runs the one-shot initialization sequence.
    fn initialize(&mut self);
    /// Signals the end of the interrupt that arrived on `vector`.
    fn end_of_interrupt(&mut self, vector: u8);
    /// Enables delivery of a single line.
    fn unmask(&mut self, line: u8);
}

/// Trait for the handful of CPU instructions the kernel core needs.
pub trait Cpu {
    /// Globally enables interrupts.
    fn enable_interrupts(&mut self);
    /// Halts the CPU until the next interrupt.
    fn halt(&mut self);
    /// Raises software interrupt `vector`.
    fn software_interrupt(&mut self, vector: u8);
}
