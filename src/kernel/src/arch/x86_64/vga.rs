//! VGA text mode output for x86_64.
//!
//! Owns the global [`Writer`] on the text buffer at 0xB8000, the `print!` macros,
//! and [`VgaConsole`], the shell's view of the screen.

use core::fmt::{self, Write};
use spin::Mutex;
use theos_hal::Console;
use x86_64::instructions::interrupts::without_interrupts;

pub use crate::drivers::vga::{Color, Writer};
use crate::drivers::vga::{write_if_unlocked, Buffer, VGA_BUFFER_ADDR};

/// Global VGA writer instance.
///
/// Uses a spinlock for safe concurrent access.
pub static WRITER: spin::Once<Mutex<Writer>> = spin::Once::new();

/// Initializes the global VGA writer.
///
/// Idempotent - safe to call multiple times.
pub fn init() {
    get_writer();
}

/// Returns a reference to the VGA writer, initializing if necessary.
fn get_writer() -> &'static Mutex<Writer> {
    WRITER.call_once(|| {
        // SAFETY: VGA_BUFFER_ADDR (0xB8000) is the standard VGA text buffer
        // address on x86 systems. This memory is always present and mapped
        // when running on x86 hardware or in QEMU, and only WRITER draws to it.
        Mutex::new(unsafe { Writer::new(VGA_BUFFER_ADDR as *mut Buffer) })
    })
}

/// Runs `f` on the writer with interrupts masked.
///
/// The keyboard handler prints from interrupt context, so holding the lock with
/// interrupts on would deadlock.
fn with_writer<R>(f: impl FnOnce(&mut Writer) -> R) -> R {
    without_interrupts(|| f(&mut get_writer().lock()))
}

/// Handle to the global VGA writer.
///
/// Each call takes the writer lock for its own duration only.
#[derive(Debug, Clone, Copy, Default)]
pub struct VgaConsole;

impl Console for VgaConsole {
    fn write_str(&mut self, s: &str) {
        with_writer(|writer| {
            let _ = fmt::Write::write_str(writer, s);
        });
    }

    fn clear(&mut self) {
        clear_screen();
    }

    fn write_fmt(&mut self, args: fmt::Arguments) {
        _print(args);
    }
}

/// Prints to the VGA buffer without a newline.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::arch::x86_64::vga::_print(format_args!($($arg)*))
    };
}

/// Prints to the VGA buffer with a newline.
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)))
}

/// Internal print function used by macros.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    // Writer::write_str never fails.
    with_writer(|writer| {
        let _ = writer.write_fmt(args);
    });
}

/// Prints only if the writer is free. Safe to call from an NMI.
pub fn try_print(args: fmt::Arguments) -> bool {
    write_if_unlocked(get_writer(), args)
}

/// Sets the VGA output color.
pub fn set_color(foreground: Color, background: Color) {
    with_writer(|writer| writer.set_color(foreground, background));
}

/// Clears the VGA screen.
pub fn clear_screen() {
    with_writer(|writer| writer.clear_screen());
}
