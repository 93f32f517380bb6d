//! Serial port driver for x86_64.
//!
//! Provides serial output via COM1 (0x3F8) and routes the `log` facade to it.

use core::fmt::{self, Write};
use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;
use uart_16550::SerialPort;

/// COM1 I/O port address.
const COM1_PORT: u16 = 0x3F8;

/// Global serial port instance, lazily initialized.
///
/// Uses a spinlock for safe concurrent access from multiple contexts,
/// including interrupt handlers.
pub static SERIAL: spin::Once<Mutex<SerialPort>> = spin::Once::new();

/// Initializes the global serial port.
///
/// This function is idempotent - calling it multiple times has no effect
/// after the first successful initialization.
pub fn init() {
    get_serial();
}

/// Returns a reference to the serial port, initializing if necessary.
fn get_serial() -> &'static Mutex<SerialPort> {
    SERIAL.call_once(|| {
        // SAFETY: COM1_PORT (0x3F8) is a well-known x86 serial port address.
        // We're running in kernel mode with full I/O port access.
        // The uart_16550 crate handles the port initialization sequence correctly.
        let mut serial = unsafe { SerialPort::new(COM1_PORT) };
        serial.init();
        Mutex::new(serial)
    })
}

/// Prints to the serial port without a newline.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::arch::x86_64::serial::_print(format_args!($($arg)*))
    };
}

/// Prints to the serial port with a newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => ($crate::serial_print!("{}\n", format_args!($($arg)*)))
}

/// Internal print function used by macros.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    // Interrupt handlers log too; keep them out while the port is held.
    x86_64::instructions::interrupts::without_interrupts(|| {
        // uart_16550 never fails a write.
        let _ = get_serial().lock().write_fmt(args);
    });
}

/// Prints only if the port is free. Safe to call from an NMI.
pub fn try_print(args: fmt::Arguments) -> bool {
    crate::drivers::vga::write_if_unlocked(get_serial(), args)
}

/// `log` backend writing `[LEVEL] target: message` lines to COM1.
struct SerialLogger;

impl Log for SerialLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            _print(format_args!(
                "[{}] {}: {}\n",
                record.level(),
                record.target(),
                record.args()
            ));
        }
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger;

/// Installs the serial logger at `level`.
///
/// A second call keeps the first logger and only updates the level.
pub fn init_logger(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        serial_println!("logger already installed");
    }
    log::set_max_level(level);
}
