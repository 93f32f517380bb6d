//! PS/2 keyboard driver.
//!
//! Runs entirely in interrupt context: IRQ 1 reads one scancode from port 0x60,
//! the translator turns it into a [`Key`](crate::terminal::Key), and the terminal
//! edits its line or runs a command.
//!
//! The dispatcher has already acknowledged the PIC by the time [`IrqHandler::handle`]
//! runs, so the driver never sends its own EOI.

use spin::{Mutex, MutexGuard};
use theos_common::Irq;
use theos_hal::{Console, Cpu, PortIo};

use crate::interrupts::{IrqHandler, TrapFrame};
use crate::terminal::{Terminal, Translator};

/// Keyboard data port (scancode read).
pub const DATA_PORT: u16 = 0x60;

/// PS/2 controller command port.
pub const COMMAND_PORT: u16 = 0x64;

/// Controller command: disable the second (mouse) port.
pub const DISABLE_SECOND_PORT: u8 = 0xA7;

/// Controller command: enable the first (keyboard) port.
pub const ENABLE_FIRST_PORT: u8 = 0xAE;

/// Everything the keyboard interrupt mutates.
pub struct KeyboardSession<P, C, U> {
    ports: P,
    console: C,
    cpu: U,
    translator: Translator,
    terminal: Terminal,
}

impl<P: PortIo, C: Console, U: Cpu> KeyboardSession<P, C, U> {
    /// Feeds one raw scancode through the translator into the terminal.
    pub fn process(&mut self, scancode: u8) {
        let key = self.translator.feed(scancode);
        self.terminal.handle_key(key, &mut self.console, &mut self.cpu);
    }

    /// Reads the pending scancode from the data port and processes it.
    pub fn poll_port(&mut self) {
        let scancode = self.ports.read_u8(DATA_PORT);
        self.process(scancode);
    }

    /// The port bus.
    pub fn ports(&self) -> &P {
        &self.ports
    }

    /// Mutable port bus, used by tests to script scancodes.
    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }

    /// The output console.
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Mutable output console.
    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// The CPU handle used for diagnostic interrupts.
    pub fn cpu(&self) -> &U {
        &self.cpu
    }

    /// Modifier state.
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Line editor and command counter.
    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }
}

/// The IRQ 1 handler.
pub struct KeyboardDriver<P, C, U> {
    session: Mutex<KeyboardSession<P, C, U>>,
}

impl<P, C, U> KeyboardDriver<P, C, U> {
    /// Creates the driver with an empty line and both latches released.
    pub const fn new(ports: P, console: C, cpu: U) -> Self {
        Self {
            session: Mutex::new(KeyboardSession {
                ports,
                console,
                cpu,
                translator: Translator::new(),
                terminal: Terminal::new(),
            }),
        }
    }

    /// Locks the session for inspection.
    pub fn session(&self) -> MutexGuard<'_, KeyboardSession<P, C, U>> {
        self.session.lock()
    }
}

impl<P: PortIo, C: Console, U: Cpu> KeyboardDriver<P, C, U> {
    /// Enables the keyboard port on the PS/2 controller and prints the first prompt.
    ///
    /// The caller still has to register the driver and unmask IRQ 1.
    pub fn start(&self) {
        let mut session = self.session.lock();
        let KeyboardSession {
            ports,
            console,
            terminal,
            ..
        } = &mut *session;

        ports.write_u8(COMMAND_PORT, DISABLE_SECOND_PORT);
        ports.write_u8(COMMAND_PORT, ENABLE_FIRST_PORT);

        console.write_str("Keyboard initialized. Start typing...\n");
        terminal.prompt(console);
        log::info!("keyboard started");
    }
}

impl<P, C, U> IrqHandler for KeyboardDriver<P, C, U>
where
    P: PortIo + Send,
    C: Console + Send,
    U: Cpu + Send,
{
    fn handle(&self, _irq: Irq, _frame: &TrapFrame) {
        self.session.lock().poll_port();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::scancode::{BREAK_BIT, CAPS_LOCK, ENTER, LEFT_SHIFT};
    use crate::testutil::{BufferConsole, RecordingCpu, RecordingPorts};

    type TestKeyboard = KeyboardDriver<RecordingPorts, BufferConsole, RecordingCpu>;

    fn keyboard() -> TestKeyboard {
        KeyboardDriver::new(
            RecordingPorts::new(),
            BufferConsole::new(),
            RecordingCpu::new(),
        )
    }

    #[test]
    fn test_start_enables_port_and_prompts() {
        let keyboard = keyboard();
        keyboard.start();

        let session = keyboard.session();
        assert_eq!(
            session.ports().writes(),
            &[
                (COMMAND_PORT, DISABLE_SECOND_PORT),
                (COMMAND_PORT, ENABLE_FIRST_PORT)
            ]
        );
        assert_eq!(
            session.console().as_str(),
            "Keyboard initialized. Start typing...\nThe...OS> "
        );
    }

    #[test]
    fn test_handle_reads_data_port_without_eoi() {
        let keyboard = keyboard();
        keyboard.session().ports_mut().queue_read(DATA_PORT, 0x23);

        keyboard.handle(Irq::KEYBOARD, &TrapFrame::new(0x21));

        let session = keyboard.session();
        assert_eq!(session.terminal().line().as_str(), "h");
        assert_eq!(session.console().as_str(), "h");
        assert!(session.ports().writes().is_empty());
    }

    #[test]
    fn test_shift_release_only_updates_latch() {
        let keyboard = keyboard();
        let mut session = keyboard.session();

        session.process(LEFT_SHIFT);
        session.process(0x1E);
        session.process(LEFT_SHIFT | BREAK_BIT);
        session.process(0x1E);

        assert!(!session.translator().latches().shift);
        assert_eq!(session.terminal().line().as_str(), "Aa");
    }

    #[test]
    fn test_caps_then_enter_runs_uppercase_line() {
        let keyboard = keyboard();
        let mut session = keyboard.session();

        session.process(CAPS_LOCK);
        for code in [0x23, 0x12] {
            session.process(code);
        }
        session.process(ENTER);

        assert_eq!(session.terminal().commands_run(), 1);
        assert!(session.console().as_str().contains("Unknown command: HE\n"));
    }
}
