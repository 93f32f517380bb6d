//! Kernel self-tests, run once at boot before interrupts are enabled.
//!
//! They exercise the interrupt core against fakes, so a broken build shows up in
//! the serial log before the first real keystroke.

use theos_common::Irq;

use crate::drivers::KeyboardDriver;
use crate::interrupts::{Dispatcher, Pic8259, TrapFrame};
use crate::terminal::scancode::{Key, Latches, Translator, ENTER, LEFT_SHIFT};
use crate::testutil::{BufferConsole, CountingHandler, RecordingCpu, RecordingPorts};

/// Runs all kernel tests.
pub fn run_all() {
    log::info!("Running kernel tests...");

    test_dispatch();
    test_translator();
    test_keyboard_line();

    log::info!("All kernel tests passed!");
}

fn test_dispatch() {
    log::info!("test_dispatch... ");
    let handler = CountingHandler::new();
    let mut dispatcher = Dispatcher::new(Pic8259::new(RecordingPorts::new()));
    dispatcher.bring_up();
    dispatcher.register(Irq::KEYBOARD, &handler);

    assert_eq!(
        dispatcher.dispatch(&TrapFrame::new(Irq::KEYBOARD.vector())),
        Some(Irq::KEYBOARD)
    );
    assert_eq!(dispatcher.dispatch(&TrapFrame::new(0x2C)), None);
    assert_eq!(handler.count(), 1);
    log::info!("[ok]");
}

fn test_translator() {
    log::info!("test_translator... ");
    let mut translator = Translator::new();
    assert_eq!(translator.feed(LEFT_SHIFT), Key::None);
    assert_eq!(translator.feed(0x1E), Key::Char(b'A'));
    assert_eq!(translator.feed(LEFT_SHIFT | 0x80), Key::None);
    assert_eq!(translator.latches(), Latches::default());
    log::info!("[ok]");
}

fn test_keyboard_line() {
    log::info!("test_keyboard_line... ");
    let keyboard = KeyboardDriver::new(
        RecordingPorts::new(),
        BufferConsole::new(),
        RecordingCpu::new(),
    );
    let mut session = keyboard.session();
    // "echo a"
    for code in [0x12, 0x2E, 0x23, 0x18, 0x39, 0x1E, ENTER] {
        session.process(code);
    }
    assert_eq!(session.terminal().commands_run(), 1);
    assert!(session.console().as_str().ends_with("\na\nThe...OS> "));
    log::info!("[ok]");
}
