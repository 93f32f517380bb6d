//! Boot logging with status indicators.
//!
//! Provides Linux-style boot messages on the console, mirrored to the `log` facade.

pub mod banner;

use spin::Mutex;
use theos_common::Irq;
use theos_hal::{Console, Cpu, InterruptController, PortIo};

use crate::drivers::KeyboardDriver;
use crate::interrupts::Dispatcher;

/// Boot status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Success - `[ OK ]`
    Ok,
    /// Failure - `[FAIL]`
    Fail,
    /// Warning - `[WARN]`
    Warn,
    /// Informational - `[INFO]`
    Info,
}

impl Status {
    /// The bracketed tag printed before the message.
    pub const fn tag(self) -> &'static str {
        match self {
            Status::Ok => "[ OK ]",
            Status::Fail => "[FAIL]",
            Status::Warn => "[WARN]",
            Status::Info => "[INFO]",
        }
    }
}

/// Log a boot stage with status.
///
/// Format: `[ OK ] Message text`
pub fn log<C: Console>(console: &mut C, status: Status, message: &str) {
    writeln!(console, "{} {}", status.tag(), message);
    match status {
        Status::Fail => log::error!("{}", message),
        Status::Warn => log::warn!("{}", message),
        Status::Ok | Status::Info => log::info!("{}", message),
    }
}

/// Log an indented detail line (for sub-items).
pub fn log_detail<C: Console>(console: &mut C, message: &str) {
    writeln!(console, "       {}", message);
}

/// Brings up the interrupt path and then enables interrupts on `cpu`.
///
/// Order: handler table cleared and both PICs remapped and masked, keyboard
/// started, registered for IRQ 1 and unmasked, and only then `sti`. Every step
/// releases the dispatcher lock before the next, so the first interrupt after
/// `enable_interrupts` finds it free.
pub fn start_interrupts<'h, Con, C, P, K, U, Cp>(
    console: &mut Con,
    dispatcher: &Mutex<Dispatcher<'h, C>>,
    keyboard: &'h KeyboardDriver<P, K, U>,
    cpu: &mut Cp,
) where
    Con: Console,
    C: InterruptController,
    P: PortIo + Send,
    K: Console + Send,
    U: Cpu + Send,
    Cp: Cpu,
{
    dispatcher.lock().bring_up();
    log(console, Status::Ok, "IRQ Initialized");

    keyboard.start();
    {
        let mut dispatcher = dispatcher.lock();
        dispatcher.register(Irq::KEYBOARD, keyboard);
        dispatcher.controller_mut().unmask(Irq::KEYBOARD.line());
    }
    log_detail(console, "IRQ 1 -> keyboard");

    cpu.enable_interrupts();
    log(console, Status::Ok, "Interrupts enabled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupts::pic::{MASTER_DATA, SLAVE_DATA};
    use crate::interrupts::Pic8259;
    use crate::testutil::{BufferConsole, RecordingCpu, RecordingPorts};

    type TestDispatcher<'h> = Dispatcher<'h, Pic8259<RecordingPorts>>;
    type TestKeyboard = KeyboardDriver<RecordingPorts, BufferConsole, RecordingCpu>;

    /// Snapshots the dispatcher at the moment interrupts get enabled.
    struct WatchingCpu<'a, 'h> {
        dispatcher: &'a Mutex<TestDispatcher<'h>>,
        inner: RecordingCpu,
        pic_writes: Vec<(u16, u8)>,
        keyboard_registered: bool,
    }

    impl Cpu for WatchingCpu<'_, '_> {
        fn enable_interrupts(&mut self) {
            let dispatcher = self
                .dispatcher
                .try_lock()
                .expect("dispatcher still locked at sti");
            self.pic_writes = dispatcher.controller().ports().writes().to_vec();
            self.keyboard_registered = dispatcher.registry().is_registered(Irq::KEYBOARD);
            self.inner.enable_interrupts();
        }

        fn halt(&mut self) {
            self.inner.halt();
        }

        fn software_interrupt(&mut self, vector: u8) {
            self.inner.software_interrupt(vector);
        }
    }

    #[test]
    fn test_status_lines() {
        let mut console = BufferConsole::new();
        log(&mut console, Status::Ok, "IRQ Initialized");
        log(&mut console, Status::Warn, "no timer");
        log_detail(&mut console, "vector 0x21");

        assert_eq!(
            console.as_str(),
            "[ OK ] IRQ Initialized\n[WARN] no timer\n       vector 0x21\n"
        );
    }

    #[test]
    fn test_interrupts_enabled_only_after_pic_and_keyboard_setup() {
        let keyboard: TestKeyboard = KeyboardDriver::new(
            RecordingPorts::new(),
            BufferConsole::new(),
            RecordingCpu::new(),
        );
        let mut pic_ports = RecordingPorts::new();
        // Mask register as left by the remap.
        pic_ports.queue_read(MASTER_DATA, 0xFD);
        let dispatcher = Mutex::new(Dispatcher::new(Pic8259::new(pic_ports)));
        let mut console = BufferConsole::new();
        let mut cpu = WatchingCpu {
            dispatcher: &dispatcher,
            inner: RecordingCpu::new(),
            pic_writes: Vec::new(),
            keyboard_registered: false,
        };
        assert!(!cpu.inner.interrupts_enabled());

        start_interrupts(&mut console, &dispatcher, &keyboard, &mut cpu);

        assert!(cpu.inner.interrupts_enabled());
        assert_eq!(
            cpu.pic_writes,
            [
                (0x20, 0x11),
                (0xA0, 0x11),
                (MASTER_DATA, 0x20),
                (SLAVE_DATA, 0x28),
                (MASTER_DATA, 0x04),
                (SLAVE_DATA, 0x02),
                (MASTER_DATA, 0x01),
                (SLAVE_DATA, 0x01),
                (MASTER_DATA, 0xFD),
                (SLAVE_DATA, 0xFF),
                // IRQ 1 unmask
                (MASTER_DATA, 0xFD),
            ]
        );
        assert!(cpu.keyboard_registered);
        assert_eq!(
            keyboard.session().ports().writes(),
            &[(0x64, 0xA7), (0x64, 0xAE)]
        );
        assert_eq!(
            console.as_str(),
            "[ OK ] IRQ Initialized\n       IRQ 1 -> keyboard\n[ OK ] Interrupts enabled\n"
        );
    }

    #[test]
    fn test_start_interrupts_drops_stale_handlers() {
        let stale = crate::testutil::CountingHandler::new();
        let keyboard: TestKeyboard = KeyboardDriver::new(
            RecordingPorts::new(),
            BufferConsole::new(),
            RecordingCpu::new(),
        );
        let dispatcher = Mutex::new(Dispatcher::new(Pic8259::new(RecordingPorts::new())));
        dispatcher.lock().register(Irq::TIMER, &stale);

        let mut cpu = RecordingCpu::new();
        start_interrupts(&mut BufferConsole::new(), &dispatcher, &keyboard, &mut cpu);

        let dispatcher = dispatcher.lock();
        assert!(!dispatcher.registry().is_registered(Irq::TIMER));
        assert_eq!(dispatcher.registry().registered_count(), 1);
        assert!(cpu.interrupts_enabled());
    }
}
