//! Test doubles for the hardware traits.
//!
//! All fakes are fixed-capacity so they work in `no_std` builds and can be used
//! both by unit tests and by the host integration tests in `tests/`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use theos_kernel::testutil::{BufferConsole, RecordingCpu, RecordingPorts};
//! ```

use core::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};

use theos_common::Irq;
use theos_hal::{Console, Cpu, PortIo};

use crate::interrupts::{IrqHandler, TrapFrame};

/// Port of QEMU's `isa-debug-exit` device.
pub const QEMU_EXIT_PORT: u16 = 0xf4;

const MAX_WRITES: usize = 256;
const MAX_READS: usize = 64;
const CONSOLE_CAPACITY: usize = 4096;
const MAX_RAISED: usize = 16;

/// QEMU exit codes for signaling test results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum QemuExitCode {
    /// All tests passed.
    Success = 0x10,
    /// One or more tests failed.
    Failed = 0x11,
}

/// Exit QEMU with the given exit code.
///
/// QEMU must be started with `-device isa-debug-exit,iobase=0xf4,iosize=0x04`.
/// The process exit status is `(code << 1) | 1`, so `Success` becomes 33.
pub fn exit_qemu<P: PortIo>(ports: &mut P, exit_code: QemuExitCode) {
    ports.write_u8(QEMU_EXIT_PORT, exit_code as u8);
}

/// Port bus that records every write and serves scripted reads.
///
/// Reads of a port with nothing queued return `0`.
pub struct RecordingPorts {
    writes: [(u16, u8); MAX_WRITES],
    write_count: usize,
    reads: [(u16, u8); MAX_READS],
    read_count: usize,
}

impl RecordingPorts {
    /// Creates an empty bus.
    pub const fn new() -> Self {
        Self {
            writes: [(0, 0); MAX_WRITES],
            write_count: 0,
            reads: [(0, 0); MAX_READS],
            read_count: 0,
        }
    }

    /// Queues `value` to be returned by the next read of `port`.
    ///
    /// # Panics
    ///
    /// Panics when the read queue is full.
    pub fn queue_read(&mut self, port: u16, value: u8) {
        assert!(self.read_count < MAX_READS, "read queue full");
        self.reads[self.read_count] = (port, value);
        self.read_count += 1;
    }

    /// Every `(port, value)` written so far, in order.
    pub fn writes(&self) -> &[(u16, u8)] {
        &self.writes[..self.write_count]
    }

    /// Forgets recorded writes.
    pub fn clear_writes(&mut self) {
        self.write_count = 0;
    }
}

impl Default for RecordingPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl PortIo for RecordingPorts {
    fn read_u8(&mut self, port: u16) -> u8 {
        let queued = &self.reads[..self.read_count];
        let Some(pos) = queued.iter().position(|&(p, _)| p == port) else {
            return 0;
        };
        let (_, value) = self.reads[pos];
        self.reads.copy_within(pos + 1..self.read_count, pos);
        self.read_count -= 1;
        value
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        assert!(self.write_count < MAX_WRITES, "write log full");
        self.writes[self.write_count] = (port, value);
        self.write_count += 1;
    }
}

/// Console that keeps everything written to it.
pub struct BufferConsole {
    buffer: [u8; CONSOLE_CAPACITY],
    len: usize,
    clears: usize,
}

impl BufferConsole {
    /// Creates an empty console.
    pub const fn new() -> Self {
        Self {
            buffer: [0; CONSOLE_CAPACITY],
            len: 0,
            clears: 0,
        }
    }

    /// Text written since creation or the last [`reset`](Self::reset).
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buffer[..self.len]).unwrap_or("<invalid utf-8>")
    }

    /// How many times the screen was cleared.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Drops captured text.
    pub fn reset(&mut self) {
        self.len = 0;
    }
}

impl Default for BufferConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for BufferConsole {
    fn write_str(&mut self, s: &str) {
        let end = self.len + s.len();
        assert!(end <= CONSOLE_CAPACITY, "console buffer full");
        self.buffer[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
    }

    fn clear(&mut self) {
        self.clears += 1;
    }
}

/// CPU that records software interrupts instead of raising them.
pub struct RecordingCpu {
    raised: [u8; MAX_RAISED],
    raised_count: usize,
    interrupts_enabled: bool,
}

impl RecordingCpu {
    /// Creates a CPU with interrupts disabled.
    pub const fn new() -> Self {
        Self {
            raised: [0; MAX_RAISED],
            raised_count: 0,
            interrupts_enabled: false,
        }
    }

    /// Software interrupt vectors raised so far.
    pub fn raised(&self) -> &[u8] {
        &self.raised[..self.raised_count]
    }

    /// Whether `enable_interrupts` was called.
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }
}

impl Default for RecordingCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu for RecordingCpu {
    fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }

    fn halt(&mut self) {}

    fn software_interrupt(&mut self, vector: u8) {
        assert!(self.raised_count < MAX_RAISED, "too many software interrupts");
        self.raised[self.raised_count] = vector;
        self.raised_count += 1;
    }
}

const NO_IRQ: u8 = u8::MAX;

/// IRQ handler that counts its invocations.
pub struct CountingHandler {
    count: AtomicUsize,
    last_irq: AtomicU8,
    last_instruction_pointer: AtomicU64,
}

impl CountingHandler {
    /// Creates a handler that has never run.
    pub const fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
            last_irq: AtomicU8::new(NO_IRQ),
            last_instruction_pointer: AtomicU64::new(0),
        }
    }

    /// Number of calls to `handle`.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Line passed to the most recent call.
    pub fn last_irq(&self) -> Option<Irq> {
        Irq::new(self.last_irq.load(Ordering::Relaxed)).ok()
    }

    /// Instruction pointer of the most recent frame.
    pub fn last_instruction_pointer(&self) -> u64 {
        self.last_instruction_pointer.load(Ordering::Relaxed)
    }
}

impl Default for CountingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqHandler for CountingHandler {
    fn handle(&self, irq: Irq, frame: &TrapFrame) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.last_irq.store(irq.line(), Ordering::Relaxed);
        self.last_instruction_pointer
            .store(frame.instruction_pointer, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reads_are_per_port_fifo() {
        let mut ports = RecordingPorts::new();
        ports.queue_read(0x60, 1);
        ports.queue_read(0x21, 9);
        ports.queue_read(0x60, 2);

        assert_eq!(ports.read_u8(0x60), 1);
        assert_eq!(ports.read_u8(0x60), 2);
        assert_eq!(ports.read_u8(0x60), 0);
        assert_eq!(ports.read_u8(0x21), 9);
    }

    #[test]
    fn test_exit_qemu() {
        let mut ports = RecordingPorts::new();
        exit_qemu(&mut ports, QemuExitCode::Failed);
        assert_eq!(ports.writes(), &[(QEMU_EXIT_PORT, 0x11)]);
    }

    #[test]
    fn test_console_formats() {
        let mut console = BufferConsole::new();
        write!(console, "{}-{:x}", 12, 255);
        assert_eq!(console.as_str(), "12-ff");
    }
}
