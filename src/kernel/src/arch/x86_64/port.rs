//! Raw x86 I/O port access.

use theos_hal::PortIo;
use x86_64::instructions::port::Port;

/// The real I/O port space.
#[derive(Debug)]
pub struct X86Ports {
    _private: (),
}

impl X86Ports {
    /// Grants access to the whole port space.
    ///
    /// # Safety
    ///
    /// The caller must run in ring 0 and must make sure that no two owners drive
    /// the same device ports concurrently.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PortIo for X86Ports {
    fn read_u8(&mut self, port: u16) -> u8 {
        // SAFETY: construction of `X86Ports` is unsafe and carries the ring-0 guarantee.
        unsafe { Port::<u8>::new(port).read() }
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        // SAFETY: as above.
        unsafe { Port::<u8>::new(port).write(value) }
    }
}
