//! TheOS Kernel
//!
//! A small x86_64 kernel whose whole job is hardware interrupts: the 8259 PIC pair,
//! a sixteen-slot IRQ handler table, and a PS/2 keyboard feeding a line-edited shell.
//!
//! # Architecture
//!
//! The kernel is structured into the following modules:
//! - `interrupts`: PIC bring-up, handler registry, dispatcher
//! - `terminal`: scancode translation, line editing, shell commands
//! - `drivers`: the IRQ 1 keyboard handler
//! - `boot`: boot status lines
//! - `arch`: Platform-specific code (VGA, serial, IDT), bare metal only
//!
//! Everything outside `arch` talks to hardware through the traits in `theos_hal`,
//! so it builds and tests on the host.
//!
//! # Safety
//!
//! All unsafe code lives under `arch` and is documented with safety
//! invariants explaining why the usage is correct.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_os = "none", feature(abi_x86_interrupt))]
#![warn(missing_docs)]

pub mod arch;
pub mod boot;
pub mod drivers;
pub mod interrupts;
pub mod terminal;
pub mod tests;
pub mod testutil;

/// Initializes core kernel subsystems.
///
/// Called early in the boot process: brings up serial logging, the VGA writer and the IDT.
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub fn init() {
    arch::x86_64::serial::init();
    arch::x86_64::serial::init_logger(log::LevelFilter::Info);
    arch::x86_64::vga::init();
    arch::x86_64::interrupts::init_idt();
}
