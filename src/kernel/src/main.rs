//! TheOS Kernel Entry Point
//!
//! This is the main entry point for the TheOS kernel. Hosted builds compile an
//! empty `main` so the workspace still builds and tests off target.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod kernel {
    use bootloader::{entry_point, BootInfo};
    use core::panic::PanicInfo;
    use theos_hal::Cpu;
    use theos_kernel::arch::x86_64::{
        self, interrupts, vga::Color, VgaConsole, X86Cpu, X86Ports,
    };
    use theos_kernel::boot::{self, Status};
    use theos_kernel::drivers::KeyboardDriver;
    use theos_kernel::{println, serial_println};

    entry_point!(kernel_main);

    /// The IRQ 1 handler, wired to the screen and the real PS/2 ports.
    // SAFETY: the keyboard driver is the only user of ports 0x60 and 0x64.
    static KEYBOARD: KeyboardDriver<X86Ports, VgaConsole, X86Cpu> =
        KeyboardDriver::new(unsafe { X86Ports::new() }, VgaConsole, X86Cpu);

    /// Kernel entry point.
    ///
    /// Called by the bootloader after setting up the initial environment.
    fn kernel_main(_boot_info: &'static BootInfo) -> ! {
        // ====================================================================
        // Phase 1: Core Initialization
        // ====================================================================
        theos_kernel::init();

        let mut console = VgaConsole;
        x86_64::vga::clear_screen();
        boot::banner::print_banner(&mut console);

        boot::log(&mut console, Status::Ok, "Serial port initialized");
        boot::log(&mut console, Status::Ok, "IDT Initialized");

        // Run kernel tests
        theos_kernel::tests::run_all();
        boot::log(&mut console, Status::Ok, "Kernel self tests passed");

        #[cfg(feature = "test")]
        {
            use theos_kernel::testutil::{exit_qemu, QemuExitCode};
            // SAFETY: nothing else drives the debug-exit port.
            let mut ports = unsafe { X86Ports::new() };
            exit_qemu(&mut ports, QemuExitCode::Success);
        }

        // ====================================================================
        // Phase 2: PIC, keyboard, sti
        // ====================================================================
        let mut cpu = X86Cpu;
        boot::start_interrupts(&mut console, interrupts::dispatcher(), &KEYBOARD, &mut cpu);

        // ====================================================================
        // Phase 3: Interrupt self-check
        // ====================================================================
        println!("Testing interrupts...");
        for (vector, name) in [(0, "division by zero"), (1, "debug"), (2, "NMI")] {
            println!("Testing {} interrupt...", name);
            cpu.software_interrupt(vector);
        }
        println!("Interrupt testing complete.");

        x86_64::vga::set_color(Color::Cyan, Color::Black);
        println!("System is ready. You can start typing...");
        x86_64::vga::set_color(Color::White, Color::Black);

        loop {
            cpu.halt();
        }
    }

    /// Panic handler.
    ///
    /// Called when the kernel encounters an unrecoverable error.
    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        serial_println!("KERNEL PANIC: {}", info);

        #[cfg(feature = "test")]
        {
            use theos_kernel::testutil::{exit_qemu, QemuExitCode};
            // SAFETY: we are about to halt; nothing else runs.
            let mut ports = unsafe { X86Ports::new() };
            exit_qemu(&mut ports, QemuExitCode::Failed);
        }

        x86_64::vga::set_color(Color::LightRed, Color::Black);
        println!("\n\n!!! KERNEL PANIC !!!");
        x86_64::vga::set_color(Color::White, Color::Black);
        println!("{}", info);

        x86_64::halt_loop()
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
