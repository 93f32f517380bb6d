//! Interrupt Descriptor Table (IDT), exception handlers and the IRQ trap stubs for x86_64.
//!
//! Vectors 0x20-0x2F each get a stub that snapshots the stack frame into a
//! [`TrapFrame`] and hands it to the global [`Dispatcher`].

use crate::interrupts::{Dispatcher, Pic8259, TrapFrame};
use crate::println;
use lazy_static::lazy_static;
use spin::{Mutex, Once};
use theos_common::{IRQ_LINES, MASTER_VECTOR_BASE};
use x86_64::structures::idt::{HandlerFunc, InterruptDescriptorTable, InterruptStackFrame};

use super::port::X86Ports;

/// The dispatcher driving the real PIC pair.
pub type KernelDispatcher = Dispatcher<'static, Pic8259<X86Ports>>;

static DISPATCHER: Once<Mutex<KernelDispatcher>> = Once::new();

/// The global dispatcher, created on first use.
pub fn dispatcher() -> &'static Mutex<KernelDispatcher> {
    DISPATCHER.call_once(|| {
        // SAFETY: the dispatcher is the only owner of the PIC command and data ports.
        let ports = unsafe { X86Ports::new() };
        Mutex::new(Dispatcher::new(Pic8259::new(ports)))
    })
}

fn dispatch(vector: u8, stack_frame: &InterruptStackFrame) {
    let frame = TrapFrame {
        vector,
        instruction_pointer: stack_frame.instruction_pointer.as_u64(),
        code_segment: stack_frame.code_segment,
        cpu_flags: stack_frame.cpu_flags,
        stack_pointer: stack_frame.stack_pointer.as_u64(),
        stack_segment: stack_frame.stack_segment,
    };
    dispatcher().lock().dispatch(&frame);
}

macro_rules! irq_stubs {
    ($($line:literal => $name:ident),* $(,)?) => {
        $(
            extern "x86-interrupt" fn $name(stack_frame: InterruptStackFrame) {
                dispatch(MASTER_VECTOR_BASE + $line, &stack_frame);
            }
        )*

        /// Trap stubs indexed by IRQ line.
        const IRQ_STUBS: [HandlerFunc; IRQ_LINES] = [$($name),*];
    };
}

irq_stubs! {
    0 => irq0,
    1 => irq1,
    2 => irq2,
    3 => irq3,
    4 => irq4,
    5 => irq5,
    6 => irq6,
    7 => irq7,
    8 => irq8,
    9 => irq9,
    10 => irq10,
    11 => irq11,
    12 => irq12,
    13 => irq13,
    14 => irq14,
    15 => irq15,
}

lazy_static! {
    /// The Interrupt Descriptor Table (IDT).
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();
        idt.divide_error.set_handler_fn(divide_error_handler);
        idt.debug.set_handler_fn(debug_handler);
        idt.non_maskable_interrupt.set_handler_fn(nmi_handler);
        idt.breakpoint.set_handler_fn(breakpoint_handler);
        idt.double_fault.set_handler_fn(double_fault_handler);
        idt.page_fault.set_handler_fn(page_fault_handler);
        idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);

        // Hardware interrupts
        for (line, stub) in IRQ_STUBS.iter().enumerate() {
            idt[usize::from(MASTER_VECTOR_BASE) + line].set_handler_fn(*stub);
        }

        idt
    };
}

/// Loads the IDT. Interrupts stay disabled.
pub fn init_idt() {
    IDT.load();
}

/// Handler for the divide error exception (vector 0).
///
/// Returns to the interrupted code so `int 0` can be used as a diagnostic.
extern "x86-interrupt" fn divide_error_handler(stack_frame: InterruptStackFrame) {
    println!("EXCEPTION: DIVIDE ERROR at {:?}", stack_frame.instruction_pointer);
}

/// Handler for the debug exception (vector 1).
extern "x86-interrupt" fn debug_handler(stack_frame: InterruptStackFrame) {
    println!("EXCEPTION: DEBUG at {:?}", stack_frame.instruction_pointer);
}

/// Handler for the non-maskable interrupt (vector 2).
///
/// An NMI can land while the interrupted code holds the screen or serial lock,
/// so the report goes to whichever is free, or nowhere.
extern "x86-interrupt" fn nmi_handler(stack_frame: InterruptStackFrame) {
    let ip = stack_frame.instruction_pointer;
    if !super::vga::try_print(format_args!("EXCEPTION: NMI at {:?}\n", ip)) {
        super::serial::try_print(format_args!("EXCEPTION: NMI at {:?}\n", ip));
    }
}

/// Handler for the breakpoint exception (INT3).
extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    println!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

/// Handler for the double fault exception.
extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    panic!("EXCEPTION: DOUBLE FAULT\n{:#?}", stack_frame);
}

/// Handler for the page fault exception.
extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: x86_64::structures::idt::PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;

    println!("EXCEPTION: PAGE FAULT");
    println!("Accessed Address: {:?}", Cr2::read());
    println!("Error Code: {:?}", error_code);
    println!("{:#?}", stack_frame);
    super::halt_loop();
}

/// Handler for the general protection fault exception.
extern "x86-interrupt" fn general_protection_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    println!("EXCEPTION: GENERAL PROTECTION FAULT");
    println!("Error Code: {:#x}", error_code);
    println!("{:#?}", stack_frame);
    super::halt_loop();
}
