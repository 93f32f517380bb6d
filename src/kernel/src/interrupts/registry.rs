//! Fixed-capacity table of hardware interrupt handlers, one slot per IRQ line.

use theos_common::{Irq, IRQ_LINES};

use super::TrapFrame;

/// A device driver that services one IRQ line.
///
/// Handlers carry their own state; the registry only stores a reference and never
/// looks inside. Interrupt delivery serializes calls, so `handle` never races itself.
pub trait IrqHandler: Sync {
    /// Services the interrupt. `frame` is the register snapshot saved at trap entry.
    fn handle(&self, irq: Irq, frame: &TrapFrame);
}

/// One registry entry.
#[derive(Clone, Copy)]
pub struct HandlerSlot<'h> {
    irq: Irq,
    handler: Option<&'h dyn IrqHandler>,
}

impl<'h> HandlerSlot<'h> {
    const fn empty(irq: Irq) -> Self {
        Self { irq, handler: None }
    }

    /// The line this slot serves.
    pub fn irq(&self) -> Irq {
        self.irq
    }

    /// The registered handler, if any.
    pub fn handler(&self) -> Option<&'h dyn IrqHandler> {
        self.handler
    }
}

/// Maps each of the 16 IRQ lines to at most one handler.
pub struct HandlerRegistry<'h> {
    slots: [HandlerSlot<'h>; IRQ_LINES],
}

impl<'h> HandlerRegistry<'h> {
    /// Creates a registry with every slot empty.
    pub fn new() -> Self {
        let mut registry = Self {
            slots: [HandlerSlot::empty(Irq::TIMER); IRQ_LINES],
        };
        registry.reset();
        registry
    }

    /// Empties every slot.
    pub fn reset(&mut self) {
        for (slot, irq) in self.slots.iter_mut().zip(Irq::all()) {
            *slot = HandlerSlot::empty(irq);
        }
    }

    /// Installs `handler` for `irq`, replacing whatever was there.
    pub fn register(&mut self, irq: Irq, handler: &'h dyn IrqHandler) {
        self.slots[irq.index()].handler = Some(handler);
    }

    /// Returns the handler registered for `irq`.
    pub fn lookup(&self, irq: Irq) -> Option<&'h dyn IrqHandler> {
        self.slots[irq.index()].handler()
    }

    /// Whether `irq` currently has a handler.
    pub fn is_registered(&self, irq: Irq) -> bool {
        self.lookup(irq).is_some()
    }

    /// Number of lines that currently have a handler.
    pub fn registered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.handler().is_some()).count()
    }

    /// All slots, indexed by line number.
    pub fn slots(&self) -> &[HandlerSlot<'h>; IRQ_LINES] {
        &self.slots
    }
}

impl Default for HandlerRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}
