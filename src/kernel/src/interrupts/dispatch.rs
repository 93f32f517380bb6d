//! Routes remapped hardware vectors to registered handlers.

use theos_common::Irq;
use theos_hal::InterruptController;

use super::registry::{HandlerRegistry, IrqHandler};
use super::TrapFrame;

/// Owns the interrupt controller and the handler table.
///
/// The trap path calls [`Dispatcher::dispatch`] once per delivered hardware interrupt.
pub struct Dispatcher<'h, C> {
    controller: C,
    registry: HandlerRegistry<'h>,
}

impl<'h, C: InterruptController> Dispatcher<'h, C> {
    /// Creates a dispatcher with an empty handler table.
    pub fn new(controller: C) -> Self {
        Self {
            controller,
            registry: HandlerRegistry::new(),
        }
    }

    /// Resets the handler table, then remaps and masks the controller.
    ///
    /// The table is cleared first so that a spurious interrupt arriving during
    /// bring-up finds nothing to call.
    pub fn bring_up(&mut self) {
        self.registry.reset();
        self.controller.initialize();
        log::info!("interrupt controller initialized");
    }

    /// Installs `handler` for `irq`, replacing any previous one.
    pub fn register(&mut self, irq: Irq, handler: &'h dyn IrqHandler) {
        self.registry.register(irq, handler);
        log::debug!("IRQ {} -> vector {:#04x} registered", irq.line(), irq.vector());
    }

    /// Acknowledges the interrupt and runs the handler registered for its line.
    ///
    /// Returns the line whose handler ran. Vectors outside the 16 PIC lines and
    /// lines without a handler are acknowledged and dropped.
    pub fn dispatch(&mut self, frame: &TrapFrame) -> Option<Irq> {
        self.controller.end_of_interrupt(frame.vector);

        let irq = match Irq::from_vector(frame.vector) {
            Ok(irq) => irq,
            Err(err) => {
                log::trace!("dropping interrupt: {}", err);
                return None;
            }
        };

        match self.registry.lookup(irq) {
            Some(handler) => {
                handler.handle(irq, frame);
                Some(irq)
            }
            None => {
                log::trace!("no handler for IRQ {}", irq.line());
                None
            }
        }
    }

    /// The handler table.
    pub fn registry(&self) -> &HandlerRegistry<'h> {
        &self.registry
    }

    /// The interrupt controller.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Mutable access to the interrupt controller, e.g. to unmask a line.
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupts::pic::{Pic8259, END_OF_INTERRUPT, MASTER_COMMAND, SLAVE_COMMAND};
    use crate::testutil::{CountingHandler, RecordingPorts};
    use theos_common::IRQ_LINES;

    type TestDispatcher<'h> = Dispatcher<'h, Pic8259<RecordingPorts>>;

    fn dispatcher<'h>() -> TestDispatcher<'h> {
        Dispatcher::new(Pic8259::new(RecordingPorts::new()))
    }

    #[test]
    fn test_dispatch_reaches_only_its_handler() {
        let handlers: [CountingHandler; IRQ_LINES] = Default::default();
        let mut dispatcher = dispatcher();
        for (irq, handler) in Irq::all().zip(handlers.iter()) {
            dispatcher.register(irq, handler);
        }

        for target in Irq::all() {
            let before: [usize; IRQ_LINES] = core::array::from_fn(|i| handlers[i].count());

            let ran = dispatcher.dispatch(&TrapFrame::new(target.vector()));

            assert_eq!(ran, Some(target));
            for irq in Irq::all() {
                let expected = before[irq.index()] + usize::from(irq == target);
                assert_eq!(handlers[irq.index()].count(), expected);
            }
            assert_eq!(handlers[target.index()].last_irq(), Some(target));
        }
    }

    #[test]
    fn test_handler_sees_frame() {
        let handler = CountingHandler::default();
        let mut dispatcher = dispatcher();
        dispatcher.register(Irq::KEYBOARD, &handler);

        let mut frame = TrapFrame::new(0x21);
        frame.instruction_pointer = 0xdead_beef;
        dispatcher.dispatch(&frame);

        assert_eq!(handler.last_instruction_pointer(), 0xdead_beef);
    }

    #[test]
    fn test_unregistered_line_is_dropped() {
        let handler = CountingHandler::default();
        let mut dispatcher = dispatcher();
        dispatcher.register(Irq::KEYBOARD, &handler);

        assert_eq!(dispatcher.dispatch(&TrapFrame::new(Irq::TIMER.vector())), None);
        assert_eq!(handler.count(), 0);
        assert_eq!(
            dispatcher.controller().ports().writes(),
            &[(MASTER_COMMAND, END_OF_INTERRUPT)]
        );
    }

    #[test]
    fn test_out_of_range_vectors_are_acknowledged_and_dropped() {
        let handlers: [CountingHandler; IRQ_LINES] = Default::default();
        let mut dispatcher = dispatcher();
        for (irq, handler) in Irq::all().zip(handlers.iter()) {
            dispatcher.register(irq, handler);
        }

        for vector in [0x00, 0x1F, 0x30, 0x80, 0xFF] {
            assert_eq!(dispatcher.dispatch(&TrapFrame::new(vector)), None);
        }

        assert!(handlers.iter().all(|h| h.count() == 0));
        // 0x30, 0x80 and 0xFF sit above the slave base and get a slave EOI too.
        assert_eq!(dispatcher.controller().ports().writes().len(), 2 + 2 * 3);
    }

    #[test]
    fn test_slave_acknowledged_before_master() {
        let handler = CountingHandler::default();
        let mut dispatcher = dispatcher();
        let irq = Irq::new(12).unwrap();
        dispatcher.register(irq, &handler);

        dispatcher.dispatch(&TrapFrame::new(irq.vector()));

        assert_eq!(
            dispatcher.controller().ports().writes(),
            &[
                (SLAVE_COMMAND, END_OF_INTERRUPT),
                (MASTER_COMMAND, END_OF_INTERRUPT)
            ]
        );
        assert_eq!(handler.count(), 1);
    }

    #[test]
    fn test_bring_up_clears_handlers() {
        let handler = CountingHandler::default();
        let mut dispatcher = dispatcher();
        dispatcher.register(Irq::KEYBOARD, &handler);

        dispatcher.bring_up();

        assert!(dispatcher.registry().lookup(Irq::KEYBOARD).is_none());
        assert_eq!(dispatcher.dispatch(&TrapFrame::new(0x21)), None);
        assert_eq!(handler.count(), 0);
        assert_eq!(dispatcher.controller().ports().writes().len(), 10 + 1);
    }
}
