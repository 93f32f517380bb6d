//! Device drivers that hang off the interrupt dispatcher, plus the text screen they echo to.

pub mod keyboard;
pub mod vga;

pub use keyboard::KeyboardDriver;
