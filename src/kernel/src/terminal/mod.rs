//! Terminal subsystem for TheOS.
//!
//! Provides a command-line interface fed directly by the keyboard interrupt.
//!
//! # Architecture
//!
//! - `scancode`: scan code set 1 decoding with shift / caps lock latches
//! - `shell`: line editing and prompt
//! - `commands`: built-in shell commands

pub mod commands;
pub mod scancode;
pub mod shell;

pub use commands::{Command, ShellStats};
pub use scancode::{Key, Latches, Translator};
pub use shell::{LineBuffer, Terminal};
