//! Command-line shell with input handling.
//!
//! Provides single-line editing over a fixed buffer: characters append at the
//! end, backspace erases the last one, enter runs the line.

use super::commands::{Command, ShellStats};
use super::scancode::Key;
use theos_hal::{Console, Cpu};

/// Capacity of the input line, including the slot a C string would spend on its terminator.
pub const LINE_CAPACITY: usize = 256;

/// Text shown before each input line.
pub const PROMPT: &str = "The...OS> ";

/// Erases the character left of the cursor: cursor left, blank, cursor left.
const DESTRUCTIVE_BACKSPACE: &str = "\x08 \x08";

/// Fixed-capacity input line.
///
/// At most `LINE_CAPACITY - 1` characters are stored; further input is dropped.
pub struct LineBuffer {
    bytes: [u8; LINE_CAPACITY],
    cursor: usize,
}

impl LineBuffer {
    /// Creates an empty line.
    pub const fn new() -> Self {
        Self {
            bytes: [0; LINE_CAPACITY],
            cursor: 0,
        }
    }

    /// Appends a printable ASCII character. Returns `false` if it was dropped.
    pub fn push(&mut self, c: u8) -> bool {
        if self.cursor >= LINE_CAPACITY - 1 || !(c.is_ascii_graphic() || c == b' ') {
            return false;
        }
        self.bytes[self.cursor] = c;
        self.cursor += 1;
        true
    }

    /// Removes the last character. Returns `false` on an empty line.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.bytes[self.cursor] = 0;
        true
    }

    /// Empties the line.
    pub fn clear(&mut self) {
        self.bytes = [0; LINE_CAPACITY];
        self.cursor = 0;
    }

    /// Position of the next character, equal to the line length.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The text typed so far.
    pub fn as_str(&self) -> &str {
        // push() only admits ASCII.
        core::str::from_utf8(&self.bytes[..self.cursor]).unwrap_or_default()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal shell: the input line plus the command counter.
pub struct Terminal {
    line: LineBuffer,
    stats: ShellStats,
}

impl Terminal {
    /// Create a new terminal.
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            stats: ShellStats { commands_run: 0 },
        }
    }

    /// Display the shell prompt.
    pub fn prompt<C: Console>(&self, console: &mut C) {
        console.write_str(PROMPT);
    }

    /// Applies one decoded key, echoing to `console`.
    ///
    /// Enter runs the line through the command table and prints a fresh prompt.
    pub fn handle_key<C: Console, U: Cpu>(&mut self, key: Key, console: &mut C, cpu: &mut U) {
        match key {
            Key::Enter => {
                console.write_str("\n");
                self.submit(console, cpu);
                self.line.clear();
                self.prompt(console);
            }
            Key::Backspace => {
                if self.line.backspace() {
                    console.write_str(DESTRUCTIVE_BACKSPACE);
                }
            }
            Key::Char(c) => {
                if self.line.push(c) {
                    write!(console, "{}", char::from(c));
                }
            }
            Key::None => {}
        }
    }

    fn submit<C: Console, U: Cpu>(&mut self, console: &mut C, cpu: &mut U) {
        let Some(command) = Command::parse(self.line.as_str()) else {
            return;
        };
        self.stats.commands_run += 1;
        log::debug!("command #{}: {:?}", self.stats.commands_run, command);
        command.execute(console, cpu, &self.stats);
    }

    /// The line being edited.
    pub fn line(&self) -> &LineBuffer {
        &self.line
    }

    /// Number of non-empty lines submitted so far.
    pub fn commands_run(&self) -> u32 {
        self.stats.commands_run
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}
