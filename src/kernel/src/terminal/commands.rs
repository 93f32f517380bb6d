//! Built-in shell commands.
//!
//! Command names are case-sensitive and matched against the whole line, except
//! `echo` which takes everything after `"echo "` verbatim.

use theos_hal::{Console, Cpu};

/// Version line printed by `version`.
pub const VERSION_STRING: &str = "myOS version 0.1";

/// Counters the shell reports through `sysinfo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellStats {
    /// Completed non-empty command lines, including unknown ones.
    pub commands_run: u32,
}

/// Shell command types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Display help information.
    Help,
    /// Clear the screen.
    Clear,
    /// Print the OS version.
    Version,
    /// Echo text.
    Echo {
        /// The text to echo.
        text: &'a str,
    },
    /// Raise a CPU exception on purpose.
    Interrupt {
        /// Exception vector to raise (0, 1 or 2).
        vector: u8,
    },
    /// Show system info.
    Sysinfo,
    /// Unknown command.
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parse a completed input line. Returns `None` for an empty line.
    pub fn parse(line: &'a str) -> Option<Command<'a>> {
        if line.is_empty() {
            return None;
        }
        if let Some(text) = line.strip_prefix("echo ") {
            return Some(Command::Echo { text });
        }
        let command = match line {
            "help" => Command::Help,
            "clear" => Command::Clear,
            "version" => Command::Version,
            "int0" => Command::Interrupt { vector: 0 },
            "int1" => Command::Interrupt { vector: 1 },
            "int2" => Command::Interrupt { vector: 2 },
            "sysinfo" => Command::Sysinfo,
            other => Command::Unknown(other),
        };
        Some(command)
    }

    /// Execute a command.
    pub fn execute<C: Console, U: Cpu>(self, console: &mut C, cpu: &mut U, stats: &ShellStats) {
        match self {
            Command::Help => cmd_help(console),
            Command::Clear => console.clear(),
            Command::Version => writeln!(console, "{}", VERSION_STRING),
            Command::Echo { text } => writeln!(console, "{}", text),
            Command::Interrupt { vector } => cmd_interrupt(vector, console, cpu),
            Command::Sysinfo => cmd_sysinfo(console, stats),
            Command::Unknown(line) => {
                writeln!(console, "Unknown command: {}", line);
                writeln!(console, "Type 'help' for available commands");
            }
        }
    }
}

/// Display help information.
fn cmd_help<C: Console>(console: &mut C) {
    console.write_str("Available commands:\n");
    console.write_str("  help     - Display this help message\n");
    console.write_str("  clear    - Clear the screen\n");
    console.write_str("  version  - Display OS version\n");
    console.write_str("  echo     - Echo back text\n");
    console.write_str("  int0     - Test divide-by-zero interrupt\n");
    console.write_str("  int1     - Test debug interrupt\n");
    console.write_str("  int2     - Test NMI interrupt\n");
    console.write_str("  sysinfo  - Shows System information\n");
}

fn cmd_interrupt<C: Console, U: Cpu>(vector: u8, console: &mut C, cpu: &mut U) {
    let name = match vector {
        0 => "divide-by-zero",
        1 => "debug",
        _ => "NMI",
    };
    writeln!(console, "Triggering {} interrupt...", name);
    log::info!("shell raising software interrupt {}", vector);
    cpu.software_interrupt(vector);
}

/// Show system information.
///
/// There is no timer or heap, so uptime and memory use are reported as zero.
fn cmd_sysinfo<C: Console>(console: &mut C, stats: &ShellStats) {
    let uptime_seconds = 0;
    let memory_used_kb = 0;
    console.write_str("System Information\n");
    console.write_str("------------------\n");
    console.write_str("OS Name: myOS\n");
    console.write_str("Version: 0.1\n");
    console.write_str("Architecture: x86_64\n");
    writeln!(console, "Uptime: {} seconds", uptime_seconds);
    writeln!(console, "Commands executed: {}", stats.commands_run);
    writeln!(console, "Memory used: {} KB", memory_used_kb);
}
