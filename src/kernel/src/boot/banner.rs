//! Boot banner and branding.

use theos_hal::Console;

use crate::terminal::commands::VERSION_STRING;

/// Print the boot banner.
pub fn print_banner<C: Console>(console: &mut C) {
    console.write_str("  _____ _           ___  ____  \n");
    console.write_str(" |_   _| |__   ___ / _ \\/ ___| \n");
    console.write_str("   | | | '_ \\ / _ \\ | | \\___ \\ \n");
    console.write_str("   | | | | | |  __/ |_| |___) |\n");
    console.write_str("   |_| |_| |_|\\___|\\___/|____/ \n");
    console.write_str("\n");
    writeln!(console, " {}", VERSION_STRING);
    console.write_str("\n");
}
