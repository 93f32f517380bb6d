//! VGA text mode writer.
//!
//! Colored text output into an 80x25 text buffer. The bare-metal layer points the
//! writer at 0xB8000; tests point it at an ordinary [`Buffer`] in memory.

use core::fmt;
use core::ptr;
use spin::Mutex;

/// VGA text buffer memory-mapped I/O address.
pub const VGA_BUFFER_ADDR: usize = 0xB8000;

/// Number of rows in VGA text mode.
pub const BUFFER_HEIGHT: usize = 25;

/// Number of columns in VGA text mode.
pub const BUFFER_WIDTH: usize = 80;

/// Moves the cursor one cell left without erasing.
const BACKSPACE: u8 = 0x08;

/// VGA color codes.
///
/// Standard 16-color VGA palette for text mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    /// Black color.
    Black = 0,
    /// Blue color.
    Blue = 1,
    /// Green color.
    Green = 2,
    /// Cyan color.
    Cyan = 3,
    /// Red color.
    Red = 4,
    /// Magenta color.
    Magenta = 5,
    /// Brown color.
    Brown = 6,
    /// Light gray color.
    LightGray = 7,
    /// Dark gray color.
    DarkGray = 8,
    /// Light blue color.
    LightBlue = 9,
    /// Light green color.
    LightGreen = 10,
    /// Light cyan color.
    LightCyan = 11,
    /// Light red color.
    LightRed = 12,
    /// Pink color.
    Pink = 13,
    /// Yellow color.
    Yellow = 14,
    /// White color.
    White = 15,
}

/// Combined foreground and background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
struct ColorCode(u8);

impl ColorCode {
    const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }
}

/// A single character cell in the VGA buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
struct ScreenChar {
    ascii_character: u8,
    color_code: ColorCode,
}

const BLANK: ScreenChar = ScreenChar {
    ascii_character: b' ',
    color_code: ColorCode::new(Color::White, Color::Black),
};

/// The VGA text buffer layout.
#[repr(transparent)]
pub struct Buffer {
    chars: [[ScreenChar; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

impl Buffer {
    /// A buffer full of blanks.
    pub const fn blank() -> Self {
        Self {
            chars: [[BLANK; BUFFER_WIDTH]; BUFFER_HEIGHT],
        }
    }
}

/// VGA text mode writer.
///
/// Output always goes to the bottom row; a newline or a full row scrolls up.
/// Backspace moves the cursor left, and from the first column of a row that was
/// entered by wrapping it scrolls back down to the end of the previous row.
pub struct Writer {
    /// Current column position (0 to BUFFER_WIDTH).
    column_position: usize,
    /// Rows scrolled by wrapping since the last newline.
    wrapped_rows: usize,
    /// Current color code for new characters.
    color_code: ColorCode,
    /// Pointer to the text buffer.
    buffer: *mut Buffer,
}

// SAFETY: Writer only accesses the buffer through volatile operations.
// The buffer exists for the writer's lifetime (see `Writer::new`), and
// access is synchronized through the owning spinlock.
unsafe impl Send for Writer {}

impl Writer {
    /// Creates a writer drawing into `buffer`.
    ///
    /// # Safety
    ///
    /// `buffer` must be valid for reads and writes for as long as the writer lives,
    /// and nothing else may write to it meanwhile.
    pub unsafe fn new(buffer: *mut Buffer) -> Self {
        Writer {
            column_position: 0,
            wrapped_rows: 0,
            color_code: ColorCode::new(Color::White, Color::Black),
            buffer,
        }
    }

    /// Sets the foreground and background colors for subsequent writes.
    pub fn set_color(&mut self, foreground: Color, background: Color) {
        self.color_code = ColorCode::new(foreground, background);
    }

    /// Writes a single byte to the VGA buffer.
    ///
    /// Handles newlines, automatic line wrapping and backspace.
    pub fn write_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => {
                self.wrapped_rows = 0;
                self.new_line();
            }
            BACKSPACE => self.backspace(),
            byte => {
                // Check bounds BEFORE writing to prevent overflow
                if self.column_position >= BUFFER_WIDTH {
                    self.new_line();
                    self.wrapped_rows += 1;
                }

                let col = self.column_position;
                self.write_cell(
                    BUFFER_HEIGHT - 1,
                    col,
                    ScreenChar {
                        ascii_character: byte,
                        color_code: self.color_code,
                    },
                );
                self.column_position += 1;
            }
        }
    }

    fn backspace(&mut self) {
        if self.column_position > 0 {
            self.column_position -= 1;
        } else if self.wrapped_rows > 0 {
            self.wrapped_rows -= 1;
            self.previous_line();
        }
    }

    fn read_cell(&self, row: usize, col: usize) -> ScreenChar {
        // SAFETY: callers pass row < BUFFER_HEIGHT and col < BUFFER_WIDTH, and the
        // buffer pointer is valid per `Writer::new`. Volatile because the VGA
        // buffer is memory-mapped I/O.
        unsafe { ptr::read_volatile(&(*self.buffer).chars[row][col]) }
    }

    fn write_cell(&mut self, row: usize, col: usize, character: ScreenChar) {
        // SAFETY: as in `read_cell`.
        unsafe { ptr::write_volatile(&mut (*self.buffer).chars[row][col], character) }
    }

    /// Scrolls the screen up by one line.
    fn new_line(&mut self) {
        for row in 1..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                let character = self.read_cell(row, col);
                self.write_cell(row - 1, col, character);
            }
        }
        self.clear_row(BUFFER_HEIGHT - 1);
        self.column_position = 0;
    }

    /// Scrolls the screen down by one line, leaving the cursor on the last column.
    ///
    /// The top row comes back blank; whatever scrolled off earlier is gone.
    fn previous_line(&mut self) {
        for row in (1..BUFFER_HEIGHT).rev() {
            for col in 0..BUFFER_WIDTH {
                let character = self.read_cell(row - 1, col);
                self.write_cell(row, col, character);
            }
        }
        self.clear_row(0);
        self.column_position = BUFFER_WIDTH - 1;
    }

    /// Clears a single row by filling it with spaces.
    fn clear_row(&mut self, row: usize) {
        debug_assert!(row < BUFFER_HEIGHT, "row index out of bounds");

        let blank = ScreenChar {
            ascii_character: b' ',
            color_code: self.color_code,
        };
        for col in 0..BUFFER_WIDTH {
            self.write_cell(row, col, blank);
        }
    }

    /// Clears the entire screen.
    pub fn clear_screen(&mut self) {
        for row in 0..BUFFER_HEIGHT {
            self.clear_row(row);
        }
        self.column_position = 0;
        self.wrapped_rows = 0;
    }

    /// The character shown at `row`, `col`.
    pub fn char_at(&self, row: usize, col: usize) -> u8 {
        self.read_cell(row, col).ascii_character
    }

    /// Column the next character lands in.
    pub fn column(&self) -> usize {
        self.column_position
    }
}

impl fmt::Write for Writer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            match byte {
                // Printable ASCII, newline or backspace
                0x20..=0x7e | b'\n' | BACKSPACE => self.write_byte(byte),
                // Non-printable: show placeholder
                _ => self.write_byte(0xfe),
            }
        }
        Ok(())
    }
}

/// Writes `args` to `target` unless someone already holds its lock.
///
/// For contexts that cannot be masked, such as NMI handlers: spinning there on
/// a lock the interrupted code holds never ends. Returns whether anything was written.
pub fn write_if_unlocked<W: fmt::Write>(target: &Mutex<W>, args: fmt::Arguments) -> bool {
    match target.try_lock() {
        Some(mut writer) => writer.write_fmt(args).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    const BOTTOM: usize = BUFFER_HEIGHT - 1;

    fn writer() -> Writer {
        let buffer = Box::leak(Box::new(Buffer::blank()));
        // SAFETY: the leaked buffer lives for the rest of the test process.
        unsafe { Writer::new(buffer) }
    }

    fn row_text(writer: &Writer, row: usize) -> String {
        (0..BUFFER_WIDTH)
            .map(|col| char::from(writer.char_at(row, col)))
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_write_and_newline() {
        let mut w = writer();
        write!(w, "ab\ncd").unwrap();

        assert_eq!(row_text(&w, BOTTOM - 1), "ab");
        assert_eq!(row_text(&w, BOTTOM), "cd");
        assert_eq!(w.column(), 2);
    }

    #[test]
    fn test_backspace_moves_left_within_row() {
        let mut w = writer();
        write!(w, "abc\x08 \x08").unwrap();

        assert_eq!(row_text(&w, BOTTOM), "ab");
        assert_eq!(w.column(), 2);
    }

    #[test]
    fn test_backspace_crosses_wrapped_row() {
        let mut w = writer();
        for _ in 0..BUFFER_WIDTH {
            w.write_byte(b'a');
        }
        w.write_byte(b'b');
        assert_eq!(row_text(&w, BOTTOM), "b");

        // Erase 'b', then the last 'a' on the row above.
        write!(w, "\x08 \x08\x08 \x08").unwrap();

        assert_eq!(w.column(), BUFFER_WIDTH - 1);
        assert_eq!(w.char_at(BOTTOM, BUFFER_WIDTH - 2), b'a');
        assert_eq!(w.char_at(BOTTOM, BUFFER_WIDTH - 1), b' ');
        assert_eq!(row_text(&w, BOTTOM - 1), "");

        // Typing continues where the erased character was.
        w.write_byte(b'c');
        assert_eq!(w.char_at(BOTTOM, BUFFER_WIDTH - 1), b'c');
    }

    #[test]
    fn test_backspace_stops_at_explicit_newline() {
        let mut w = writer();
        write!(w, "ab\n\x08").unwrap();

        assert_eq!(w.column(), 0);
        assert_eq!(row_text(&w, BOTTOM - 1), "ab");
    }

    #[test]
    fn test_write_if_unlocked_never_spins() {
        let target = Mutex::new(String::new());

        let guard = target.lock();
        assert!(!write_if_unlocked(&target, format_args!("lost")));
        drop(guard);

        assert!(write_if_unlocked(&target, format_args!("nmi {}", 2)));
        assert_eq!(*target.lock(), "nmi 2");
    }
}
