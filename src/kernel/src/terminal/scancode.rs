//! PS/2 scan code set 1 translation.
//!
//! Make codes press a key, break codes (high bit set) release it. Only the two
//! shift keys have release semantics; caps lock toggles on press.

/// Bit that marks a break (key release) code.
pub const BREAK_BIT: u8 = 0x80;

/// Backspace make code.
pub const BACKSPACE: u8 = 0x0E;
/// Enter make code.
pub const ENTER: u8 = 0x1C;
/// Left shift make code.
pub const LEFT_SHIFT: u8 = 0x2A;
/// Right shift make code.
pub const RIGHT_SHIFT: u8 = 0x36;
/// Space bar make code.
pub const SPACE: u8 = 0x39;
/// Caps lock make code.
pub const CAPS_LOCK: u8 = 0x3A;

/// What a single scancode means to the line editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable ASCII character.
    Char(u8),
    /// Finish the current line.
    Enter,
    /// Erase the previous character.
    Backspace,
    /// Nothing to do: a release, a modifier, or an unmapped key.
    None,
}

/// Modifier latches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latches {
    /// Held while either shift key is down.
    pub shift: bool,
    /// Toggled by every caps lock press.
    pub caps: bool,
}

enum Glyph {
    /// Uppercased when shift or caps is latched.
    Letter(u8),
    /// Shift selects the alternate glyph; caps lock has no effect.
    Symbol { plain: u8, shifted: u8 },
}

const fn sym(plain: u8, shifted: u8) -> Option<Glyph> {
    Some(Glyph::Symbol { plain, shifted })
}

const fn letter(c: u8) -> Option<Glyph> {
    Some(Glyph::Letter(c))
}

fn glyph(scancode: u8) -> Option<Glyph> {
    match scancode {
        0x02 => sym(b'1', b'!'),
        0x03 => sym(b'2', b'"'),
        0x04 => sym(b'3', b'#'),
        0x05 => sym(b'4', b'$'),
        0x06 => sym(b'5', b'%'),
        0x07 => sym(b'6', b'&'),
        0x08 => sym(b'7', b'/'),
        0x09 => sym(b'8', b'('),
        0x0A => sym(b'9', b')'),
        0x0B => sym(b'0', b'='),
        0x0C => sym(b'-', b'_'),
        0x0D => sym(b'=', b'='),
        0x10 => letter(b'q'),
        0x11 => letter(b'w'),
        0x12 => letter(b'e'),
        0x13 => letter(b'r'),
        0x14 => letter(b't'),
        0x15 => letter(b'y'),
        0x16 => letter(b'u'),
        0x17 => letter(b'i'),
        0x18 => letter(b'o'),
        0x19 => letter(b'p'),
        0x1E => letter(b'a'),
        0x1F => letter(b's'),
        0x20 => letter(b'd'),
        0x21 => letter(b'f'),
        0x22 => letter(b'g'),
        0x23 => letter(b'h'),
        0x24 => letter(b'j'),
        0x25 => letter(b'k'),
        0x26 => letter(b'l'),
        0x28 => sym(b'<', b'>'),
        0x2B => sym(b'`', b'\\'),
        0x2C => letter(b'z'),
        0x2D => letter(b'x'),
        0x2E => letter(b'c'),
        0x2F => letter(b'v'),
        0x30 => letter(b'b'),
        0x31 => letter(b'n'),
        0x32 => letter(b'm'),
        0x33 => sym(b',', b';'),
        0x34 => sym(b'.', b':'),
        0x35 => sym(b'/', b'/'),
        SPACE => sym(b' ', b' '),
        // keypad
        0x4A => sym(b'-', b'-'),
        0x4E => sym(b'+', b'+'),
        _ => None,
    }
}

/// Maps a make code to its character under the given latches.
///
/// Pure: the result depends only on the arguments.
pub fn translate(scancode: u8, latches: Latches) -> Option<u8> {
    match glyph(scancode)? {
        Glyph::Letter(c) if latches.shift || latches.caps => Some(c.to_ascii_uppercase()),
        Glyph::Letter(c) => Some(c),
        Glyph::Symbol { shifted, .. } if latches.shift => Some(shifted),
        Glyph::Symbol { plain, .. } => Some(plain),
    }
}

fn is_shift(code: u8) -> bool {
    code == LEFT_SHIFT || code == RIGHT_SHIFT
}

/// Stateful decoder from raw scancodes to [`Key`]s.
#[derive(Debug, Default)]
pub struct Translator {
    latches: Latches,
}

impl Translator {
    /// Creates a translator with both latches released.
    pub const fn new() -> Self {
        Self {
            latches: Latches {
                shift: false,
                caps: false,
            },
        }
    }

    /// Current modifier state.
    pub fn latches(&self) -> Latches {
        self.latches
    }

    /// Consumes one raw byte from the keyboard data port.
    pub fn feed(&mut self, scancode: u8) -> Key {
        if scancode & BREAK_BIT != 0 {
            if is_shift(scancode & !BREAK_BIT) {
                self.latches.shift = false;
            }
            return Key::None;
        }

        match scancode {
            code if is_shift(code) => {
                self.latches.shift = true;
                Key::None
            }
            CAPS_LOCK => {
                self.latches.caps = !self.latches.caps;
                Key::None
            }
            ENTER => Key::Enter,
            BACKSPACE => Key::Backspace,
            code => translate(code, self.latches).map_or(Key::None, Key::Char),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_LATCHES: [Latches; 4] = [
        Latches {
            shift: false,
            caps: false,
        },
        Latches {
            shift: true,
            caps: false,
        },
        Latches {
            shift: false,
            caps: true,
        },
        Latches {
            shift: true,
            caps: true,
        },
    ];

    #[test]
    fn test_translate_is_deterministic() {
        for latches in ALL_LATCHES {
            for code in 0..BREAK_BIT {
                assert_eq!(translate(code, latches), translate(code, latches));
            }
        }
    }

    #[test]
    fn test_letters_use_or_of_latches() {
        let a = 0x1E;
        assert_eq!(translate(a, ALL_LATCHES[0]), Some(b'a'));
        assert_eq!(translate(a, ALL_LATCHES[1]), Some(b'A'));
        assert_eq!(translate(a, ALL_LATCHES[2]), Some(b'A'));
        // Both latched still gives uppercase.
        assert_eq!(translate(a, ALL_LATCHES[3]), Some(b'A'));
    }

    #[test]
    fn test_symbols_ignore_caps() {
        assert_eq!(translate(0x02, ALL_LATCHES[2]), Some(b'1'));
        assert_eq!(translate(0x02, ALL_LATCHES[1]), Some(b'!'));
        assert_eq!(translate(0x08, ALL_LATCHES[1]), Some(b'/'));
        assert_eq!(translate(0x0B, ALL_LATCHES[1]), Some(b'='));
        assert_eq!(translate(0x0D, ALL_LATCHES[1]), Some(b'='));
        assert_eq!(translate(0x34, ALL_LATCHES[3]), Some(b':'));
    }

    #[test]
    fn test_unmapped_codes() {
        // Escape, tab, brackets, ctrl, F1.
        for code in [0x01, 0x0F, 0x1A, 0x1B, 0x1D, 0x3B] {
            assert_eq!(translate(code, Latches::default()), None);
        }
        let mut translator = Translator::new();
        assert_eq!(translator.feed(0x01), Key::None);
    }

    #[test]
    fn test_shift_press_and_release() {
        for shift in [LEFT_SHIFT, RIGHT_SHIFT] {
            let mut translator = Translator::new();

            assert_eq!(translator.feed(shift), Key::None);
            assert!(translator.latches().shift);
            assert_eq!(translator.feed(0x10), Key::Char(b'Q'));

            assert_eq!(translator.feed(shift | BREAK_BIT), Key::None);
            assert!(!translator.latches().shift);
            assert_eq!(translator.feed(0x10), Key::Char(b'q'));
        }
    }

    #[test]
    fn test_other_releases_ignored() {
        let mut translator = Translator::new();
        translator.feed(CAPS_LOCK);
        translator.feed(LEFT_SHIFT);

        assert_eq!(translator.feed(CAPS_LOCK | BREAK_BIT), Key::None);
        assert_eq!(translator.feed(0x1E | BREAK_BIT), Key::None);

        assert_eq!(
            translator.latches(),
            Latches {
                shift: true,
                caps: true
            }
        );
    }

    #[test]
    fn test_caps_lock_toggles() {
        let mut translator = Translator::new();
        let original = translator.latches().caps;

        translator.feed(CAPS_LOCK);
        assert_ne!(translator.latches().caps, original);
        assert_eq!(translator.feed(0x23), Key::Char(b'H'));

        translator.feed(CAPS_LOCK);
        assert_eq!(translator.latches().caps, original);
        assert_eq!(translator.feed(0x23), Key::Char(b'h'));
    }

    #[test]
    fn test_editing_keys() {
        let mut translator = Translator::new();
        assert_eq!(translator.feed(ENTER), Key::Enter);
        assert_eq!(translator.feed(BACKSPACE), Key::Backspace);
        assert_eq!(translator.feed(SPACE), Key::Char(b' '));
    }
}
