//! Character classification for the lexer.
//!
//! A 256-entry flag table built at compile time. The lexer uses it to decide
//! where tokens start and end; the string unescaper uses it to bound octal
//! and hex escape digits.

use bitflags::bitflags;

bitflags! {
    /// Classification bits for a single input byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CharFlags: u16 {
        /// Control character (0x00–0x1f, 0x7f).
        const CONTROL      = 1 << 0;
        /// Token separator: space, tab, newline, vertical tab, form feed, CR.
        const WHITESPACE   = 1 << 1;
        const BASE_2       = 1 << 2;
        const BASE_8       = 1 << 3;
        const BASE_10      = 1 << 4;
        const BASE_16      = 1 << 5;
        /// Digits plus `+`, `-`, `.`, `e`, `E`: anything that can appear in
        /// a floating-point literal.
        const FP_NUMBER    = 1 << 6;
        const ALPHANUMERIC = 1 << 7;
        const SYMBOL       = 1 << 8;
        /// Single-byte printable glyph (`!`..`~`).
        const PRINTABLE    = 1 << 9;
    }
}

static CHARACTER_FLAGS: [u16; 256] = build_table();

const fn set_range(mut table: [u16; 256], lo: u8, hi: u8, flag: u16) -> [u16; 256] {
    let mut ch = lo as usize;
    while ch <= hi as usize {
        table[ch] |= flag;
        ch += 1;
    }
    table
}

const fn set_chars(mut table: [u16; 256], chars: &[u8], flag: u16) -> [u16; 256] {
    let mut i = 0;
    while i < chars.len() {
        table[chars[i] as usize] |= flag;
        i += 1;
    }
    table
}

const fn build_table() -> [u16; 256] {
    let mut t = [0u16; 256];
    t = set_chars(t, b" \t\n\x0b\x0c\r", CharFlags::WHITESPACE.bits());
    t = set_range(t, 0x00, 0x1f, CharFlags::CONTROL.bits());
    t[0x7f] |= CharFlags::CONTROL.bits();
    t = set_range(t, b'0', b'1', CharFlags::BASE_2.bits());
    t = set_range(t, b'0', b'7', CharFlags::BASE_8.bits());
    t = set_range(t, b'0', b'9', CharFlags::BASE_10.bits());
    t = set_range(t, b'0', b'9', CharFlags::BASE_16.bits());
    t = set_range(t, b'a', b'f', CharFlags::BASE_16.bits());
    t = set_range(t, b'A', b'F', CharFlags::BASE_16.bits());
    t = set_range(t, b'0', b'9', CharFlags::FP_NUMBER.bits());
    t = set_chars(t, b"+-.eE", CharFlags::FP_NUMBER.bits());
    t = set_range(t, b'0', b'9', CharFlags::ALPHANUMERIC.bits());
    t = set_range(t, b'a', b'z', CharFlags::ALPHANUMERIC.bits());
    t = set_range(t, b'A', b'Z', CharFlags::ALPHANUMERIC.bits());
    t = set_range(t, b'!', b'/', CharFlags::SYMBOL.bits());
    t = set_range(t, b':', b'@', CharFlags::SYMBOL.bits());
    t = set_range(t, b'[', b'`', CharFlags::SYMBOL.bits());
    t = set_range(t, b'{', b'~', CharFlags::SYMBOL.bits());
    t = set_range(t, b'!', b'~', CharFlags::PRINTABLE.bits());
    t
}

/// Flags for one byte.
#[inline]
pub fn flags(ch: u8) -> CharFlags {
    CharFlags::from_bits_retain(CHARACTER_FLAGS[ch as usize])
}

#[inline]
pub fn is_whitespace(ch: u8) -> bool {
    flags(ch).contains(CharFlags::WHITESPACE)
}

/// True for bytes that can open a number token: floating-point characters
/// plus the base-16 digit letters, so `a`, `cd`, or `-2` all lex as numbers.
#[inline]
pub fn is_numeric_start(ch: u8) -> bool {
    flags(ch).intersects(CharFlags::FP_NUMBER | CharFlags::BASE_16)
}

#[inline]
pub fn is_octal_digit(ch: u8) -> bool {
    flags(ch).contains(CharFlags::BASE_8)
}

#[inline]
pub fn is_decimal_digit(ch: u8) -> bool {
    flags(ch).contains(CharFlags::BASE_10)
}

#[inline]
pub fn is_hex_digit(ch: u8) -> bool {
    flags(ch).contains(CharFlags::BASE_16)
}
