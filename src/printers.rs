//! String printers: one renderer per (type, width) pair, interpreting each
//! work-buffer group under the output byte order.
//!
//! Selection is a match on a small enum so that unsupported tuples surface
//! as explicit errors instead of missing table entries.

use core::fmt::Write as _;

use crate::endian::{load_u16, load_u32, load_u64};
use crate::types::{DataType, Endianness, OutputSpec};

/// A selected output renderer. Binary output never reaches a printer; the
/// flush engine moves those bytes directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Printer {
    Int { width: usize },
    Hex { width: usize },
    Octal { width: usize },
    Boolean { width: usize },
    Float { width: usize },
    Str,
}

impl Printer {
    /// Pick the printer for an output spec, or explain why none exists.
    pub fn select(output: &OutputSpec) -> Result<Printer, String> {
        let width = output.data_width;
        match output.data_type {
            DataType::Int => match width {
                1 | 2 | 4 | 8 => Ok(Printer::Int { width }),
                16 => Err("16-byte int output is not implemented".to_owned()),
                _ => Err(format!("{width}: invalid data width")),
            },
            DataType::Hex => match width {
                1 | 2 | 4 | 8 => Ok(Printer::Hex { width }),
                16 => Err("16-byte hex output is not implemented".to_owned()),
                _ => Err(format!("{width}: invalid data width")),
            },
            DataType::Octal => match width {
                1 | 2 | 4 | 8 => Ok(Printer::Octal { width }),
                16 => Err("16-byte octal output is not implemented".to_owned()),
                _ => Err(format!("{width}: invalid data width")),
            },
            DataType::Boolean => match width {
                1 | 2 | 4 | 8 | 16 => Ok(Printer::Boolean { width }),
                _ => Err(format!("{width}: invalid data width")),
            },
            DataType::Float => match width {
                4 | 8 => Ok(Printer::Float { width }),
                2 => Err("2-byte float output is not implemented".to_owned()),
                16 => Err("16-byte float output is not implemented".to_owned()),
                _ => Err(format!("{width}: invalid data width")),
            },
            DataType::Decimal => Err("decimal output is not implemented".to_owned()),
            DataType::String => Ok(Printer::Str),
            DataType::None => Err("Must set output data type before passing data".to_owned()),
            DataType::Binary => Err("binary output does not use a string printer".to_owned()),
        }
    }

    /// Render one group from the front of `src` into `out`, interpreting the
    /// bytes under `endianness`. Returns the number of source bytes
    /// consumed: the fixed width for numeric printers, 1 to 4 bytes for the
    /// string printer.
    pub fn print(
        &self,
        src: &[u8],
        endianness: Endianness,
        text_width: usize,
        out: &mut String,
    ) -> usize {
        match *self {
            Printer::Int { width } => {
                match width {
                    1 => {
                        let _ = write!(out, "{:01$}", src[0] as i8, text_width);
                    }
                    2 => {
                        let _ = write!(out, "{:01$}", load_u16(src, endianness) as i16, text_width);
                    }
                    4 => {
                        let _ = write!(out, "{:01$}", load_u32(src, endianness) as i32, text_width);
                    }
                    _ => {
                        let _ = write!(out, "{:01$}", load_u64(src, endianness) as i64, text_width);
                    }
                }
                width
            }
            Printer::Hex { width } => {
                match width {
                    1 => {
                        let _ = write!(out, "{:01$x}", src[0], text_width);
                    }
                    2 => {
                        let _ = write!(out, "{:01$x}", load_u16(src, endianness), text_width);
                    }
                    4 => {
                        let _ = write!(out, "{:01$x}", load_u32(src, endianness), text_width);
                    }
                    _ => {
                        let _ = write!(out, "{:01$x}", load_u64(src, endianness), text_width);
                    }
                }
                width
            }
            Printer::Octal { width } => {
                match width {
                    1 => {
                        let _ = write!(out, "{:01$o}", src[0], text_width);
                    }
                    2 => {
                        let _ = write!(out, "{:01$o}", load_u16(src, endianness), text_width);
                    }
                    4 => {
                        let _ = write!(out, "{:01$o}", load_u32(src, endianness), text_width);
                    }
                    _ => {
                        let _ = write!(out, "{:01$o}", load_u64(src, endianness), text_width);
                    }
                }
                width
            }
            Printer::Boolean { width } => {
                print_boolean(&src[..width], endianness, text_width, out);
                width
            }
            Printer::Float { width } => {
                if width == 4 {
                    let value = f32::from_bits(load_u32(src, endianness));
                    let _ = write!(out, "{:.1$}", f64::from(value), text_width);
                } else {
                    let value = f64::from_bits(load_u64(src, endianness));
                    let _ = write!(out, "{:.1$}", value, text_width);
                }
                width
            }
            Printer::Str => print_string_byte(src, out),
        }
    }
}

/// Emit every bit of the group. Big-endian prints byte 0 MSB-first;
/// little-endian prints byte 0 LSB-first. A `text_width` wider than the bit
/// count pads with zeros on the left; a narrower one is ignored.
fn print_boolean(group: &[u8], endianness: Endianness, text_width: usize, out: &mut String) {
    let bit_count = group.len() * 8;
    for _ in bit_count..text_width {
        out.push('0');
    }
    for &byte in group {
        if endianness == Endianness::Big {
            for shift in (0..8).rev() {
                out.push(if byte >> shift & 1 == 1 { '1' } else { '0' });
            }
        } else {
            for shift in 0..8 {
                out.push(if byte >> shift & 1 == 1 { '1' } else { '0' });
            }
        }
    }
}

/// Render the next byte (or UTF-8 run) of a string-typed group: named
/// escapes for the classic control characters, `\xHH` for everything else
/// unprintable, verbatim passthrough for printable ASCII and well-formed
/// multibyte UTF-8.
fn print_string_byte(src: &[u8], out: &mut String) -> usize {
    let byte = src[0];
    match byte {
        0x07 => out.push_str("\\a"),
        0x08 => out.push_str("\\b"),
        b'\t' => out.push_str("\\t"),
        b'\n' => out.push_str("\\n"),
        0x0b => out.push_str("\\v"),
        0x0c => out.push_str("\\f"),
        b'\r' => out.push_str("\\r"),
        b'\\' => out.push_str("\\\\"),
        b'"' => out.push_str("\\\""),
        b'?' => out.push_str("\\?"),
        0x20..=0x7e => out.push(byte as char),
        0xc0..=0xf7 => {
            let need = utf8_sequence_len(byte);
            if src.len() >= need {
                if let Ok(text) = core::str::from_utf8(&src[..need]) {
                    out.push_str(text);
                    return need;
                }
            }
            let _ = write!(out, "\\x{byte:02x}");
        }
        _ => {
            let _ = write!(out, "\\x{byte:02x}");
        }
    }
    1
}

/// Expected sequence length for a UTF-8 initiator byte.
fn utf8_sequence_len(initiator: u8) -> usize {
    match initiator {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

/// How many bytes at the end of `buf` belong to a UTF-8 sequence that has
/// not fully arrived. The flush engine holds these back during a non-final
/// flush so a multibyte character is never split across printer calls.
pub fn utf8_holdback(buf: &[u8]) -> usize {
    let len = buf.len();
    for back in 1..=3.min(len) {
        let byte = buf[len - back];
        let need = utf8_sequence_len(byte);
        if need > 1 {
            return if need > back { back } else { 0 };
        }
        if !(0x80..=0xbf).contains(&byte) {
            return 0;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(printer: Printer, src: &[u8], endianness: Endianness, text_width: usize) -> (String, usize) {
        let mut out = String::new();
        let consumed = printer.print(src, endianness, text_width, &mut out);
        (out, consumed)
    }

    #[test]
    fn hex_pads_to_text_width() {
        let (s, n) = render(Printer::Hex { width: 1 }, &[0x0a], Endianness::Little, 2);
        assert_eq!((s.as_str(), n), ("0a", 1));
        let (s, _) = render(Printer::Hex { width: 1 }, &[0xcd], Endianness::Little, 1);
        assert_eq!(s, "cd");
    }

    #[test]
    fn hex_group_respects_output_endianness() {
        let (s, _) = render(Printer::Hex { width: 2 }, &[0x34, 0x12], Endianness::Big, 4);
        assert_eq!(s, "3412");
        let (s, _) = render(Printer::Hex { width: 2 }, &[0x34, 0x12], Endianness::Little, 4);
        assert_eq!(s, "1234");
    }

    #[test]
    fn int_is_signed() {
        let (s, _) = render(Printer::Int { width: 2 }, &[0xfe, 0xff], Endianness::Little, 1);
        assert_eq!(s, "-2");
        let (s, _) = render(Printer::Int { width: 1 }, &[0x0a], Endianness::None, 3);
        assert_eq!(s, "010");
    }

    #[test]
    fn octal_renders_unsigned() {
        let (s, _) = render(Printer::Octal { width: 1 }, &[0x0f], Endianness::None, 1);
        assert_eq!(s, "17");
    }

    #[test]
    fn float_uses_fractional_text_width() {
        let bits = 3.5f32.to_bits().to_le_bytes();
        let (s, _) = render(Printer::Float { width: 4 }, &bits, Endianness::Little, 6);
        assert_eq!(s, "3.500000");

        let bits = 74.125f64.to_bits().to_le_bytes();
        let (s, _) = render(Printer::Float { width: 8 }, &bits, Endianness::Little, 3);
        assert_eq!(s, "74.125");
    }

    #[test]
    fn boolean_bit_order_follows_endianness() {
        let (s, _) = render(Printer::Boolean { width: 2 }, &[0x00, 0x0b], Endianness::Big, 1);
        assert_eq!(s, "0000000000001011");
        let (s, _) = render(Printer::Boolean { width: 2 }, &[0x0b, 0x00], Endianness::Little, 1);
        assert_eq!(s, "1101000000000000");
    }

    #[test]
    fn boolean_pads_but_never_truncates() {
        let (s, _) = render(Printer::Boolean { width: 1 }, &[0x03], Endianness::Big, 12);
        assert_eq!(s, "000000000011");
        let (s, _) = render(Printer::Boolean { width: 1 }, &[0x03], Endianness::Big, 2);
        assert_eq!(s, "00000011");
    }

    #[test]
    fn string_escapes_and_passthrough() {
        let (s, n) = render(Printer::Str, b"A", Endianness::None, 0);
        assert_eq!((s.as_str(), n), ("A", 1));
        let (s, _) = render(Printer::Str, &[0x01], Endianness::None, 0);
        assert_eq!(s, "\\x01");
        let (s, _) = render(Printer::Str, b"\t", Endianness::None, 0);
        assert_eq!(s, "\\t");
        let (s, _) = render(Printer::Str, b"\"", Endianness::None, 0);
        assert_eq!(s, "\\\"");
        let (s, n) = render(Printer::Str, "ß!".as_bytes(), Endianness::None, 0);
        assert_eq!((s.as_str(), n), ("ß", 2));
        // A lone continuation byte is not valid UTF-8.
        let (s, n) = render(Printer::Str, &[0x9f, 0x20], Endianness::None, 0);
        assert_eq!((s.as_str(), n), ("\\x9f", 1));
    }

    #[test]
    fn holdback_detects_split_sequences() {
        assert_eq!(utf8_holdback(b"abc"), 0);
        assert_eq!(utf8_holdback(&[b'a', 0xc3]), 1);
        assert_eq!(utf8_holdback(&[b'a', 0xe2, 0x98]), 2);
        assert_eq!(utf8_holdback("aß".as_bytes()), 0);
        assert_eq!(utf8_holdback("☺".as_bytes()), 0);
    }

    #[test]
    fn selection_rejects_unsupported_tuples() {
        let mut spec = OutputSpec {
            data_type: DataType::Int,
            data_width: 16,
            ..OutputSpec::default()
        };
        assert!(Printer::select(&spec).is_err());
        spec.data_type = DataType::Decimal;
        spec.data_width = 8;
        assert!(Printer::select(&spec).is_err());
        spec.data_type = DataType::Hex;
        spec.data_width = 4;
        assert_eq!(Printer::select(&spec), Ok(Printer::Hex { width: 4 }));
    }
}
