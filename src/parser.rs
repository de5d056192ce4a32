//! Chunk-spanning lexer and command parser.
//!
//! `process` walks one chunk, dispatching on the first byte of each token:
//! commands (`i`, `o`, `p`, `s`, `P`), quoted strings, and number literals.
//! A token cut off by the chunk end suspends parsing in a stream segment
//! (the caller re-presents the unread tail with its next chunk) and is an
//! error in a last segment. A quoted data string additionally records that
//! it is mid-string, so the next chunk resumes in string mode at byte 0.

use crate::chars;
use crate::context::Context;
use crate::escape::{find_closing_quote, unescape_quoted, Unescape};
use crate::trace_event;
use crate::types::{DataSegment, DataType, Endianness, InputSpec};

/// Upper bound on the `o` command's print width. Keeps a stray huge number
/// from turning one group into megabytes of padding.
const MAX_TEXT_WIDTH: usize = 4096;

/// The parser's view of the caller's chunk.
struct SourceView<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

/// Drive the lexer over one chunk. See [`Context::process`] for the public
/// contract; this returns the same `Some(first_unconsumed)` / `None`.
pub(crate) fn process(
    ctx: &mut Context<'_>,
    data: &mut [u8],
    segment: DataSegment,
) -> Option<usize> {
    trace_event!("process chunk of {} bytes ({:?})", data.len(), segment);
    if ctx.is_error() {
        return None;
    }
    if data.is_empty() {
        // An empty terminal chunk still has to close out a spanning string.
        if ctx.spanning_string && segment == DataSegment::Last {
            ctx.spanning_string = false;
            ctx.notify_error("Unterminated string");
            return None;
        }
        return Some(0);
    }

    ctx.segment = segment;
    ctx.at_end_of_input = false;
    ctx.keep_parsing = true;

    // Binary input degenerates: no tokens, the chunk is all payload. A
    // cross-endian partial trailing group may be left unconsumed for the
    // caller's carry.
    if ctx.input.data_type == DataType::Binary {
        let consumed = ctx.put_binary_chunk(data);
        return if ctx.is_error() { None } else { Some(consumed) };
    }

    let mut src = SourceView { buf: data, pos: 0 };

    if ctx.spanning_string {
        ctx.spanning_string = false;
        string_body(ctx, &mut src, 0);
    }

    while ctx.keep_parsing && !ctx.at_end_of_input && src.pos < src.buf.len() {
        match src.buf[src.pos] {
            ch if chars::is_whitespace(ch) => src.pos += 1,
            b'"' => on_string(ctx, &mut src),
            b'i' => on_input_type(ctx, &mut src),
            b'o' => on_output_type(ctx, &mut src),
            b'p' => on_prefix(ctx, &mut src),
            b's' => on_suffix(ctx, &mut src),
            b'P' => on_preset(ctx, &mut src),
            ch if chars::is_numeric_start(ch) => on_number(ctx, &mut src),
            _ => on_unknown_token(ctx, &mut src),
        }
    }

    if ctx.is_error() {
        None
    } else {
        Some(src.pos)
    }
}

// ── Token scanning ────────────────────────────────────────────────────────────

/// Index of the first whitespace byte at or after `from`, or `None` when the
/// token runs to the chunk end (which also marks end of input).
fn find_token_end(ctx: &mut Context<'_>, buf: &[u8], from: usize) -> Option<usize> {
    for (i, &ch) in buf.iter().enumerate().skip(from) {
        if chars::is_whitespace(ch) {
            return Some(i);
        }
    }
    ctx.at_end_of_input = true;
    None
}

/// Commands must be whitespace-terminated: mid-stream the unread token is
/// carried to the next chunk, and in a last segment an unterminated command
/// is an error because the parser cannot tell whether it is complete.
fn command_token_end(ctx: &mut Context<'_>, buf: &[u8], from: usize) -> Option<usize> {
    match find_token_end(ctx, buf, from) {
        Some(end) => Some(end),
        None => {
            if ctx.segment == DataSegment::Last {
                ctx.notify_error(format!(
                    "{}: truncated command",
                    String::from_utf8_lossy(&buf[from..])
                ));
            } else {
                ctx.stop_parsing();
            }
            None
        }
    }
}

// ── Command events ────────────────────────────────────────────────────────────

fn on_input_type(ctx: &mut Context<'_>, src: &mut SourceView<'_>) {
    let start = src.pos;
    let Some(end) = command_token_end(ctx, src.buf, start) else {
        return;
    };
    match parse_input_command(&src.buf[start..end]) {
        Ok(spec) => {
            ctx.set_input_type(spec);
            src.pos = end + 1;
        }
        Err(message) => ctx.notify_error(message),
    }
}

fn on_output_type(ctx: &mut Context<'_>, src: &mut SourceView<'_>) {
    let start = src.pos;
    let Some(end) = command_token_end(ctx, src.buf, start) else {
        return;
    };
    match parse_output_command(&src.buf[start..end]) {
        Ok((data_type, data_width, endianness, text_width)) => {
            ctx.set_output_type(data_type, data_width, endianness, text_width);
            if ctx.keep_parsing {
                src.pos = end + 1;
            }
        }
        Err(message) => ctx.notify_error(message),
    }
}

fn on_preset(ctx: &mut Context<'_>, src: &mut SourceView<'_>) {
    let start = src.pos;
    let Some(end) = command_token_end(ctx, src.buf, start) else {
        return;
    };
    if end - start < 2 {
        ctx.notify_error("Missing preset value");
        return;
    }
    ctx.apply_preset(src.buf[start + 1]);
    if ctx.keep_parsing {
        src.pos = end + 1;
    }
}

fn on_prefix(ctx: &mut Context<'_>, src: &mut SourceView<'_>) {
    if let Some(content) = quoted_parameter(ctx, src) {
        ctx.set_prefix(content);
    }
}

fn on_suffix(ctx: &mut Context<'_>, src: &mut SourceView<'_>) {
    if let Some(content) = quoted_parameter(ctx, src) {
        ctx.set_suffix(content);
    }
}

/// Shared body of the `p` and `s` commands: a quoted string immediately
/// after the command letter.
///
/// The closing quote is located with a non-mutating scan before any
/// unescaping happens, so that a string cut off by a stream chunk end can
/// rewind to the command letter and be re-presented intact.
fn quoted_parameter(ctx: &mut Context<'_>, src: &mut SourceView<'_>) -> Option<Vec<u8>> {
    let start = src.pos;
    if src.buf.get(start + 1) != Some(&b'"') {
        let end = find_token_end(ctx, src.buf, start).unwrap_or(src.buf.len());
        ctx.notify_error(format!(
            "{}: Not a string",
            String::from_utf8_lossy(&src.buf[start + 1..end])
        ));
        return None;
    }

    let body = start + 2;
    let Some(quote) = find_closing_quote(src.buf, body) else {
        if ctx.segment == DataSegment::Last {
            ctx.notify_error("Unterminated string");
        } else {
            ctx.stop_parsing();
        }
        return None;
    };

    match unescape_quoted(&mut src.buf[..=quote], body) {
        Unescape::Complete { content_end, resume } => {
            let content = src.buf[body..content_end].to_vec();
            src.pos = resume;
            Some(content)
        }
        Unescape::Invalid { message, .. } => {
            ctx.notify_error(message);
            None
        }
        // The quote exists, so an escape that claims to run past it is
        // malformed, not waiting for input.
        Unescape::Incomplete { reason, .. } => {
            ctx.notify_error(reason);
            None
        }
    }
}

// ── Data events ───────────────────────────────────────────────────────────────

fn on_string(ctx: &mut Context<'_>, src: &mut SourceView<'_>) {
    let start = src.pos + 1;
    string_body(ctx, src, start);
}

/// Decode string content beginning at `start` (just past the opening quote,
/// or 0 when resuming a spanning string) and feed it to the work buffer.
fn string_body(ctx: &mut Context<'_>, src: &mut SourceView<'_>, start: usize) {
    match unescape_quoted(src.buf, start) {
        Unescape::Complete { content_end, resume } => {
            if content_end > start {
                ctx.put_string(&src.buf[start..content_end]);
            }
            src.pos = resume;
        }
        Unescape::Incomplete {
            content_end,
            carry_from,
            reason,
        } => {
            if ctx.segment == DataSegment::Last {
                ctx.notify_error(reason);
                return;
            }
            if content_end > start {
                ctx.put_string(&src.buf[start..content_end]);
                if !ctx.keep_parsing {
                    return;
                }
            }
            ctx.spanning_string = true;
            ctx.stop_parsing();
            src.pos = carry_from;
        }
        Unescape::Invalid { message, .. } => ctx.notify_error(message),
    }
}

fn on_number(ctx: &mut Context<'_>, src: &mut SourceView<'_>) {
    let start = src.pos;
    match find_token_end(ctx, src.buf, start) {
        Some(end) => {
            ctx.put_number(&src.buf[start..end]);
            if ctx.keep_parsing {
                src.pos = end + 1;
            }
        }
        None => {
            if ctx.segment == DataSegment::Stream {
                // The number might continue in the next chunk.
                ctx.stop_parsing();
            } else {
                ctx.put_number(&src.buf[start..]);
                if ctx.keep_parsing {
                    src.pos = src.buf.len();
                }
            }
        }
    }
}

fn on_unknown_token(ctx: &mut Context<'_>, src: &mut SourceView<'_>) {
    let start = src.pos;
    let end = find_token_end(ctx, src.buf, start).unwrap_or(src.buf.len());
    ctx.notify_error(format!(
        "{}: Unknown token",
        String::from_utf8_lossy(&src.buf[start..end])
    ));
}

// ── Command grammar ───────────────────────────────────────────────────────────

fn parse_data_type(token: &[u8], offset: usize) -> Result<DataType, String> {
    match token.get(offset) {
        None => Err(format!(
            "{}: offset {}: Missing data type",
            String::from_utf8_lossy(token),
            offset
        )),
        Some(b'B') => Ok(DataType::Binary),
        Some(b'i') => Ok(DataType::Int),
        Some(b'h') => Ok(DataType::Hex),
        Some(b'o') => Ok(DataType::Octal),
        Some(b'b') => Ok(DataType::Boolean),
        Some(b'f') => Ok(DataType::Float),
        Some(b'd') => Ok(DataType::Decimal),
        Some(b's') => Ok(DataType::String),
        Some(&other) => Err(format!(
            "{}: offset {}: {} is not a valid data type",
            String::from_utf8_lossy(token),
            offset,
            other as char
        )),
    }
}

/// Widths are 1, 2, 4, 8, or 16; any other digit run is rejected with the
/// number it spelled.
fn parse_data_width(token: &[u8], offset: usize) -> Result<(usize, usize), String> {
    let bad_width = |offset: usize| {
        let digits: String = token[offset..]
            .iter()
            .take_while(|d| d.is_ascii_digit())
            .map(|&d| d as char)
            .collect();
        format!(
            "{}: offset {}: {} is not a valid data width",
            String::from_utf8_lossy(token),
            offset,
            digits
        )
    };
    match token.get(offset) {
        None => Err(format!(
            "{}: offset {}: Missing data width",
            String::from_utf8_lossy(token),
            offset
        )),
        Some(b'1') => match token.get(offset + 1) {
            Some(b'6') => Ok((16, offset + 2)),
            Some(d) if d.is_ascii_digit() => Err(bad_width(offset)),
            _ => Ok((1, offset + 1)),
        },
        Some(b'2') => Ok((2, offset + 1)),
        Some(b'4') => Ok((4, offset + 1)),
        Some(b'8') => Ok((8, offset + 1)),
        Some(d) if d.is_ascii_digit() => Err(bad_width(offset)),
        Some(_) => Err(format!(
            "{}: offset {}: Not a valid data width",
            String::from_utf8_lossy(token),
            offset
        )),
    }
}

fn parse_endianness(token: &[u8], offset: usize) -> Result<Endianness, String> {
    match token.get(offset) {
        None => Err(format!(
            "{}: offset {}: Missing endianness",
            String::from_utf8_lossy(token),
            offset
        )),
        Some(b'b') => Ok(Endianness::Big),
        Some(b'l') => Ok(Endianness::Little),
        Some(&other) => Err(format!(
            "{}: offset {}: {} is not a valid endianness",
            String::from_utf8_lossy(token),
            offset,
            other as char
        )),
    }
}

fn verify_data_width(data_type: DataType, width: usize) -> Result<(), String> {
    if width < data_type.min_width() {
        return Err(format!(
            "Width {} cannot be used with data type {}",
            width,
            data_type.name()
        ));
    }
    Ok(())
}

/// `i TYPE WIDTH? ENDIAN?`. Endianness is required for multi-byte widths
/// and for boolean, optional for one-byte widths, absent for strings.
fn parse_input_command(token: &[u8]) -> Result<InputSpec, String> {
    let data_type = parse_data_type(token, 1)?;
    let mut offset = 2;
    let mut data_width = 1;
    let mut endianness = Endianness::None;

    if data_type != DataType::String {
        let (width, next) = parse_data_width(token, offset)?;
        data_width = width;
        offset = next;

        if data_width > 1 || data_type == DataType::Boolean {
            endianness = parse_endianness(token, offset)?;
            offset += 1;
        } else if matches!(token.get(offset), Some(b'l') | Some(b'b')) {
            // Optional on one-byte widths, where byte order is moot.
            endianness = if token[offset] == b'b' {
                Endianness::Big
            } else {
                Endianness::Little
            };
            offset += 1;
        }
    }

    if offset != token.len() {
        return Err(format!(
            "{}: offset {}: unexpected characters after command",
            String::from_utf8_lossy(token),
            offset
        ));
    }
    verify_data_width(data_type, data_width)?;
    Ok(InputSpec {
        data_type,
        data_width,
        endianness,
    })
}

/// `o TYPE WIDTH? ENDIAN? PRINTWIDTH?`. Endianness is additionally required
/// whenever more characters follow the width, because a print width can only
/// come after it. Binary output takes no print width.
fn parse_output_command(token: &[u8]) -> Result<(DataType, usize, Endianness, usize), String> {
    let data_type = parse_data_type(token, 1)?;
    let mut offset = 2;
    let mut data_width = 1;
    let mut endianness = Endianness::None;
    let mut text_width = 1usize;

    if data_type != DataType::String {
        let (width, next) = parse_data_width(token, offset)?;
        data_width = width;
        offset = next;

        if data_width > 1 || data_type == DataType::Boolean || offset < token.len() {
            endianness = parse_endianness(token, offset)?;
            offset += 1;

            if data_type != DataType::Binary && offset < token.len() {
                let digits = &token[offset..];
                if !digits.iter().all(|d| chars::is_decimal_digit(*d)) {
                    return Err(format!(
                        "{}: offset {}: Not a valid print width",
                        String::from_utf8_lossy(token),
                        offset
                    ));
                }
                text_width = core::str::from_utf8(digits)
                    .ok()
                    .and_then(|d| d.parse::<usize>().ok())
                    .filter(|&w| w <= MAX_TEXT_WIDTH)
                    .ok_or_else(|| {
                        format!(
                            "{}: offset {}: Not a valid print width",
                            String::from_utf8_lossy(token),
                            offset
                        )
                    })?;
                offset = token.len();
            }
        }
    }

    if offset != token.len() {
        return Err(format!(
            "{}: offset {}: unexpected characters after command",
            String::from_utf8_lossy(token),
            offset
        ));
    }
    verify_data_width(data_type, data_width)?;
    if data_type == DataType::Binary {
        text_width = 0;
    }
    Ok((data_type, data_width, endianness, text_width))
}
