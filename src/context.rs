//! The translation context: owns the work and output buffers, the active
//! input/output specs, the sink callbacks, and the flush engine that moves
//! bytes from one side to the other.
//!
//! Data flows strictly forward: parser events append raw bytes to the work
//! buffer; the flush engine renders work-buffer groups through a string
//! printer into the output buffer; the output buffer drains to the caller's
//! sink whenever it crosses its high-water mark.

use crate::buffer::ByteBuffer;
use crate::endian;
use crate::parser;
use crate::printers::{utf8_holdback, Printer};
use crate::trace_event;
use crate::types::{
    DataSegment, DataType, Endianness, InputSpec, OutputSpec, NATIVE_ENDIANNESS,
};

// ── Buffer sizing ─────────────────────────────────────────────────────────────

/// Work buffer capacity. Kept a multiple of 16 so group boundaries land on
/// the high-water mark cleanly.
const WORK_BUFFER_SIZE: usize = 1600;

/// Room past the work buffer's high-water mark: enough for 16 bytes of
/// zero-fill behind any partial 16-byte group.
const WORK_BUFFER_OVERHEAD: usize = 32;

const OUTPUT_BUFFER_SIZE: usize = WORK_BUFFER_SIZE * 10;

/// Large enough that no single printer write (floats, 128-bit booleans,
/// escaped string bytes) lands past the end after a high-water drain.
const OUTPUT_BUFFER_OVERHEAD: usize = 100;

/// Output sink. Returning `false` tells the engine to stop; it enters the
/// error state and delivers nothing further.
pub type OutputFn<'a> = Box<dyn FnMut(&[u8]) -> bool + 'a>;

/// Error sink. Receives each error message exactly once.
pub type ErrorFn<'a> = Box<dyn FnMut(&str) + 'a>;

/// A single translation session: feed chunks with [`process`], finish with
/// [`finish`].
///
/// Not shared between threads; all calls are serialized by the owner. The
/// context owns its buffers and the prefix/suffix strings; the chunk passed
/// to `process` is borrowed mutably for the duration of the call.
///
/// [`process`]: Context::process
/// [`finish`]: Context::finish
pub struct Context<'a> {
    pub(crate) input: InputSpec,
    pub(crate) output: OutputSpec,
    work_buffer: ByteBuffer,
    output_buffer: ByteBuffer,
    on_output: OutputFn<'a>,
    on_error: ErrorFn<'a>,

    pub(crate) segment: DataSegment,
    pub(crate) at_end_of_input: bool,
    pub(crate) keep_parsing: bool,
    pub(crate) spanning_string: bool,
    error: bool,
}

impl<'a> Context<'a> {
    /// Create a context that reports output and errors through the given
    /// callbacks. Any state the callbacks need travels inside the closures.
    pub fn new<O, E>(on_output: O, on_error: E) -> Self
    where
        O: FnMut(&[u8]) -> bool + 'a,
        E: FnMut(&str) + 'a,
    {
        trace_event!("new context");
        Context {
            input: InputSpec::default(),
            output: OutputSpec::default(),
            work_buffer: ByteBuffer::new(WORK_BUFFER_SIZE, WORK_BUFFER_OVERHEAD),
            output_buffer: ByteBuffer::new(OUTPUT_BUFFER_SIZE, OUTPUT_BUFFER_OVERHEAD),
            on_output: Box::new(on_output),
            on_error: Box::new(on_error),
            segment: DataSegment::Last,
            at_end_of_input: false,
            keep_parsing: true,
            spanning_string: false,
            error: false,
        }
    }

    /// Feed one chunk of commands and data. `data` is rewritten in place
    /// (string unescaping, see the module docs of [`crate::escape`]).
    ///
    /// Returns the index of the first unconsumed byte; the caller moves
    /// `data[index..]` to the head of its next chunk before refilling. In a
    /// [`DataSegment::Last`] chunk everything is consumed on success.
    /// Returns `None` once the context is in the error state; the message
    /// was already delivered to `on_error`.
    pub fn process(&mut self, data: &mut [u8], segment: DataSegment) -> Option<usize> {
        parser::process(self, data, segment)
    }

    /// Flush everything still buffered and consume the context. Returns
    /// `false` if any error was reported during the session or during this
    /// final flush. A context that already failed drains only its
    /// already-formatted output; undecoded work bytes are dropped.
    pub fn finish(mut self) -> bool {
        trace_event!("finish context");
        if self.error {
            self.error = false;
            self.keep_parsing = true;
            self.flush_output_buffer();
            return false;
        }
        self.keep_parsing = true;
        self.flush_work_buffer(true);
        self.flush_output_buffer();
        !self.error
    }

    // ── Error reporting ───────────────────────────────────────────────────────

    /// Record an error, stop parsing, and deliver the message. Only the
    /// first error of a session is reported; later calls are ignored
    /// because the parser is already stopped.
    pub(crate) fn notify_error(&mut self, message: impl AsRef<str>) {
        if self.error {
            return;
        }
        self.error = true;
        self.keep_parsing = false;
        (self.on_error)(message.as_ref());
    }

    #[inline]
    pub(crate) fn is_error(&self) -> bool {
        self.error
    }

    /// Suspend parsing without error (mid-token at a stream chunk end).
    #[inline]
    pub(crate) fn stop_parsing(&mut self) {
        self.keep_parsing = false;
    }

    // ── Format events ─────────────────────────────────────────────────────────

    pub(crate) fn set_input_type(&mut self, spec: InputSpec) {
        trace_event!(
            "set input type {} width {} endianness {:?}",
            spec.data_type,
            spec.data_width,
            spec.endianness
        );
        self.input = spec;
    }

    /// Apply a new output format. Pending work bytes still belong to the old
    /// format, so they are flushed (final-style, zero-filled) first.
    pub(crate) fn set_output_type(
        &mut self,
        data_type: DataType,
        data_width: usize,
        endianness: Endianness,
        text_width: usize,
    ) {
        trace_event!(
            "set output type {} width {} endianness {:?} print width {}",
            data_type,
            data_width,
            endianness,
            text_width
        );
        if !self.work_buffer.is_empty() {
            self.flush_work_buffer(true);
            if !self.keep_parsing {
                return;
            }
        }
        self.output.data_type = data_type;
        self.output.data_width = data_width;
        self.output.endianness = endianness;
        self.output.text_width = text_width;
    }

    pub(crate) fn set_prefix(&mut self, prefix: Vec<u8>) {
        trace_event!("set prefix [{}]", String::from_utf8_lossy(&prefix));
        self.output.prefix = Some(prefix);
    }

    pub(crate) fn set_suffix(&mut self, suffix: Vec<u8>) {
        trace_event!("set suffix [{}]", String::from_utf8_lossy(&suffix));
        self.output.suffix = Some(suffix);
    }

    /// `Pc` and `Ps`: canned prefix/suffix pairs. `c` decorates hex and
    /// octal output with their C literal prefixes, so it must follow the
    /// `o` command it applies to.
    pub(crate) fn apply_preset(&mut self, selector: u8) {
        trace_event!("apply preset [{}]", selector as char);
        match selector {
            b's' => self.set_suffix(b" ".to_vec()),
            b'c' => {
                self.set_suffix(b", ".to_vec());
                match self.output.data_type {
                    DataType::Hex => self.set_prefix(b"0x".to_vec()),
                    DataType::Octal => self.set_prefix(b"0".to_vec()),
                    _ => {}
                }
            }
            other => {
                self.notify_error(format!(
                    "{}: Unknown prefix-suffix preset",
                    other as char
                ));
            }
        }
    }

    // ── Data events ───────────────────────────────────────────────────────────

    /// Decoded string content becomes raw work-buffer bytes.
    pub(crate) fn put_string(&mut self, bytes: &[u8]) {
        trace_event!("on string ({} bytes)", bytes.len());
        self.add_bytes(bytes);
    }

    /// A numeric token, converted under the active input spec.
    pub(crate) fn put_number(&mut self, token: &[u8]) {
        trace_event!("on number [{}]", String::from_utf8_lossy(token));
        if self.input.data_type == DataType::None {
            self.notify_error("Must set input type before adding numbers");
            return;
        }
        let text = match core::str::from_utf8(token) {
            Ok(text) => text,
            Err(_) => {
                self.notify_error(format!(
                    "{}: not a valid number",
                    String::from_utf8_lossy(token)
                ));
                return;
            }
        };
        match self.input.data_type {
            DataType::Float => match text.parse::<f64>() {
                Ok(value) => self.add_float(value),
                Err(_) => self.notify_error(format!("{text}: not a valid float value")),
            },
            DataType::Decimal => {
                self.notify_error(format!("decimal input is not implemented: {text}"));
            }
            DataType::Int => self.put_radix_number(text, 10),
            DataType::Hex => self.put_radix_number(text, 16),
            DataType::Octal => self.put_radix_number(text, 8),
            DataType::Boolean => self.put_radix_number(text, 2),
            other => {
                self.notify_error(format!("{other}: unexpected input type for value [{text}]"));
            }
        }
    }

    fn put_radix_number(&mut self, text: &str, radix: u32) {
        match parse_uint(text, radix) {
            Some(value) => self.add_int(value),
            None => self.notify_error(format!("{text}: not a valid base-{radix} number")),
        }
    }

    /// Binary input mode: the chunk is work-buffer bytes, swapped per group
    /// when the input byte order differs from the host's. Returns the number
    /// of bytes consumed: a trailing partial group stays unconsumed in a
    /// stream segment so the caller carries it to the next chunk, and is
    /// zero-filled to the group width (in the input byte order) in a
    /// terminal segment.
    pub(crate) fn put_binary_chunk(&mut self, data: &mut [u8]) -> usize {
        trace_event!("on bytes ({} bytes)", data.len());
        let width = self.input.data_width;
        let cross_endian = width > 1
            && self.input.endianness != Endianness::None
            && self.input.endianness != NATIVE_ENDIANNESS;
        if !cross_endian {
            self.add_bytes(data);
            return data.len();
        }

        let full = data.len() - data.len() % width;
        endian::swap_groups(&mut data[..full], width);
        self.add_bytes(&data[..full]);
        if data.len() == full || self.segment == DataSegment::Stream {
            // Any partial group completes with the next chunk.
            return full;
        }

        // End of input: the partial group cannot complete, so it becomes a
        // zero-extended value like any other trailing partial group.
        let rem = data.len() - full;
        let mut tail = [0u8; 16];
        tail[..rem].copy_from_slice(&data[full..]);
        tail[..width].reverse();
        if self.keep_parsing {
            self.add_bytes(&tail[..width]);
        }
        data.len()
    }

    // ── Binary adders ─────────────────────────────────────────────────────────

    /// Append raw bytes to the work buffer, flushing at the high-water mark.
    pub(crate) fn add_bytes(&mut self, data: &[u8]) {
        if self.work_buffer.is_high_water() {
            self.flush_work_buffer(false);
            if !self.keep_parsing {
                return;
            }
        }
        let mut rest = data;
        loop {
            let take = rest.len().min(self.work_buffer.remaining());
            self.work_buffer.append(&rest[..take]);
            rest = &rest[take..];
            if self.work_buffer.is_high_water() {
                self.flush_work_buffer(false);
                if !self.keep_parsing {
                    return;
                }
            }
            if rest.is_empty() {
                break;
            }
        }
    }

    /// Store an integer value at the input width, laying its bytes down in
    /// the input byte order.
    fn add_int(&mut self, value: u64) {
        match self.input.data_width {
            1 => self.add_bytes(&[value as u8]),
            2 => {
                let v = value as u16;
                match self.input.endianness {
                    Endianness::Big => self.add_bytes(&v.to_be_bytes()),
                    _ => self.add_bytes(&v.to_le_bytes()),
                }
            }
            4 => {
                let v = value as u32;
                match self.input.endianness {
                    Endianness::Big => self.add_bytes(&v.to_be_bytes()),
                    _ => self.add_bytes(&v.to_le_bytes()),
                }
            }
            8 => {
                match self.input.endianness {
                    Endianness::Big => self.add_bytes(&value.to_be_bytes()),
                    _ => self.add_bytes(&value.to_le_bytes()),
                }
            }
            16 => self.notify_error("16-byte integer input is not implemented"),
            other => self.notify_error(format!("{other}: invalid int width")),
        }
    }

    fn add_float(&mut self, value: f64) {
        match self.input.data_width {
            2 => self.notify_error("2-byte float input is not implemented"),
            4 => {
                let bits = (value as f32).to_bits();
                match self.input.endianness {
                    Endianness::Big => self.add_bytes(&bits.to_be_bytes()),
                    _ => self.add_bytes(&bits.to_le_bytes()),
                }
            }
            8 => {
                let bits = value.to_bits();
                match self.input.endianness {
                    Endianness::Big => self.add_bytes(&bits.to_be_bytes()),
                    _ => self.add_bytes(&bits.to_le_bytes()),
                }
            }
            16 => self.notify_error("16-byte float input is not implemented"),
            other => self.notify_error(format!("{other}: invalid float width")),
        }
    }

    // ── Flush engine ──────────────────────────────────────────────────────────

    /// Render pending work bytes through the active output format.
    ///
    /// A final flush (end of input, or a reformat forced by a new `o`
    /// command) zero-fills past the write position so a trailing partial
    /// group becomes a well-defined value. A high-water flush renders only
    /// whole groups and carries the tail to the front of the buffer.
    pub(crate) fn flush_work_buffer(&mut self, is_final: bool) {
        if self.work_buffer.is_empty() {
            return;
        }

        if self.output.data_type == DataType::Binary {
            self.flush_work_buffer_binary(is_final);
            return;
        }

        let printer = match Printer::select(&self.output) {
            Ok(printer) => printer,
            Err(message) => {
                self.notify_error(message);
                return;
            }
        };

        let width = self.output.data_width.max(1);
        let used = self.work_buffer.used();
        let usable = if is_final {
            if width > 1 {
                // The overhead region guarantees room for the zero-fill.
                self.work_buffer.zero_fill(16);
                round_up(used, width)
            } else {
                used
            }
        } else if printer == Printer::Str {
            used - utf8_holdback(self.work_buffer.bytes())
        } else {
            used - used % width
        };
        if usable == 0 {
            return;
        }

        let prefix = self.output.prefix.clone().filter(|p| !p.is_empty());
        let suffix = self.output.suffix.clone().filter(|s| !s.is_empty());
        let endianness = self.output.endianness;
        let text_width = self.output.text_width;

        let mut rendered = String::new();
        let mut pos = 0;
        while pos < usable {
            if let Some(ref prefix) = prefix {
                self.append_output(prefix);
            }

            let mut group = [0u8; 16];
            let take = (usable - pos).min(16);
            group[..take].copy_from_slice(&self.work_buffer.filled(usable)[pos..pos + take]);
            rendered.clear();
            let consumed = printer.print(&group[..take], endianness, text_width, &mut rendered);
            self.append_output(rendered.as_bytes());
            pos += consumed;

            if pos < usable {
                if let Some(ref suffix) = suffix {
                    self.append_output(suffix);
                }
            }

            if self.output_buffer.is_high_water() {
                self.flush_output_buffer();
            }
            if !self.keep_parsing {
                return;
            }
        }

        if pos < self.work_buffer.used() {
            self.work_buffer.carry_tail(pos);
        } else {
            self.work_buffer.clear();
        }
    }

    /// Binary output: work bytes go out verbatim, except that a cross-endian
    /// multi-byte width swaps each group on the way through.
    fn flush_work_buffer_binary(&mut self, is_final: bool) {
        let width = self.output.data_width.max(1);
        let cross_endian = width > 1
            && self.output.endianness != Endianness::None
            && self.output.endianness != NATIVE_ENDIANNESS;

        if !cross_endian {
            let ok = (self.on_output)(self.work_buffer.bytes());
            self.work_buffer.clear();
            if !ok {
                self.notify_error("Error writing to output");
            }
            return;
        }

        let used = self.work_buffer.used();
        let usable = if is_final {
            self.work_buffer.zero_fill(width);
            round_up(used, width)
        } else {
            used - used % width
        };
        if usable == 0 {
            return;
        }

        let mut pos = 0;
        while pos < usable {
            let mut group = [0u8; 16];
            endian::copy_swapped(
                &mut group[..width],
                &self.work_buffer.filled(usable)[pos..pos + width],
            );
            self.append_output(&group[..width]);
            pos += width;
            if self.output_buffer.is_high_water() {
                self.flush_output_buffer();
            }
            if !self.keep_parsing {
                return;
            }
        }

        if pos < self.work_buffer.used() {
            self.work_buffer.carry_tail(pos);
        } else {
            self.work_buffer.clear();
        }
    }

    /// Append formatted bytes to the output buffer, draining first if they
    /// would not fit.
    fn append_output(&mut self, bytes: &[u8]) {
        if bytes.len() > self.output_buffer.remaining() {
            self.flush_output_buffer();
            if !self.keep_parsing {
                return;
            }
            if bytes.len() > self.output_buffer.remaining() {
                self.notify_error("formatted value exceeds the output buffer");
                return;
            }
        }
        self.output_buffer.append(bytes);
    }

    /// Hand everything in the output buffer to the sink.
    pub(crate) fn flush_output_buffer(&mut self) {
        if self.output_buffer.is_empty() {
            return;
        }
        let ok = (self.on_output)(self.output_buffer.bytes());
        self.output_buffer.clear();
        if !ok {
            self.notify_error("Error writing to output");
        }
    }
}

/// Parse an unsigned integer in the given base, accepting a sign. A negative
/// value wraps to the two's complement of the magnitude; truncation to the
/// declared input width happens in the adder.
fn parse_uint(text: &str, radix: u32) -> Option<u64> {
    let (negative, mut digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if radix == 16 {
        digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);
    }
    if digits.is_empty() {
        return None;
    }
    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    Some(if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    })
}

fn round_up(value: usize, multiple: usize) -> usize {
    value.div_ceil(multiple) * multiple
}
