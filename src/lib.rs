//! bo: byte-oriented data translator.
//!
//! The engine reads a stream of commands and numeric/string tokens,
//! interprets each token under a caller-specified input format (base, width,
//! endianness), and re-emits the resulting bytes under a caller-specified
//! output format (base, width, endianness, print width, prefix, suffix).
//!
//! Typical embedding:
//!
//! ```
//! use bo::{Context, DataSegment};
//!
//! let mut out = Vec::new();
//! let ok = {
//!     let mut ctx = Context::new(
//!         |bytes| {
//!             out.extend_from_slice(bytes);
//!             true
//!         },
//!         |message| eprintln!("Error: {message}"),
//!     );
//!     let mut chunk = b"oh1l2 s\" \" ih1l 1 2 3".to_vec();
//!     assert!(ctx.process(&mut chunk, DataSegment::Last).is_some());
//!     ctx.finish()
//! };
//! assert!(ok);
//! assert_eq!(out, b"01 02 03");
//! ```
//!
//! Chunks may be split at any byte boundary: `process` returns the index of
//! the first unconsumed byte, and the caller carries that tail over to the
//! head of its next chunk. The chunk buffer is borrowed mutably because
//! string unescaping rewrites it in place.

pub mod buffer;
pub mod chars;
pub mod cli;
pub mod context;
pub mod endian;
pub mod escape;
pub mod parser;
pub mod printers;
pub mod types;

pub use context::Context;
pub use types::{DataSegment, DataType, Endianness, InputSpec, OutputSpec};

/// Crate version, following semantic versioning.
pub const BO_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The library version string.
pub fn version() -> &'static str {
    BO_VERSION
}

/// Event tracing for the parser and context, compiled in only with the
/// `parse-trace` feature. With the feature off the arguments still
/// type-check but generate no code.
#[macro_export]
macro_rules! trace_event {
    ($($arg:tt)*) => {
        if cfg!(feature = "parse-trace") {
            eprintln!("[bo] {}", format_args!($($arg)*));
        }
    };
}
