//! Shared helpers for the black-box engine tests: run a command string
//! through a context and compare the collected sink output.

// Each test binary uses its own subset of these helpers.
#![allow(dead_code)]

use bo::{Context, DataSegment};

/// Outcome of one full session: collected output, collected error messages,
/// and whether both `process` and `finish` reported success.
pub struct Session {
    pub output: Vec<u8>,
    pub errors: Vec<String>,
    pub succeeded: bool,
}

/// Feed `input` as a single terminal segment.
pub fn run_conversion(input: &str) -> Session {
    run_chunks(&[input], DataSegment::Last)
}

/// Feed each chunk in order (all but the last as stream segments), honoring
/// the carry contract between chunks, then terminate with whatever remains.
pub fn run_chunks(chunks: &[&str], final_kind: DataSegment) -> Session {
    let mut output = Vec::new();
    let mut errors = Vec::new();
    let succeeded = {
        let mut ctx = Context::new(
            |bytes: &[u8]| {
                output.extend_from_slice(bytes);
                true
            },
            |message: &str| errors.push(message.to_owned()),
        );
        let mut process_ok = true;
        let mut carry: Vec<u8> = Vec::new();

        for (i, chunk) in chunks.iter().enumerate() {
            let last = i + 1 == chunks.len();
            let kind = if last { final_kind } else { DataSegment::Stream };
            carry.extend_from_slice(chunk.as_bytes());
            match ctx.process(&mut carry, kind) {
                Some(consumed) => {
                    carry.drain(..consumed);
                }
                None => {
                    process_ok = false;
                    break;
                }
            }
        }
        // A stream-mode run still needs a terminal segment for the carry.
        if process_ok && final_kind == DataSegment::Stream {
            process_ok = ctx.process(&mut carry, DataSegment::Last).is_some();
        }

        let flushed = ctx.finish();
        process_ok && flushed
    };
    Session {
        output,
        errors,
        succeeded,
    }
}

pub fn assert_conversion(input: &str, expected: &str) {
    let session = run_conversion(input);
    assert!(
        session.succeeded && session.errors.is_empty(),
        "conversion of {input:?} failed: {:?}",
        session.errors
    );
    assert_eq!(
        String::from_utf8_lossy(&session.output),
        expected,
        "wrong output for {input:?}"
    );
}

pub fn assert_failed_conversion(input: &str) {
    let session = run_conversion(input);
    assert!(!session.succeeded, "conversion of {input:?} should fail");
    assert!(
        !session.errors.is_empty(),
        "failed conversion of {input:?} should report an error"
    );
}

/// Split `input` at `at` and feed both halves as stream segments followed by
/// a terminal segment; the result must match the unsplit conversion.
pub fn assert_split_conversion(input: &str, at: usize, expected: &str) {
    let (head, tail) = input.split_at(at);
    let session = run_chunks(&[head, tail], DataSegment::Stream);
    assert!(
        session.succeeded && session.errors.is_empty(),
        "split at {at} of {input:?} failed: {:?}",
        session.errors
    );
    assert_eq!(
        String::from_utf8_lossy(&session.output),
        expected,
        "split at {at} of {input:?} produced wrong output"
    );
}
