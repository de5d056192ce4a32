//! Error policy: error kinds, single delivery, and the dead-context
//! behavior after a failure.

mod common;
use common::{assert_failed_conversion, run_conversion};

use bo::{Context, DataSegment};

#[test]
fn unknown_token_is_an_error() {
    assert_failed_conversion("zz 1 2");
}

#[test]
fn number_before_input_type_is_an_error() {
    assert_failed_conversion("1 2 3 4");
    assert_failed_conversion("oB1 1 2 3 4");
}

#[test]
fn data_without_output_type_fails_at_flush() {
    assert_failed_conversion("ii1l 1 2 3 4");
}

#[test]
fn malformed_number_is_an_error() {
    assert_failed_conversion("oh1l2 ih1l 1g");
}

#[test]
fn malformed_float_is_an_error() {
    assert_failed_conversion("oh1l2 if4l 1.2.3");
}

#[test]
fn decimal_input_is_unsupported() {
    assert_failed_conversion("oh1l2 id8l 1.5");
}

#[test]
fn decimal_output_is_unsupported() {
    assert_failed_conversion("od8l1 ih1l 01");
}

#[test]
fn sixteen_byte_int_io_is_unsupported() {
    assert_failed_conversion("oh1l2 ii16l 5");
    assert_failed_conversion("oh16l1 ih1l 01");
}

#[test]
fn bad_escape_is_an_error() {
    assert_failed_conversion("os is \"\\q\"");
    assert_failed_conversion("os is \"\\xzz\"");
    assert_failed_conversion("os is \"\\uzzzz\"");
}

#[test]
fn unterminated_string_in_last_segment() {
    assert_failed_conversion("os is \"abc");
}

#[test]
fn error_is_delivered_once() {
    let session = run_conversion("zz 1 2");
    assert_eq!(session.errors.len(), 1);
    assert!(session.errors[0].contains("Unknown token"));
}

#[test]
fn no_output_after_error() {
    let mut output_calls = 0usize;
    let mut errors = Vec::new();
    let finished = {
        let mut ctx = Context::new(
            |_bytes: &[u8]| {
                output_calls += 1;
                true
            },
            |message: &str| errors.push(message.to_owned()),
        );
        // The bad token arrives before any flushable data.
        let mut chunk = b"oh1l2 ih1l zz 1 2 3".to_vec();
        assert!(ctx.process(&mut chunk, DataSegment::Last).is_none());

        // Further process calls are no-ops on a dead context.
        let mut more = b"4 5 6".to_vec();
        assert!(ctx.process(&mut more, DataSegment::Last).is_none());
        ctx.finish()
    };
    assert!(!finished);
    assert_eq!(output_calls, 0, "a failed context must not emit data");
    assert_eq!(errors.len(), 1);
}

#[test]
fn sink_refusal_enters_error_state() {
    let mut errors = Vec::new();
    let finished = {
        let mut ctx = Context::new(|_bytes: &[u8]| false, |message: &str| {
            errors.push(message.to_owned());
        });
        let mut chunk = b"oh1l2 ih1l 1 2 3".to_vec();
        // Processing succeeds; the refusal surfaces at the final flush.
        assert!(ctx.process(&mut chunk, DataSegment::Last).is_some());
        ctx.finish()
    };
    assert!(!finished);
    assert_eq!(errors.len(), 1);
}

#[test]
fn finish_reports_prior_error() {
    let finished = {
        let mut ctx = Context::new(|_bytes: &[u8]| true, |_message: &str| {});
        let mut chunk = b"bogus~token".to_vec();
        assert!(ctx.process(&mut chunk, DataSegment::Last).is_none());
        ctx.finish()
    };
    assert!(!finished);
}
