//! Command grammar acceptance and rejection at the engine surface.
//!
//! Commands here carry a trailing space: a command token is only complete
//! once its terminating whitespace has been seen (see the span tests for
//! the unterminated cases).

mod common;
use common::{assert_conversion, assert_failed_conversion};

#[test]
fn input_config_accepted() {
    assert_conversion("if4b ", "");
    assert_conversion("ih1 ", "");
    assert_conversion("ih1l ", "");
    assert_conversion("iB1 ", "");
    assert_conversion("iB2l ", "");
    assert_conversion("ih16l ", "");
    assert_conversion("is ", "");
    assert_conversion("ib1l ", "");
}

#[test]
fn input_config_rejected() {
    assert_failed_conversion("i ");
    assert_failed_conversion("if ");
    assert_failed_conversion("if4 ");
    assert_failed_conversion("iB ");
    assert_failed_conversion("iv4l ");
    assert_failed_conversion("if10l ");
    assert_failed_conversion("if4h ");
    assert_failed_conversion("if1l ");
    assert_failed_conversion("ib1 ");
    assert_failed_conversion("ih3l ");
    assert_failed_conversion("ih1lx ");
}

#[test]
fn output_config_accepted() {
    assert_conversion("oo8l1 ", "");
    assert_conversion("oo8l ", "");
    assert_conversion("oB2b ", "");
    assert_conversion("oB1 ", "");
    assert_conversion("oh1l12 ", "");
    assert_conversion("os ", "");
    assert_conversion("ob1l1 ", "");
}

#[test]
fn output_config_rejected() {
    assert_failed_conversion("o ");
    assert_failed_conversion("oo ");
    assert_failed_conversion("oo8 ");
    assert_failed_conversion("oB2 ");
    assert_failed_conversion("oa8l2 ");
    assert_failed_conversion("oo9l2 ");
    assert_failed_conversion("oo32l2 ");
    assert_failed_conversion("oo8j2 ");
    assert_failed_conversion("oo8l-1 ");
    assert_failed_conversion("oB2b9 ");
    assert_failed_conversion("os2 ");
    assert_failed_conversion("od2l1 ");
}

#[test]
fn prefix_suffix_config() {
    assert_conversion("p\"\"", "");
    assert_conversion("s\"\"", "");
    assert_conversion("p\"0x\" s\", \"", "");
    assert_failed_conversion("p ");
    assert_failed_conversion("p\"");
    assert_failed_conversion("pp ");
    assert_failed_conversion("s ");
    assert_failed_conversion("sq ");
}

#[test]
fn preset_config() {
    assert_conversion("Pc ", "");
    assert_conversion("Ps ", "");
    assert_failed_conversion("P ");
    assert_failed_conversion("P2 ");
}

#[test]
fn preset_c_decorates_hex_output() {
    assert_conversion("oh1l2 Pc ih1l 1 2", "0x01, 0x02");
}

#[test]
fn preset_c_decorates_octal_output() {
    assert_conversion("oo1l1 Pc ih1l 9 12", "011, 022");
}

#[test]
fn preset_c_leaves_other_prefixes_alone() {
    assert_conversion("oi1l1 Pc ih1l 1 2", "1, 2");
}

#[test]
fn preset_s_sets_space_suffix() {
    assert_conversion("oh1l2 Ps ih1l 1 2", "01 02");
}

#[test]
fn later_prefix_replaces_earlier() {
    assert_conversion("oh1l2 p\"a\" p\"b\" ih1l 5", "b05");
}
