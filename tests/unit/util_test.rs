//! Tests for utility functions

use prometheus_safe_io::core::{split_lines, LineInput};
use prometheus_safe_io::util::init_tracing_with_default;
use prometheus_safe_io::TextEncoding;

#[test]
fn test_encoding_names_round_trip() {
    for encoding in [TextEncoding::Utf8, TextEncoding::Ascii, TextEncoding::Latin1] {
        assert_eq!(encoding.name().parse::<TextEncoding>().unwrap(), encoding);
        assert_eq!(encoding.to_string(), encoding.name());
    }
}

#[test]
fn test_default_encoding_is_utf8() {
    assert_eq!(TextEncoding::default(), TextEncoding::Utf8);
}

#[test]
fn test_line_input_render() {
    let text = LineInput::from("alpha\nbeta").render();
    assert_eq!(text, "alpha\nbeta\n");
    assert_eq!(split_lines(&text), vec!["alpha\n", "beta\n"]);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing_with_default("prometheus_safe_io=debug");
    init_tracing_with_default("prometheus_safe_io=debug");
}
